//! High-level build management interface
//!
//! [`BuildManager`] is the entry point hosts use. It loads the build file,
//! the version information and the solution, registers the standard tasks and
//! validates the resulting graph, so a misconfigured build is reported before
//! anything runs.
//!
//! ## Example
//!
//! ```rust,no_run
//! use kiln_core::build_manager::{BuildManager, BuildManagerConfig};
//! use kiln_core::execution::NoopListener;
//! use std::path::PathBuf;
//!
//! # fn example() -> kiln_core::KilnResult<()> {
//! let mut manager = BuildManager::new(BuildManagerConfig {
//!     root: PathBuf::from("."),
//!     config_path: None,
//!     version_file: None,
//! })?;
//!
//! let plan = manager.get_execution_plan("Build")?;
//! println!("{} tasks", plan.len());
//!
//! manager.run_task("Default", &mut NoopListener)?.into_result()?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use kiln_tool_protocol::{CommandRunner, EnvSource, ProcessEnv};
use tracing::debug;

use crate::configs::build::{parse_build_config, BuildConfig, DEFAULT_CONFIG_PATH};
use crate::configs::version::load_repository_info;
use crate::context::{BuildContext, Configuration};
use crate::execution::dependencies::{resolve_execution_plan, validate_graph, ExecutionPlan};
use crate::execution::graph::TaskGraph;
use crate::execution::runner::RunListener;
use crate::execution::ProcessRunner;
use crate::results::{RunReport, TaskInfo};
use crate::script::register_standard_tasks;
use crate::solution::load_solution;
use crate::types::{KilnError, KilnResult};

/// Configuration for initializing a build manager
#[derive(Debug, Clone)]
pub struct BuildManagerConfig {
    pub root: PathBuf,
    /// Build file; defaults to `<root>/.kiln/build.yml`.
    pub config_path: Option<PathBuf>,
    /// Version file; defaults to the build file's `versionFile`.
    pub version_file: Option<PathBuf>,
}

/// Owns the task graph and the context it runs against.
pub struct BuildManager {
    graph: TaskGraph<BuildContext>,
    context: BuildContext,
}

impl BuildManager {
    /// Initialize a build manager that runs real processes and reads the
    /// process environment.
    pub fn new(config: BuildManagerConfig) -> KilnResult<Self> {
        let runner = ProcessRunner::new(config.root.clone());
        Self::with_collaborators(config, Box::new(runner), Box::new(ProcessEnv))
    }

    pub fn with_collaborators(
        config: BuildManagerConfig,
        runner: Box<dyn CommandRunner>,
        env: Box<dyn EnvSource>,
    ) -> KilnResult<Self> {
        let root = config.root;
        let config_path = config
            .config_path
            .unwrap_or_else(|| root.join(DEFAULT_CONFIG_PATH));
        let build_config = Self::load_build_config(&config_path)?;

        let version_file = config
            .version_file
            .unwrap_or_else(|| root.join(&build_config.version_file));
        let repository = load_repository_info(&version_file)?;

        let solution_path = root.join(build_config.solution_file());
        let projects = load_solution(&solution_path, &build_config.builder_project)?;
        debug!(
            solution = %solution_path.display(),
            projects = projects.len(),
            "solution loaded"
        );

        let context = BuildContext::new(root, build_config, repository, projects, runner, env);

        let mut graph = TaskGraph::new();
        register_standard_tasks(&mut graph)?;
        validate_graph(&graph)?;

        Ok(Self { graph, context })
    }

    /// All registered tasks, in registration order.
    pub fn list_tasks(&self) -> Vec<TaskInfo> {
        self.graph
            .tasks()
            .map(|task| TaskInfo {
                name: task.name().to_string(),
                description: task.description().map(str::to_string),
                dependencies: task.dependencies().to_vec(),
                conditional: task.has_criteria(),
            })
            .collect()
    }

    /// Get the execution plan for a task without running anything
    pub fn get_execution_plan(&self, task: &str) -> KilnResult<ExecutionPlan> {
        resolve_execution_plan(&self.graph, task)
    }

    /// Run a task and its prerequisites.
    ///
    /// Every run starts from `Debug`; `Check-Repository` decides again.
    pub fn run_task(&mut self, task: &str, listener: &mut dyn RunListener) -> KilnResult<RunReport> {
        self.context.configuration = Configuration::Debug;
        self.graph
            .run_with_listener(task, &mut self.context, listener)
    }

    pub fn task_graph(&self) -> &TaskGraph<BuildContext> {
        &self.graph
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    fn load_build_config(path: &Path) -> KilnResult<BuildConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KilnError::Config(format!(
                "Failed to read build config {}: {}",
                path.display(),
                e
            ))
        })?;

        parse_build_config(&content).map_err(|e| {
            KilnError::Config(format!(
                "Failed to parse build config {}: {}",
                path.display(),
                e
            ))
        })
    }
}
