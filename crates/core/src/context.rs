//! Shared state handed to every build task.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kiln_tool_protocol::{CommandOutput, CommandRunner, CommandSpec, EnvSource};
use tracing::debug;

use crate::configs::build::BuildConfig;
use crate::configs::version::RepositoryInfo;
use crate::solution::SolutionProject;

/// MSBuild configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Configuration {
    #[default]
    Debug,
    Release,
}

impl Configuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "Debug",
            Configuration::Release => "Release",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a build task may read or change.
///
/// Tasks communicate only through this value: `Check-Repository` decides the
/// configuration, later tasks read it.
pub struct BuildContext {
    pub root: PathBuf,
    pub config: BuildConfig,
    pub repository: RepositoryInfo,
    pub configuration: Configuration,
    /// Solution projects, builder project excluded.
    pub projects: Vec<SolutionProject>,
    pub runner: Box<dyn CommandRunner>,
    pub env: Box<dyn EnvSource>,
}

impl BuildContext {
    pub fn new(
        root: PathBuf,
        config: BuildConfig,
        repository: RepositoryInfo,
        projects: Vec<SolutionProject>,
        runner: Box<dyn CommandRunner>,
        env: Box<dyn EnvSource>,
    ) -> Self {
        Self {
            root,
            config,
            repository,
            configuration: Configuration::Debug,
            projects,
            runner,
            env,
        }
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.config.releases_path(&self.root)
    }

    pub fn project_dir(&self, project: &SolutionProject) -> PathBuf {
        self.root.join(project.directory())
    }

    pub fn projects_to_publish(&self) -> impl Iterator<Item = &SolutionProject> {
        self.projects.iter().filter(|p| p.is_publishable())
    }

    pub fn test_projects(&self) -> impl Iterator<Item = &SolutionProject> {
        self.projects.iter().filter(|p| p.is_test_project())
    }

    /// Run a command through the configured runner, rooted at the build root
    /// unless the command sets its own.
    pub fn run(&self, spec: CommandSpec) -> anyhow::Result<CommandOutput> {
        let spec = match spec.cwd {
            Some(_) => spec,
            None => spec.current_dir(&self.root),
        };
        debug!(command = %spec, "dispatching command");
        self.runner
            .run(&spec)
            .with_context(|| format!("while running `{}`", spec.program))
    }

    pub fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("solution", &self.config.solution_name)
            .field("configuration", &self.configuration)
            .field("projects", &self.projects.len())
            .finish()
    }
}
