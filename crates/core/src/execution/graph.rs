//! Task registration
//!
//! Tasks are registered once, up front, through a fluent builder:
//!
//! ```rust
//! use kiln_core::execution::TaskGraph;
//!
//! # fn example() -> kiln_core::KilnResult<()> {
//! let mut graph: TaskGraph<Vec<String>> = TaskGraph::new();
//! graph
//!     .register("Clean")?
//!     .does(|log: &mut Vec<String>| {
//!         log.push("clean".to_string());
//!         Ok(())
//!     });
//! graph
//!     .register("Build")?
//!     .depends_on("Clean")
//!     .with_criteria(|log: &Vec<String>| !log.is_empty())
//!     .does(|log: &mut Vec<String>| {
//!         log.push("build".to_string());
//!         Ok(())
//!     });
//!
//! let mut log = Vec::new();
//! graph.run("Build", &mut log)?.into_result()?;
//! assert_eq!(log, vec!["clean", "build"]);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use crate::types::{KilnError, KilnResult};

/// Body of a task. Receives the shared build context.
pub type Action<C> = Box<dyn FnMut(&mut C) -> anyhow::Result<()>>;

/// Run predicate of a task.
pub type Criteria<C> = Box<dyn Fn(&C) -> bool>;

/// A named unit of work with prerequisites, run predicates and actions.
pub struct Task<C> {
    name: String,
    description: Option<String>,
    dependencies: Vec<String>,
    pub(crate) criteria: Vec<Criteria<C>>,
    pub(crate) actions: Vec<Action<C>>,
}

impl<C> Task<C> {
    fn new(name: String) -> Self {
        Self {
            name,
            description: None,
            dependencies: Vec::new(),
            criteria: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Prerequisites in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn has_criteria(&self) -> bool {
        !self.criteria.is_empty()
    }

    pub fn has_actions(&self) -> bool {
        !self.actions.is_empty()
    }

    /// Evaluate every predicate in order, stopping at the first false one.
    pub(crate) fn should_run(&self, context: &C) -> bool {
        self.criteria.iter().all(|criteria| criteria(context))
    }
}

impl<C> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("criteria", &self.criteria.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// Named tasks in registration order.
pub struct TaskGraph<C> {
    tasks: Vec<Task<C>>,
    index: HashMap<String, usize>,
}

impl<C> Default for TaskGraph<C> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<C> TaskGraph<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task and return a handle for declaring its details.
    ///
    /// Blank and duplicate names are rejected immediately.
    pub fn register(&mut self, name: impl Into<String>) -> KilnResult<TaskBuilder<'_, C>> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(KilnError::InvalidTaskName(name));
        }
        if self.index.contains_key(&name) {
            return Err(KilnError::DuplicateTask(name));
        }

        let position = self.tasks.len();
        self.index.insert(name.clone(), position);
        self.tasks.push(Task::new(name));

        Ok(TaskBuilder {
            task: &mut self.tasks[position],
        })
    }

    pub fn task(&self, name: &str) -> Option<&Task<C>> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub(crate) fn task_mut(&mut self, name: &str) -> Option<&mut Task<C>> {
        match self.index.get(name) {
            Some(&i) => self.tasks.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task<C>> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C> std::fmt::Debug for TaskGraph<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tasks.iter()).finish()
    }
}

/// Handle returned by [`TaskGraph::register`].
pub struct TaskBuilder<'a, C> {
    task: &'a mut Task<C>,
}

impl<C> std::fmt::Debug for TaskBuilder<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TaskBuilder").field(&*self.task).finish()
    }
}

impl<'a, C> TaskBuilder<'a, C> {
    /// Append a prerequisite. Unknown names are reported when the graph is
    /// validated or run, before any action executes.
    pub fn depends_on(self, name: impl Into<String>) -> Self {
        self.task.dependencies.push(name.into());
        self
    }

    /// Append an action. Actions of one task run in the order they were added.
    pub fn does<F>(self, action: F) -> Self
    where
        F: FnMut(&mut C) -> anyhow::Result<()> + 'static,
    {
        self.task.actions.push(Box::new(action));
        self
    }

    /// Add a run predicate. All predicates must hold for the actions to run.
    pub fn with_criteria<F>(self, criteria: F) -> Self
    where
        F: Fn(&C) -> bool + 'static,
    {
        self.task.criteria.push(Box::new(criteria));
        self
    }

    pub fn description(self, text: impl Into<String>) -> Self {
        self.task.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.task.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_keeps_declaration_order() {
        let mut graph: TaskGraph<()> = TaskGraph::new();
        graph.register("Clean").unwrap();
        graph
            .register("Build")
            .unwrap()
            .depends_on("Clean")
            .depends_on("Restore")
            .description("Compile the solution");

        let names: Vec<_> = graph.tasks().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Clean", "Build"]);

        let build = graph.task("Build").unwrap();
        assert_eq!(build.dependencies(), ["Clean", "Restore"]);
        assert_eq!(build.description(), Some("Compile the solution"));
        assert!(!build.has_actions());
        assert!(!build.has_criteria());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut graph: TaskGraph<()> = TaskGraph::new();
        graph.register("Build").unwrap();
        graph.register("Test").unwrap();

        let err = graph.register("Build").unwrap_err();
        assert!(matches!(err, KilnError::DuplicateTask(ref name) if name == "Build"));
        assert_eq!(graph.len(), 2);
        assert!(matches!(
            graph.register("Test"),
            Err(KilnError::DuplicateTask(ref name)) if name == "Test"
        ));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let mut graph: TaskGraph<()> = TaskGraph::new();
        assert!(matches!(
            graph.register(""),
            Err(KilnError::InvalidTaskName(_))
        ));
        assert!(matches!(
            graph.register("   "),
            Err(KilnError::InvalidTaskName(_))
        ));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_builder_debug_names_task() {
        let mut graph: TaskGraph<()> = TaskGraph::new();
        let builder = graph.register("Pack").unwrap().depends_on("Build");
        let debug = format!("{builder:?}");
        assert!(debug.starts_with("TaskBuilder(Task"));
        assert!(debug.contains("\"Pack\""));
        assert!(debug.contains("\"Build\""));
    }

    #[test]
    fn test_criteria_are_anded() {
        let mut graph: TaskGraph<u32> = TaskGraph::new();
        graph
            .register("Pack")
            .unwrap()
            .with_criteria(|n: &u32| *n > 1)
            .with_criteria(|n: &u32| *n < 10);

        let pack = graph.task("Pack").unwrap();
        assert!(pack.should_run(&5));
        assert!(!pack.should_run(&1));
        assert!(!pack.should_run(&12));
    }
}
