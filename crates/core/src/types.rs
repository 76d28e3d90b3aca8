use thiserror::Error;

/// The main error type for kiln operations
#[derive(Debug, Error)]
pub enum KilnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Solution error: {0}")]
    Solution(String),

    #[error("Invalid task name '{0}'")]
    InvalidTaskName(String),

    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Task '{task}' depends on '{dependency}' which is not registered")]
    MissingDependency { task: String, dependency: String },

    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Task '{task}' failed ({}): {source:#}", .chain.join(" -> "))]
    TaskFailed {
        task: String,
        chain: Vec<String>,
        #[source]
        source: anyhow::Error,
    },
}

impl KilnError {
    /// Whether this error describes a misconfigured build rather than a
    /// task that ran and failed.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, KilnError::TaskFailed { .. })
    }
}

/// Result type alias for kiln operations
pub type KilnResult<T> = Result<T, KilnError>;
