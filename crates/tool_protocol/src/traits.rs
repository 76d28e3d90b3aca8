//! Collaborator traits for build tasks.
//!
//! A build task reaches the outside world through exactly two capabilities:
//!
//! - [`CommandRunner`] - run a program to completion and report the outcome
//! - [`EnvSource`] - read a named value such as an API key
//!
//! Both are synchronous. A collaborator that blocks, blocks the whole build.

use std::collections::HashMap;

use crate::types::{CommandOutput, CommandSpec, ToolResult};

/// Runs external programs on behalf of build tasks.
///
/// # Example
///
/// ```rust
/// # use kiln_tool_protocol::{CommandRunner, CommandSpec, CommandOutput, ToolResult};
/// struct EchoRunner;
///
/// impl CommandRunner for EchoRunner {
///     fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput> {
///         Ok(CommandOutput {
///             status: Some(0),
///             stdout: spec.to_string(),
///             stderr: String::new(),
///         })
///     }
/// }
/// ```
pub trait CommandRunner {
    /// Run `spec` and wait for it to exit.
    ///
    /// Implementations must report a non-zero exit as
    /// [`ToolError::Failed`](crate::ToolError::Failed) rather than returning
    /// an `Ok` with a failing status.
    fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput>;
}

/// Looks up configuration values by name.
///
/// Values pass through unchanged: the build never interprets an API key, it
/// only checks whether one is present.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;

    /// Like [`var`](Self::var) but treats an empty value as missing.
    fn non_empty_var(&self, name: &str) -> Option<String> {
        self.var(name).filter(|value| !value.is_empty())
    }
}

/// Reads from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Reads from a fixed map.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    values: HashMap<String, String>,
}

impl MapEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
