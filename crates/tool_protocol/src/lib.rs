//! Kiln tool protocol.
//!
//! Build tasks never spawn processes or read the environment directly. They go
//! through the two collaborator traits defined here, which keeps the task graph
//! testable with fakes:
//!
//! - [`CommandRunner`] - run an external program and report success or failure
//! - [`EnvSource`] - look up a configuration or environment value by name
//!
//! The [`testing`] module ships in-memory implementations of both.

pub mod testing;
pub mod traits;
pub mod types;

pub use traits::{CommandRunner, EnvSource, MapEnv, ProcessEnv};
pub use types::{CommandOutput, CommandSpec, ToolError, ToolResult};
