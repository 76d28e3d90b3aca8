//! Task graph kernel
//!
//! This module holds the task registration API, dependency resolution and the
//! fail-fast runner, plus the process-backed command runner used by real builds.

pub mod command;
pub mod dependencies;
pub mod graph;
pub mod runner;

pub use command::ProcessRunner;
pub use dependencies::{dependency_cycles, resolve_execution_plan, validate_graph, ExecutionPlan};
pub use graph::{Task, TaskBuilder, TaskGraph};
pub use runner::{NoopListener, RunListener};
