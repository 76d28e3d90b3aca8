//! Kiln Core Library
//!
//! This is the core library for the kiln build tool. It provides the task
//! graph kernel and the standard build script for a .NET solution.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`build_manager`] - High-level interface used by the CLI
//! - [`execution`] - Task registration, dependency resolution and the fail-fast runner
//! - [`script`] - The standard tasks (clean, restore, build, test, pack, push)
//! - [`context`] - Shared state handed to every task
//! - [`configs`] - Build file and version information
//! - [`solution`] - Solution file reader
//! - [`results`] - Run reports and task listings
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The kernel works with any context type, which keeps it testable without
//! real tools:
//!
//! ```rust
//! use kiln_core::execution::TaskGraph;
//!
//! # fn example() -> kiln_core::KilnResult<()> {
//! let mut graph: TaskGraph<u32> = TaskGraph::new();
//! graph.register("Count")?.does(|n: &mut u32| {
//!     *n += 1;
//!     Ok(())
//! });
//! graph.register("Default")?.depends_on("Count");
//!
//! let mut n = 0;
//! let report = graph.run("Default", &mut n)?;
//! assert!(report.is_success());
//! assert_eq!(n, 1);
//! # Ok(())
//! # }
//! ```

pub mod build_manager;
pub mod configs;
pub mod context;
pub mod execution;
pub mod results;
pub mod script;
pub mod solution;
pub mod types;

// Re-export the main types for easier usage
pub use build_manager::{BuildManager, BuildManagerConfig};
pub use types::{KilnError, KilnResult};
