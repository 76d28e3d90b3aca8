//! Configuration files read by kiln.
//!
//! - [`build`] - the `.kiln/build.yml` build description
//! - [`version`] - repository version information produced by an external tool

pub mod build;
pub mod version;
