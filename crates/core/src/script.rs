//! Standard build script
//!
//! The task graph every kiln build starts from:
//!
//! ```text
//! Check-Repository
//!   └─ Clean
//!        └─ Restore-NuGet-Packages
//!             └─ Build
//!                  └─ Unit-Testing
//!                       └─ Create-NuGet-Packages   (repository info valid)
//!                            └─ Push-NuGet-Packages (repository info valid)
//!                                 └─ Default
//! ```
//!
//! A skipped `Create-NuGet-Packages` does not stop `Push-NuGet-Packages`
//! from running; with nothing in the releases directory it pushes nothing.

pub mod clean;
pub mod dotnet;
pub mod push;
pub mod repository;

use crate::context::BuildContext;
use crate::execution::graph::TaskGraph;
use crate::types::KilnResult;

pub const CHECK_REPOSITORY: &str = "Check-Repository";
pub const CLEAN: &str = "Clean";
pub const RESTORE: &str = "Restore-NuGet-Packages";
pub const BUILD: &str = "Build";
pub const UNIT_TESTING: &str = "Unit-Testing";
pub const CREATE_PACKAGES: &str = "Create-NuGet-Packages";
pub const PUSH_PACKAGES: &str = "Push-NuGet-Packages";
pub const DEFAULT: &str = "Default";

fn repository_is_valid(ctx: &BuildContext) -> bool {
    ctx.repository.is_valid()
}

/// Register the standard tasks on `graph`.
pub fn register_standard_tasks(graph: &mut TaskGraph<BuildContext>) -> KilnResult<()> {
    graph
        .register(CHECK_REPOSITORY)?
        .description("Verify version information and choose the build configuration")
        .does(repository::check_repository);

    graph
        .register(CLEAN)?
        .description("Empty bin and release directories, remove old test results")
        .depends_on(CHECK_REPOSITORY)
        .does(clean::clean);

    graph
        .register(RESTORE)?
        .description("Restore NuGet packages")
        .depends_on(CHECK_REPOSITORY)
        .depends_on(CLEAN)
        .does(dotnet::restore);

    graph
        .register(BUILD)?
        .description("Compile the solution")
        .depends_on(CHECK_REPOSITORY)
        .depends_on(CLEAN)
        .depends_on(RESTORE)
        .does(dotnet::build);

    graph
        .register(UNIT_TESTING)?
        .description("Run test assemblies")
        .depends_on(BUILD)
        .does(dotnet::unit_testing);

    graph
        .register(CREATE_PACKAGES)?
        .description("Pack publishable projects into the releases directory")
        .with_criteria(repository_is_valid)
        .depends_on(UNIT_TESTING)
        .does(dotnet::pack);

    graph
        .register(PUSH_PACKAGES)?
        .description("Push packages to the feed matching the version kind")
        .depends_on(CREATE_PACKAGES)
        .with_criteria(repository_is_valid)
        .does(push::push_packages);

    graph
        .register(DEFAULT)?
        .description("Full build and publish")
        .depends_on(PUSH_PACKAGES);

    Ok(())
}
