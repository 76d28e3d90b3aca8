//! Steps that drive the `dotnet` CLI: restore, build, test and pack.

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use kiln_tool_protocol::CommandSpec;
use tracing::{info, warn};

use crate::context::BuildContext;
use crate::solution::SolutionProject;

const DOTNET: &str = "dotnet";

pub fn restore(ctx: &mut BuildContext) -> anyhow::Result<()> {
    let spec = CommandSpec::new(DOTNET)
        .arg("restore")
        .arg(&ctx.config.core_build_project)
        .args(ctx.repository.version_arguments());
    ctx.run(spec)?;
    Ok(())
}

pub fn build(ctx: &mut BuildContext) -> anyhow::Result<()> {
    let spec = CommandSpec::new(DOTNET)
        .arg("build")
        .arg(&ctx.config.core_build_project)
        .arg("--configuration")
        .arg(ctx.configuration.as_str())
        .args(ctx.repository.version_arguments());
    ctx.run(spec)?;
    Ok(())
}

/// Test assembly of `project` for `framework`, relative to the project directory.
pub fn test_assembly(ctx: &BuildContext, project: &SolutionProject, framework: &str) -> PathBuf {
    PathBuf::from("bin")
        .join(ctx.configuration.as_str())
        .join(framework)
        .join(format!("{}.dll", project.name))
}

/// Execute every test project's assemblies, one framework at a time.
pub fn unit_testing(ctx: &mut BuildContext) -> anyhow::Result<()> {
    create_releases_dir(ctx)?;

    let mut executed = 0;
    for project in ctx.test_projects() {
        let project_dir = ctx.project_dir(project);
        for framework in &ctx.config.test_frameworks {
            let assembly = test_assembly(ctx, project, framework);
            info!("Testing: {}", project_dir.join(&assembly).display());
            let spec = CommandSpec::new(DOTNET)
                .arg(assembly.to_string_lossy())
                .current_dir(&project_dir);
            ctx.run(spec)
                .with_context(|| format!("Tests of {} ({}) failed", project.name, framework))?;
            executed += 1;
        }
    }

    if executed == 0 {
        warn!("no test projects found");
    }
    Ok(())
}

/// Pack every publishable project into the releases directory.
pub fn pack(ctx: &mut BuildContext) -> anyhow::Result<()> {
    let releases = create_releases_dir(ctx)?;

    for project in ctx.projects_to_publish() {
        let project_dir = ctx.project_dir(project);
        info!("Packing {}", project_dir.display());
        let spec = CommandSpec::new(DOTNET)
            .arg("pack")
            .arg(project_dir.to_string_lossy())
            .arg("--include-symbols")
            .arg("--no-build")
            .arg("--configuration")
            .arg(ctx.configuration.as_str())
            .arg("--output")
            .arg(releases.to_string_lossy())
            .args(ctx.repository.version_arguments());
        ctx.run(spec)?;
    }
    Ok(())
}

fn create_releases_dir(ctx: &BuildContext) -> anyhow::Result<PathBuf> {
    let releases = ctx.releases_dir();
    fs::create_dir_all(&releases)
        .with_context(|| format!("Failed to create {}", releases.display()))?;
    Ok(releases)
}
