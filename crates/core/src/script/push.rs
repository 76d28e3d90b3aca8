//! Package publication.
//!
//! The feed is chosen from the version kind: final releases and release
//! candidates go to the release feed, other pre-releases to the preview feed,
//! CI builds to the CI feed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kiln_tool_protocol::CommandSpec;
use tracing::info;

use crate::configs::build::{FeedConfig, FeedsConfig};
use crate::configs::version::RepositoryInfo;
use crate::context::BuildContext;

const RELEASE_PRERELEASE_NAMES: &[&str] = &["", "prerelease", "rc"];

/// Feed for `repository`, or `None` when nothing may be published.
pub fn select_feed<'f>(repository: &RepositoryInfo, feeds: &'f FeedsConfig) -> Option<&'f FeedConfig> {
    if repository.is_valid_release() {
        if RELEASE_PRERELEASE_NAMES.contains(&repository.pre_release_name.as_str()) {
            Some(&feeds.release)
        } else {
            Some(&feeds.preview)
        }
    } else if repository.is_valid_ci_build() {
        Some(&feeds.ci)
    } else {
        None
    }
}

/// `*.nupkg` files in `dir`, symbol packages excluded, sorted by name.
pub fn collect_packages(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut packages = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".nupkg") && !name.ends_with(".symbols.nupkg") && path.is_file() {
            packages.push(path);
        }
    }
    packages.sort();
    Ok(packages)
}

pub fn push_packages(ctx: &mut BuildContext) -> anyhow::Result<()> {
    let packages = collect_packages(&ctx.releases_dir())?;

    if let Some(feed) = select_feed(&ctx.repository, &ctx.config.feeds) {
        push_to_feed(ctx, feed, &packages)?;
    }

    if is_running_on_appveyor(ctx) {
        let spec = CommandSpec::new("appveyor")
            .arg("UpdateBuild")
            .arg("-Version")
            .arg(&ctx.repository.sem_ver);
        ctx.run(spec)?;
    }
    Ok(())
}

fn push_to_feed(ctx: &BuildContext, feed: &FeedConfig, packages: &[PathBuf]) -> anyhow::Result<()> {
    let Some(api_key) = ctx.env.non_empty_var(&feed.api_key_variable) else {
        info!(
            "Could not resolve {}. Push to {} is skipped.",
            feed.api_key_variable, feed.url
        );
        return Ok(());
    };

    for package in packages {
        info!("Pushing '{}' to '{}'.", ctx.relative(package).display(), feed.url);
        let spec = CommandSpec::new("dotnet")
            .arg("nuget")
            .arg("push")
            .arg(package.to_string_lossy())
            .arg("--source")
            .arg(&feed.url)
            .arg("--api-key")
            .secret_arg(&api_key);
        ctx.run(spec)?;
    }
    Ok(())
}

fn is_running_on_appveyor(ctx: &BuildContext) -> bool {
    ctx.env
        .var("APPVEYOR")
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}
