use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};

use crate::context::BuildContext;

const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];

/// Empty every project's `bin` directory and the releases directory, then
/// delete files matching the configured clean patterns.
pub fn clean(ctx: &mut BuildContext) -> anyhow::Result<()> {
    for project in &ctx.projects {
        clean_directory(&ctx.project_dir(project).join("bin"))?;
    }
    clean_directory(&ctx.releases_dir())?;

    let patterns = build_glob_set(&ctx.config.clean_patterns)?;
    let deleted = delete_matching(&ctx.root, &patterns)?;
    for path in &deleted {
        debug!(path = %ctx.relative(path).display(), "deleted");
    }
    info!(files = deleted.len(), "clean finished");
    Ok(())
}

/// Remove the contents of `dir`, creating it when missing.
pub fn clean_directory(dir: &Path) -> anyhow::Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()));
    }

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

fn build_glob_set(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid clean pattern '{}'", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Delete every file under `root` whose root-relative path matches `patterns`.
fn delete_matching(root: &Path, patterns: &GlobSet) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut deleted = Vec::new();
    if patterns.is_empty() {
        return Ok(deleted);
    }

    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(current_dir) = queue.pop_front() {
        let Ok(entries) = fs::read_dir(&current_dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let skipped = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIPPED_DIRS.contains(&n));
                if !skipped {
                    queue.push_back(path);
                }
                continue;
            }

            let relative_path = path.strip_prefix(root).unwrap_or(&path);
            if patterns.is_match(relative_path) {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete {}", path.display()))?;
                deleted.push(path);
            }
        }
    }

    Ok(deleted)
}
