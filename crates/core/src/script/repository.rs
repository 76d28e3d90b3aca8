use anyhow::bail;
use tracing::info;

use crate::context::{BuildContext, Configuration};

/// Refuse to build from a repository without valid version information, and
/// switch to `Release` for final releases and release candidates.
pub fn check_repository(ctx: &mut BuildContext) -> anyhow::Result<()> {
    if !ctx.repository.is_valid() {
        bail!("Repository is not ready to be published.");
    }

    if ctx.repository.is_release_build() {
        ctx.configuration = Configuration::Release;
    }

    let names: Vec<&str> = ctx.projects_to_publish().map(|p| p.name.as_str()).collect();
    info!(
        "Publishing {} projects with version={} and configuration={}: {}",
        names.len(),
        ctx.repository.sem_ver,
        ctx.configuration,
        names.join(", ")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use kiln_tool_protocol::testing::RecordingRunner;
    use kiln_tool_protocol::MapEnv;

    use super::*;
    use crate::configs::version::{RepositoryInfo, VersionKind};
    use crate::script::test_support::{context, repository};

    fn configuration_for(info: RepositoryInfo) -> anyhow::Result<Configuration> {
        let dir = tempfile::tempdir()?;
        let mut ctx = context(dir.path(), info, &RecordingRunner::new(), MapEnv::new());
        check_repository(&mut ctx)?;
        Ok(ctx.configuration)
    }

    #[test]
    fn test_release_and_rc_build_in_release() {
        assert_eq!(
            configuration_for(repository(VersionKind::Release, "")).unwrap(),
            Configuration::Release
        );
        assert_eq!(
            configuration_for(repository(VersionKind::Release, "rc")).unwrap(),
            Configuration::Release
        );
    }

    #[test]
    fn test_prerelease_and_ci_build_in_debug() {
        assert_eq!(
            configuration_for(repository(VersionKind::Release, "beta")).unwrap(),
            Configuration::Debug
        );
        assert_eq!(
            configuration_for(repository(VersionKind::Ci, "ci")).unwrap(),
            Configuration::Debug
        );
    }

    #[test]
    fn test_invalid_repository_fails() {
        let err = configuration_for(RepositoryInfo::default()).unwrap_err();
        assert_eq!(err.to_string(), "Repository is not ready to be published.");
    }
}
