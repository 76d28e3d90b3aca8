//! Repository version information.
//!
//! kiln does not derive versions itself. An external tool inspects the
//! repository and writes this file; a missing file means the repository is
//! not in a publishable state.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{KilnError, KilnResult};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum VersionKind {
    /// A tagged release.
    Release,
    /// A continuous-integration build between releases.
    Ci,
    #[default]
    Invalid,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    #[serde(default)]
    pub kind: VersionKind,
    #[serde(default)]
    pub sem_ver: String,
    #[serde(default)]
    pub nuget_version: String,
    #[serde(default)]
    pub major_minor: String,
    #[serde(default)]
    pub file_version: String,
    #[serde(default)]
    pub pre_release_name: String,
    #[serde(default)]
    pub commit_sha: String,
    #[serde(default)]
    pub commit_date_utc: String,
}

impl VersionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Ci => "ci",
            Self::Invalid => "invalid",
        }
    }
}

impl RepositoryInfo {
    pub fn is_valid(&self) -> bool {
        self.kind != VersionKind::Invalid
    }

    pub fn is_valid_release(&self) -> bool {
        self.kind == VersionKind::Release
    }

    pub fn is_valid_ci_build(&self) -> bool {
        self.kind == VersionKind::Ci
    }

    /// Releases without a pre-release name, or release candidates, are built
    /// in `Release` configuration.
    pub fn is_release_build(&self) -> bool {
        self.is_valid_release()
            && (self.pre_release_name.is_empty() || self.pre_release_name == "rc")
    }

    /// MSBuild property arguments stamping the version into the build.
    ///
    /// Empty when the information is not valid.
    pub fn version_arguments(&self) -> Vec<String> {
        if !self.is_valid() {
            return Vec::new();
        }
        vec![
            "/p:CakeBuild=true".to_string(),
            format!("/p:Version={}", self.nuget_version),
            format!("/p:AssemblyVersion={}.0", self.major_minor),
            format!("/p:FileVersion={}", self.file_version),
            format!(
                "/p:InformationalVersion={} ({}) - SHA1: {} - CommitDate: {}",
                self.sem_ver, self.nuget_version, self.commit_sha, self.commit_date_utc
            ),
        ]
    }
}

/// Parse version information. Release and CI information must carry every
/// version part used to stamp the build.
pub fn parse_repository_info(yaml_str: &str) -> KilnResult<RepositoryInfo> {
    let info: RepositoryInfo = serde_yaml::from_str(yaml_str)?;
    if info.is_valid() {
        let required = [
            ("semVer", &info.sem_ver),
            ("nugetVersion", &info.nuget_version),
            ("majorMinor", &info.major_minor),
            ("fileVersion", &info.file_version),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(KilnError::Config(format!(
                "version information of kind '{}' is missing {}",
                info.kind.as_str(),
                missing.join(", ")
            )));
        }
    }
    Ok(info)
}

/// Load version information, treating a missing file as invalid information.
pub fn load_repository_info(path: &Path) -> KilnResult<RepositoryInfo> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no version file, repository info is invalid");
        return Ok(RepositoryInfo::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        KilnError::Config(format!(
            "Failed to read version file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_repository_info(&content).map_err(|e| {
        KilnError::Config(format!(
            "Failed to parse version file {}: {}",
            path.display(),
            e
        ))
    })
}
