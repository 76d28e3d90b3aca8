use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{KilnError, KilnResult};

pub const DEFAULT_CONFIG_PATH: &str = ".kiln/build.yml";

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
    pub solution_name: String,
    /// Defaults to `<solutionName>.sln`.
    pub solution_file: Option<String>,
    #[serde(default = "default_builder_project")]
    pub builder_project: String,
    #[serde(default = "default_core_build_project")]
    pub core_build_project: String,
    #[serde(default = "default_releases_dir")]
    pub releases_dir: String,
    /// Where the external versioning tool writes repository information.
    #[serde(default = "default_version_file")]
    pub version_file: String,
    /// Glob patterns (relative to the root) of files deleted by `Clean`.
    #[serde(default = "default_clean_patterns")]
    pub clean_patterns: Vec<String>,
    /// Target frameworks whose test assemblies `Unit-Testing` executes.
    #[serde(default = "default_test_frameworks")]
    pub test_frameworks: Vec<String>,
    #[serde(default)]
    pub feeds: FeedsConfig,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeedsConfig {
    #[serde(default = "default_release_feed")]
    pub release: FeedConfig,
    #[serde(default = "default_preview_feed")]
    pub preview: FeedConfig,
    #[serde(default = "default_ci_feed")]
    pub ci: FeedConfig,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeedConfig {
    pub url: String,
    /// Name of the variable holding the API key for this feed.
    pub api_key_variable: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            release: default_release_feed(),
            preview: default_preview_feed(),
            ci: default_ci_feed(),
        }
    }
}

impl BuildConfig {
    pub fn solution_file(&self) -> String {
        self.solution_file
            .clone()
            .unwrap_or_else(|| format!("{}.sln", self.solution_name))
    }

    pub fn releases_path(&self, root: &Path) -> PathBuf {
        root.join(&self.releases_dir)
    }

    fn validate(&self) -> KilnResult<()> {
        if self.solution_name.trim().is_empty() {
            return Err(KilnError::Config("solutionName must not be empty".to_string()));
        }
        if self.releases_dir.trim().is_empty() {
            return Err(KilnError::Config("releasesDir must not be empty".to_string()));
        }
        Ok(())
    }
}

pub fn parse_build_config(yaml_str: &str) -> KilnResult<BuildConfig> {
    let config: BuildConfig = serde_yaml::from_str(yaml_str)?;
    config.validate()?;
    Ok(config)
}

/// JSON schema of the build file, pretty printed.
pub fn build_config_schema() -> KilnResult<String> {
    let schema = schemars::schema_for!(BuildConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| KilnError::Config(format!("Failed to render schema: {}", e)))
}

fn default_builder_project() -> String {
    "CodeCakeBuilder".to_string()
}

fn default_core_build_project() -> String {
    "CodeCakeBuilder/CoreBuild.proj".to_string()
}

fn default_releases_dir() -> String {
    "CodeCakeBuilder/Releases".to_string()
}

fn default_version_file() -> String {
    ".kiln/version.yml".to_string()
}

fn default_clean_patterns() -> Vec<String> {
    vec!["Tests/**/TestResult*.xml".to_string()]
}

fn default_test_frameworks() -> Vec<String> {
    vec!["netcoreapp1.1".to_string()]
}

fn default_release_feed() -> FeedConfig {
    FeedConfig {
        url: "https://www.nuget.org/api/v2/package".to_string(),
        api_key_variable: "NUGET_API_KEY".to_string(),
    }
}

fn default_preview_feed() -> FeedConfig {
    FeedConfig {
        url: "https://www.myget.org/F/invenietis-preview/api/v2/package".to_string(),
        api_key_variable: "MYGET_PREVIEW_API_KEY".to_string(),
    }
}

fn default_ci_feed() -> FeedConfig {
    FeedConfig {
        url: "https://www.myget.org/F/invenietis-ci/api/v2/package".to_string(),
        api_key_variable: "MYGET_CI_API_KEY".to_string(),
    }
}
