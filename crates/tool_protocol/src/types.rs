//! Value types exchanged between build tasks and their collaborators.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A fully described external program invocation.
///
/// Specs are plain data so fakes can record and compare them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; `None` means the runner's own default.
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// Positions in `args` that hold secrets; they are masked when displayed.
    pub secret_args: BTreeSet<usize>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            secret_args: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append an argument that must never show up in logs.
    #[must_use]
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.insert(self.args.len());
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret_args.contains(&i) {
                write!(f, " ***")?;
            } else if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// What a successful invocation produced.
///
/// `stdout` and `stderr` hold captured output. Runners that stream output
/// straight to the console, like the process runner, leave them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Failure reported by a collaborator.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed with exit code {}", code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()))]
    Failed { command: String, code: Option<i32> },
}

pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = CommandSpec::new("dotnet")
            .arg("build")
            .arg("/p:InformationalVersion=1.0.0 (1.0.0)");
        assert_eq!(
            spec.to_string(),
            "dotnet build \"/p:InformationalVersion=1.0.0 (1.0.0)\""
        );
    }

    #[test]
    fn display_masks_secrets() {
        let spec = CommandSpec::new("dotnet")
            .args(["nuget", "push", "pkg.nupkg", "--api-key"])
            .secret_arg("s3cr3t");
        assert_eq!(spec.to_string(), "dotnet nuget push pkg.nupkg --api-key ***");
        assert_eq!(spec.args.last().map(String::as_str), Some("s3cr3t"));
    }

    #[test]
    fn failed_error_reports_exit_code() {
        let err = ToolError::Failed {
            command: "dotnet test".to_string(),
            code: Some(3),
        };
        assert_eq!(err.to_string(), "'dotnet test' failed with exit code 3");

        let err = ToolError::Failed {
            command: "dotnet test".to_string(),
            code: None,
        };
        assert!(err.to_string().ends_with("<signal>"));
    }

    #[test]
    fn spawn_error_keeps_cause_as_source() {
        use std::error::Error as _;

        let err = ToolError::Spawn {
            program: "dotnet".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to start 'dotnet'");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("not found"));
    }
}
