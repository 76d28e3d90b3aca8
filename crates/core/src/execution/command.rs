//! Process-backed command runner
//!
//! [`ProcessRunner`] is the real [`CommandRunner`]: it spawns the program,
//! streams its output to the console and waits for it to exit.

use std::path::PathBuf;
use std::process::Command;

use kiln_tool_protocol::{CommandOutput, CommandRunner, CommandSpec, ToolError, ToolResult};
use tracing::{debug, info};

/// Runs commands as child processes of kiln.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Working directory for specs that do not set their own.
    root: PathBuf,
}

impl ProcessRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn build_command(&self, spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);

        let cwd = match &spec.cwd {
            Some(dir) if dir.is_relative() => self.root.join(dir),
            Some(dir) => dir.clone(),
            None => self.root.clone(),
        };
        command.current_dir(cwd);

        for (key, value) in &spec.env {
            command.env(key, value);
        }
        command
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput> {
        info!(command = %spec, "executing command");
        let mut command = self.build_command(spec);
        debug!(working_dir = ?command.get_current_dir(), "spawning process");

        let status = command.status().map_err(|source| ToolError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(ToolError::Failed {
                command: spec.to_string(),
                code: status.code(),
            });
        }

        // Output went to the inherited console streams; nothing is captured.
        Ok(CommandOutput {
            status: status.code(),
            ..CommandOutput::default()
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_successful_command() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());

        let spec = CommandSpec::new("sh").arg("-c").arg("touch marker");
        let output = runner.run(&spec).unwrap();

        assert_eq!(output.status, Some(0));
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn test_relative_working_directory_and_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let runner = ProcessRunner::new(dir.path());

        let spec = CommandSpec::new("sh")
            .arg("-c")
            .arg("touch \"$MARKER\"")
            .current_dir("sub")
            .env("MARKER", "from-env");
        runner.run(&spec).unwrap();

        assert!(dir.path().join("sub").join("from-env").exists());
    }

    #[test]
    fn test_output_is_streamed_not_captured() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());

        let output = runner
            .run(&CommandSpec::new("sh").arg("-c").arg("echo streamed; echo warn >&2"))
            .unwrap();
        assert_eq!(output.status, Some(0));
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());

        let err = runner
            .run(&CommandSpec::new("sh").arg("-c").arg("exit 3"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { code: Some(3), .. }));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());

        let err = runner
            .run(&CommandSpec::new("kiln-definitely-not-a-program"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
        assert_eq!(err.to_string(), "failed to start 'kiln-definitely-not-a-program'");
    }
}
