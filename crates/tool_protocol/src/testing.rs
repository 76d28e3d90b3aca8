//! In-memory collaborators for tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::traits::CommandRunner;
use crate::types::{CommandOutput, CommandSpec, ToolError, ToolResult};

/// Records every command instead of running it.
///
/// Clones share the same log, so a test can hand one clone to the build and
/// inspect the other afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    log: Rc<RefCell<Vec<CommandSpec>>>,
    fail_on: Rc<RefCell<Vec<String>>>,
}

impl RecordingRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command whose rendered form contains `needle` fail with exit code 1.
    pub fn fail_when(&self, needle: impl Into<String>) {
        self.fail_on.borrow_mut().push(needle.into());
    }

    #[must_use]
    pub fn invocations(&self) -> Vec<CommandSpec> {
        self.log.borrow().clone()
    }

    /// Rendered command lines, in invocation order.
    #[must_use]
    pub fn command_lines(&self) -> Vec<String> {
        self.log.borrow().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> ToolResult<CommandOutput> {
        self.log.borrow_mut().push(spec.clone());

        let rendered = spec.to_string();
        if self
            .fail_on
            .borrow()
            .iter()
            .any(|needle| rendered.contains(needle.as_str()))
        {
            return Err(ToolError::Failed {
                command: rendered,
                code: Some(1),
            });
        }

        Ok(CommandOutput {
            status: Some(0),
            ..CommandOutput::default()
        })
    }
}
