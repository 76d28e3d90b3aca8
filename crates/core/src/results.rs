//! Result types for task runs
//!
//! This module contains the types returned by the task runner and the build
//! manager, so callers can inspect what happened without re-running anything.

use std::collections::HashMap;

use crate::execution::dependencies::ExecutionPlan;
use crate::types::{KilnError, KilnResult};

/// Lifecycle of a task within a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InProgress,
    Skipped,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped | Self::Succeeded | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Skipped => "skipped",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// The first, and only, action failure of a run.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: String,
    /// Task names from the run root down to the failing task.
    pub chain: Vec<String>,
    pub error: anyhow::Error,
}

/// Outcome of [`TaskGraph::run`](crate::execution::TaskGraph::run).
#[derive(Debug)]
pub struct RunReport {
    pub root: String,
    order: Vec<String>,
    states: HashMap<String, TaskState>,
    pub failure: Option<TaskFailure>,
}

impl RunReport {
    pub(crate) fn new(plan: &ExecutionPlan) -> Self {
        Self {
            root: plan.root.clone(),
            order: plan.order.clone(),
            states: plan
                .order
                .iter()
                .map(|name| (name.clone(), TaskState::Pending))
                .collect(),
            failure: None,
        }
    }

    pub(crate) fn set_state(&mut self, task: &str, state: TaskState) {
        self.states.insert(task.to_string(), state);
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// State of `task` in this run; `None` if the run never planned it.
    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.states.get(task).copied()
    }

    /// Planned tasks with their states, in execution order.
    pub fn states(&self) -> impl Iterator<Item = (&str, TaskState)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.states[name.as_str()]))
    }

    /// Tasks whose actions were invoked, in execution order.
    pub fn executed(&self) -> Vec<&str> {
        self.with_state(|s| matches!(s, TaskState::Succeeded | TaskState::Failed))
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.with_state(|s| s == TaskState::Skipped)
    }

    /// Tasks that never started because the run halted first.
    pub fn pending(&self) -> Vec<&str> {
        self.with_state(|s| s == TaskState::Pending)
    }

    fn with_state(&self, keep: impl Fn(TaskState) -> bool) -> Vec<&str> {
        self.states()
            .filter(|(_, state)| keep(*state))
            .map(|(name, _)| name)
            .collect()
    }

    /// Turn a failed run into [`KilnError::TaskFailed`].
    pub fn into_result(mut self) -> KilnResult<Self> {
        match self.failure.take() {
            Some(failure) => Err(KilnError::TaskFailed {
                task: failure.task,
                chain: failure.chain,
                source: failure.error,
            }),
            None => Ok(self),
        }
    }
}

/// Summary of a registered task, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub name: String,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    pub conditional: bool,
}
