//! Fail-fast task runner
//!
//! Runs a resolved [`ExecutionPlan`] one task at a time. Predicates are
//! evaluated when a task's turn comes, after all of its prerequisites reached
//! a terminal state. The first failing action halts the run.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::execution::dependencies::resolve_execution_plan;
use crate::execution::graph::TaskGraph;
use crate::results::{RunReport, TaskFailure, TaskState};
use crate::types::KilnResult;

/// Observer of a run's progress.
pub trait RunListener {
    fn on_task_start(&mut self, _task: &str) {}

    fn on_task_skipped(&mut self, _task: &str) {}

    fn on_task_succeeded(&mut self, _task: &str, _elapsed: Duration) {}

    fn on_task_failed(&mut self, _task: &str, _error: &anyhow::Error) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl RunListener for NoopListener {}

impl<C> TaskGraph<C> {
    /// Run `root` and its prerequisites against `context`.
    ///
    /// Configuration problems (unknown task, missing prerequisite, cycle) are
    /// returned as errors before any action runs. A failing action yields an
    /// `Ok` report carrying the failure; see [`RunReport::into_result`].
    pub fn run(&mut self, root: &str, context: &mut C) -> KilnResult<RunReport> {
        self.run_with_listener(root, context, &mut NoopListener)
    }

    pub fn run_with_listener(
        &mut self,
        root: &str,
        context: &mut C,
        listener: &mut dyn RunListener,
    ) -> KilnResult<RunReport> {
        let plan = resolve_execution_plan(self, root)?;
        let mut report = RunReport::new(&plan);
        info!(root, tasks = plan.len(), "starting run");

        for name in &plan.order {
            let Some(task) = self.task_mut(name) else {
                continue;
            };

            if !task.should_run(context) {
                debug!(task = %name, "criteria not met, skipping");
                report.set_state(name, TaskState::Skipped);
                listener.on_task_skipped(name);
                continue;
            }

            report.set_state(name, TaskState::InProgress);
            listener.on_task_start(name);
            let started = Instant::now();

            let outcome = task
                .actions
                .iter_mut()
                .try_for_each(|action| action(&mut *context));

            match outcome {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    debug!(task = %name, ?elapsed, "task succeeded");
                    report.set_state(name, TaskState::Succeeded);
                    listener.on_task_succeeded(name, elapsed);
                }
                Err(error) => {
                    warn!(task = %name, error = %format!("{error:#}"), "task failed, halting run");
                    report.set_state(name, TaskState::Failed);
                    listener.on_task_failed(name, &error);
                    report.failure = Some(TaskFailure {
                        task: name.clone(),
                        chain: plan
                            .chain_to(name)
                            .map(<[String]>::to_vec)
                            .unwrap_or_else(|| vec![name.clone()]),
                        error,
                    });
                    break;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KilnError;

    /// Context for kernel tests: records which actions ran and which
    /// predicates were evaluated.
    #[derive(Default)]
    struct Recorder {
        ran: Vec<String>,
        checked: Vec<String>,
        publish: bool,
    }

    fn record(name: &'static str) -> impl FnMut(&mut Recorder) -> anyhow::Result<()> {
        move |ctx: &mut Recorder| {
            ctx.ran.push(name.to_string());
            Ok(())
        }
    }

    fn fail(name: &'static str) -> impl FnMut(&mut Recorder) -> anyhow::Result<()> {
        move |ctx: &mut Recorder| {
            ctx.ran.push(name.to_string());
            anyhow::bail!("{name} exploded")
        }
    }

    /// Clean -> Restore -> Build -> Test -> Pack -> Push, Pack gated on `publish`.
    fn pipeline(failing: Option<&'static str>) -> TaskGraph<Recorder> {
        let mut graph = TaskGraph::new();
        let steps = ["Clean", "Restore", "Build", "Test", "Pack", "Push"];
        let mut previous: Option<&str> = None;
        for step in steps {
            let mut builder = graph.register(step).unwrap();
            if let Some(prev) = previous {
                builder = builder.depends_on(prev);
            }
            builder = if failing == Some(step) {
                builder.does(fail(step))
            } else {
                builder.does(record(step))
            };
            if step == "Pack" {
                builder.with_criteria(|ctx: &Recorder| ctx.publish);
            }
            previous = Some(step);
        }
        graph
    }

    #[test]
    fn test_runs_chain_in_order() {
        let mut graph = pipeline(None);
        let mut ctx = Recorder {
            publish: true,
            ..Recorder::default()
        };

        let report = graph.run("Push", &mut ctx).unwrap();
        assert!(report.is_success());
        assert_eq!(ctx.ran, vec!["Clean", "Restore", "Build", "Test", "Pack", "Push"]);
        assert_eq!(report.state_of("Push"), Some(TaskState::Succeeded));
    }

    #[test]
    fn test_skipped_task_does_not_block_dependents() {
        let mut graph = pipeline(None);
        let mut ctx = Recorder::default();

        let report = graph.run("Push", &mut ctx).unwrap();
        assert!(report.is_success());
        assert_eq!(ctx.ran, vec!["Clean", "Restore", "Build", "Test", "Push"]);
        assert_eq!(report.state_of("Pack"), Some(TaskState::Skipped));
        assert_eq!(report.skipped(), vec!["Pack"]);
    }

    #[test]
    fn test_failure_halts_downstream() {
        let mut graph = pipeline(Some("Build"));
        let mut ctx = Recorder {
            publish: true,
            ..Recorder::default()
        };

        let report = graph.run("Push", &mut ctx).unwrap();
        assert!(!report.is_success());
        assert_eq!(ctx.ran, vec!["Clean", "Restore", "Build"]);
        assert_eq!(report.executed(), vec!["Clean", "Restore", "Build"]);
        assert_eq!(report.pending(), vec!["Test", "Pack", "Push"]);
        assert_eq!(report.state_of("Build"), Some(TaskState::Failed));

        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.task, "Build");
        assert_eq!(failure.chain, vec!["Push", "Pack", "Test", "Build"]);
        assert_eq!(failure.error.to_string(), "Build exploded");

        let err = report.into_result().unwrap_err();
        assert!(!err.is_configuration());
        assert!(matches!(err, KilnError::TaskFailed { ref task, .. } if task == "Build"));
    }

    #[test]
    fn test_completed_siblings_stay_completed() {
        let mut graph = TaskGraph::new();
        graph.register("Docs").unwrap().does(record("Docs"));
        graph.register("Lint").unwrap().does(fail("Lint"));
        graph.register("Compile").unwrap().does(record("Compile"));
        graph
            .register("All")
            .unwrap()
            .depends_on("Docs")
            .depends_on("Lint")
            .depends_on("Compile")
            .does(record("All"));

        let mut ctx = Recorder::default();
        let report = graph.run("All", &mut ctx).unwrap();

        assert_eq!(ctx.ran, vec!["Docs", "Lint"]);
        assert_eq!(report.state_of("Docs"), Some(TaskState::Succeeded));
        assert_eq!(report.state_of("Compile"), Some(TaskState::Pending));
        assert_eq!(report.state_of("All"), Some(TaskState::Pending));
    }

    #[test]
    fn test_shared_prerequisite_runs_once() {
        let mut graph = TaskGraph::new();
        graph
            .register("Check")
            .unwrap()
            .with_criteria(|ctx: &Recorder| ctx.checked.is_empty())
            .does(|ctx: &mut Recorder| {
                ctx.checked.push("Check".to_string());
                ctx.ran.push("Check".to_string());
                Ok(())
            });
        graph.register("Clean").unwrap().depends_on("Check").does(record("Clean"));
        graph
            .register("Restore")
            .unwrap()
            .depends_on("Check")
            .depends_on("Clean")
            .does(record("Restore"));
        graph
            .register("Build")
            .unwrap()
            .depends_on("Check")
            .depends_on("Clean")
            .depends_on("Restore")
            .does(record("Build"));

        let mut ctx = Recorder::default();
        graph.run("Build", &mut ctx).unwrap().into_result().unwrap();
        assert_eq!(ctx.ran, vec!["Check", "Clean", "Restore", "Build"]);
    }

    #[test]
    fn test_predicates_are_evaluated_fresh_each_run() {
        let mut graph = pipeline(None);

        let mut ctx = Recorder::default();
        graph.run("Pack", &mut ctx).unwrap();
        assert!(!ctx.ran.contains(&"Pack".to_string()));

        let mut ctx = Recorder {
            publish: true,
            ..Recorder::default()
        };
        let report = graph.run("Pack", &mut ctx).unwrap();
        assert_eq!(report.state_of("Pack"), Some(TaskState::Succeeded));
        assert_eq!(ctx.ran.last().map(String::as_str), Some("Pack"));
    }

    #[test]
    fn test_shared_predicate_evaluated_once_per_run() {
        use std::cell::Cell;
        use std::rc::Rc;

        let evaluations = Rc::new(Cell::new(0));
        let counter = Rc::clone(&evaluations);

        let mut graph = TaskGraph::new();
        graph
            .register("Base")
            .unwrap()
            .with_criteria(move |_: &Recorder| {
                counter.set(counter.get() + 1);
                true
            })
            .does(record("Base"));
        graph.register("Left").unwrap().depends_on("Base").does(record("Left"));
        graph.register("Right").unwrap().depends_on("Base").does(record("Right"));
        graph
            .register("Top")
            .unwrap()
            .depends_on("Left")
            .depends_on("Right")
            .does(record("Top"));

        let mut ctx = Recorder::default();
        graph.run("Top", &mut ctx).unwrap().into_result().unwrap();
        assert_eq!(evaluations.get(), 1);
        assert_eq!(ctx.ran, vec!["Base", "Left", "Right", "Top"]);

        let mut ctx = Recorder::default();
        graph.run("Top", &mut ctx).unwrap().into_result().unwrap();
        assert_eq!(evaluations.get(), 2);
        assert_eq!(ctx.ran, vec!["Base", "Left", "Right", "Top"]);
    }

    #[test]
    fn test_cycle_runs_nothing() {
        let mut graph = TaskGraph::new();
        graph.register("Setup").unwrap().does(record("Setup"));
        graph
            .register("A")
            .unwrap()
            .depends_on("Setup")
            .depends_on("B")
            .does(record("A"));
        graph.register("B").unwrap().depends_on("A").does(record("B"));

        let mut ctx = Recorder::default();
        let err = graph.run("A", &mut ctx).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> A");
        assert!(ctx.ran.is_empty());
    }

    #[test]
    fn test_missing_prerequisite_runs_nothing() {
        let mut graph = TaskGraph::new();
        graph.register("Clean").unwrap().does(record("Clean"));
        graph
            .register("Build")
            .unwrap()
            .depends_on("Clean")
            .depends_on("Restore")
            .does(record("Build"));

        let mut ctx = Recorder::default();
        let err = graph.run("Build", &mut ctx).unwrap_err();
        assert!(matches!(err, KilnError::MissingDependency { ref dependency, .. } if dependency == "Restore"));
        assert!(ctx.ran.is_empty());
    }

    #[test]
    fn test_unknown_root_runs_nothing() {
        let mut graph = pipeline(None);
        let mut ctx = Recorder::default();
        assert!(matches!(
            graph.run("Deploy", &mut ctx),
            Err(KilnError::TaskNotFound(_))
        ));
        assert!(ctx.ran.is_empty());
    }

    #[test]
    fn test_task_without_actions_succeeds() {
        let mut graph = pipeline(None);
        graph.register("Default").unwrap().depends_on("Push");

        let mut ctx = Recorder::default();
        let report = graph.run("Default", &mut ctx).unwrap();
        assert_eq!(report.state_of("Default"), Some(TaskState::Succeeded));
    }

    #[test]
    fn test_listener_sees_every_transition() {
        #[derive(Default)]
        struct Events(Vec<String>);

        impl RunListener for Events {
            fn on_task_start(&mut self, task: &str) {
                self.0.push(format!("start {task}"));
            }
            fn on_task_skipped(&mut self, task: &str) {
                self.0.push(format!("skip {task}"));
            }
            fn on_task_succeeded(&mut self, task: &str, _elapsed: Duration) {
                self.0.push(format!("ok {task}"));
            }
            fn on_task_failed(&mut self, task: &str, _error: &anyhow::Error) {
                self.0.push(format!("fail {task}"));
            }
        }

        let mut graph = pipeline(Some("Push"));
        let mut events = Events::default();
        let mut ctx = Recorder::default();
        graph
            .run_with_listener("Push", &mut ctx, &mut events)
            .unwrap();

        assert_eq!(
            events.0,
            vec![
                "start Clean",
                "ok Clean",
                "start Restore",
                "ok Restore",
                "start Build",
                "ok Build",
                "start Test",
                "ok Test",
                "skip Pack",
                "start Push",
                "fail Push",
            ]
        );
    }
}
