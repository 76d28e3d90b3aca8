use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::*;
use kiln_core::build_manager::BuildManager;
use kiln_core::execution::RunListener;

/// Prints a header per task, in the same frame style as the plan output.
struct ConsoleListener;

impl RunListener for ConsoleListener {
    fn on_task_start(&mut self, task: &str) {
        println!();
        println!("┌─ {}", format!("Running task '{}'", task).bold());
    }

    fn on_task_skipped(&mut self, task: &str) {
        println!();
        println!(
            "{} {}",
            "↷".yellow(),
            format!("Skipping task '{}' (criteria not met)", task).dimmed()
        );
    }

    fn on_task_succeeded(&mut self, task: &str, elapsed: Duration) {
        println!(
            "└─ {} {}",
            "✓".green().bold(),
            format!("{} ({:.2?})", task, elapsed).dimmed()
        );
    }

    fn on_task_failed(&mut self, task: &str, _error: &anyhow::Error) {
        println!("└─ {} {}", "✗".red().bold(), task.red());
    }
}

pub fn execute(manager: &mut BuildManager, task: &str) -> Result<ExitCode> {
    println!("{} {}", "Running task".bold(), task.cyan());

    let report = manager
        .run_task(task, &mut ConsoleListener)
        .context("Failed to run task")?;

    if let Some(failure) = &report.failure {
        eprintln!();
        eprintln!(
            "{} {}",
            "✗".red().bold(),
            format!("Task '{}' failed", failure.task).red().bold()
        );
        eprintln!("  {} {}", "chain:".dimmed(), failure.chain.join(" -> "));
        eprintln!("  {} {:#}", "cause:".dimmed(), failure.error);
        return Ok(ExitCode::from(crate::EXIT_TASK_FAILED));
    }

    let skipped = report.skipped();
    println!();
    if !skipped.is_empty() {
        println!("{} {}", "Skipped:".yellow(), skipped.join(", "));
    }
    println!(
        "{} {}",
        "✓".green().bold(),
        "All tasks completed successfully!".green().bold()
    );

    Ok(ExitCode::SUCCESS)
}
