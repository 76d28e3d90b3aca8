use anyhow::{Context, Result};
use colored::*;
use kiln_core::build_manager::BuildManager;

pub fn execute(manager: &BuildManager, task: &str) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), task.cyan());

    let plan = manager
        .get_execution_plan(task)
        .context("Failed to get execution plan")?;

    println!("\n{}:", "Execution order".bold());
    for (i, name) in plan.order.iter().enumerate() {
        let conditional = manager
            .task_graph()
            .task(name)
            .is_some_and(|t| t.has_criteria());
        if conditional {
            println!("  {}. {} {}", i + 1, name, "(conditional)".dimmed());
        } else {
            println!("  {}. {}", i + 1, name);
        }
    }

    Ok(())
}
