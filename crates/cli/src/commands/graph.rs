use anyhow::Result;
use colored::*;
use kiln_core::build_manager::BuildManager;

pub fn execute(manager: &BuildManager) -> Result<()> {
    println!("{}", "Task Dependency Graph:".bold().underline());

    for task in manager.task_graph().tasks() {
        if task.has_criteria() {
            println!("{} {}", task.name().blue().bold(), "[conditional]".yellow());
        } else {
            println!("{}", task.name().blue().bold());
        }

        if task.dependencies().is_empty() {
            println!("  {}", "no dependencies".dimmed());
        } else {
            println!(
                "  {} {}",
                "depends on:".dimmed(),
                task.dependencies().join(", ")
            );
        }
        println!();
    }

    Ok(())
}
