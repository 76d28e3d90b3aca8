use anyhow::Result;
use colored::*;
use kiln_core::build_manager::BuildManager;

pub fn execute(manager: &BuildManager) -> Result<()> {
    println!("{}", "Tasks".bold().underline());

    let tasks = manager.list_tasks();
    if tasks.is_empty() {
        println!("  {}", "No tasks registered".dimmed());
        return Ok(());
    }

    for task in tasks {
        match &task.description {
            Some(description) => println!("{}  {}", task.name.blue().bold(), description.dimmed()),
            None => println!("{}", task.name.blue().bold()),
        }
    }

    Ok(())
}
