use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use kiln_core::build_manager::{BuildManager, BuildManagerConfig};
use kiln_core::KilnError;
use tracing_subscriber::EnvFilter;

mod commands;

/// Exit code of a run whose task action failed.
const EXIT_TASK_FAILED: u8 = 1;
/// Exit code of a misconfigured build: bad build file, unknown task, cycle.
const EXIT_CONFIGURATION: u8 = 2;

/// Kiln - A task-graph build runner for .NET solutions
#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Build, test, pack and publish a solution")]
#[command(version)]
struct Cli {
    /// Path to the repository root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Build file (defaults to <root>/.kiln/build.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Version information file (defaults to the build file's versionFile)
    #[arg(long)]
    version_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task and its prerequisites
    Run {
        /// Task to run
        #[arg(default_value = "Default")]
        task: String,
    },
    /// Show the execution order of a task without running it
    Plan {
        /// Task to plan
        #[arg(default_value = "Default")]
        task: String,
    },
    /// List registered tasks
    List,
    /// Show the task dependency graph
    Graph,
    /// Print the JSON schema of the build file
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            let is_configuration = err
                .downcast_ref::<KilnError>()
                .is_some_and(KilnError::is_configuration);
            if is_configuration {
                ExitCode::from(EXIT_CONFIGURATION)
            } else {
                ExitCode::from(EXIT_TASK_FAILED)
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn execute(cli: Cli) -> Result<ExitCode> {
    if let Commands::Schema = cli.command {
        commands::schema::execute()?;
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize build manager with all business logic
    let mut manager = BuildManager::new(BuildManagerConfig {
        root: cli.root,
        config_path: cli.config,
        version_file: cli.version_file,
    })
    .context("Failed to initialize build")?;

    // Execute command (CLI layer only handles presentation)
    match cli.command {
        Commands::Run { task } => commands::run::execute(&mut manager, &task),
        Commands::Plan { task } => commands::plan::execute(&manager, &task).map(|_| ExitCode::SUCCESS),
        Commands::List => commands::list::execute(&manager).map(|_| ExitCode::SUCCESS),
        Commands::Graph => commands::graph::execute(&manager).map(|_| ExitCode::SUCCESS),
        Commands::Schema => Ok(ExitCode::SUCCESS),
    }
}
