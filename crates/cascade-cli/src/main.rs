//! Cascade CLI
//!
//! The command-line interface for resolving layered pipeline
//! configuration.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Cascade", "cascade".green().bold());
            println!();
            println!("Run {} for available commands.", "cascade --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve {
            template,
            dir,
            fields,
            substitute,
            json,
        } => commands::run_resolve(&template, &dir, &fields, substitute, json),
        Commands::Chain {
            template,
            dir,
            fields,
        } => commands::run_chain(&template, &dir, &fields),
        Commands::Trace {
            template,
            dir,
            fields,
            json,
        } => commands::run_trace(&template, &dir, &fields, json),
        Commands::Project {
            project,
            root,
            variation,
            tool,
            json,
        } => commands::run_project(&project, &root, &variation, tool.as_deref(), json),
    }
}
