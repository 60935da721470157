//! tree-mirror CLI
//!
//! Reconciles a local directory against a remote repository's tree
//! snapshot: classify (`status`), materialize (`pull`), and inspect
//! (`repos`, `info`, `branches`).

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

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let session = commands::build_session(&cli)?;

    match cli.command {
        Commands::Status {
            reference,
            local,
            branch,
        } => commands::run_status(&session, &reference, local, branch),
        Commands::Pull {
            reference,
            local,
            branch,
            overwrite,
        } => commands::run_pull(&session, &reference, local, branch, overwrite),
        Commands::Repos { user, page } => commands::run_repos(&session, &user, page),
        Commands::Info { reference } => commands::run_info(&session, &reference),
        Commands::Branches { reference } => commands::run_branches(&session, &reference),
    }
}
