//! Ragseed CLI
//!
//! Seed a local vector store from PDFs, then ask questions answered by a
//! deployed instruct endpoint.

use anyhow::Result;
use clap::Parser;
use ragseed_core::Database;

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    // Open database (use RAGSEED_DB env var if set, otherwise use default)
    let db_path = std::env::var("RAGSEED_DB")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| Database::default_path());
    let db = Database::open(&db_path)?;
    db.initialize()?;

    match cli.command {
        Commands::Seed(args) => commands::seed::run(args, &db).await,
        Commands::Ask(args) => commands::ask::run(args, &db).await,
        Commands::Complete(args) => commands::complete::run(args).await,
        Commands::Status => commands::status::run(&db),
        Commands::Models => commands::models::run(),
    }
}
