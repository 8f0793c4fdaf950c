//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragseed")]
#[command(
    author,
    version,
    about = "Seed a local vector store from PDFs and ask questions through an instruct endpoint"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed a collection from a PDF file or directory
    Seed(SeedArgs),

    /// Ask a question against seeded collections
    Ask(AskArgs),

    /// Send a single prompt straight to the instruct endpoint
    Complete(CompleteArgs),

    /// Show seeded collections
    Status,

    /// List known model identifiers and their context sizes
    Models,
}

#[derive(Args)]
pub struct SeedArgs {
    /// PDF file or directory to ingest
    pub path: PathBuf,

    /// Collection name
    #[arg(short, long, default_value = "default")]
    pub collection: String,

    /// Glob pattern for directory ingestion
    #[arg(long, default_value = "**/*.pdf")]
    pub pattern: String,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question text
    pub question: Vec<String>,

    /// Number of chunks to retrieve
    #[arg(short = 'n', long, default_value = "4")]
    pub limit: usize,

    /// Restrict retrieval to a collection
    #[arg(short, long)]
    pub collection: Option<String>,

    /// Minimum similarity score
    #[arg(long, default_value = "0")]
    pub min_score: f32,

    /// Show retrieved chunks
    #[arg(long)]
    pub sources: bool,
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Prompt text
    pub prompt: Vec<String>,

    /// Stop sequences (defaults to the endpoint stop token)
    #[arg(long)]
    pub stop: Vec<String>,

    /// Override the sampling temperature for this call
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Override the completion token limit for this call
    #[arg(long)]
    pub max_tokens: Option<u32>,
}
