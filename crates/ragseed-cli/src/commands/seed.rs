//! Seed command

use crate::app::SeedArgs;
use anyhow::Result;
use ragseed_core::{load_path, seed_documents, Database, HttpEmbedder, SeedProgress};

pub async fn run(args: SeedArgs, db: &Database) -> Result<()> {
    let embedder = HttpEmbedder::from_env()?;
    println!(
        "Embedding service: {} ({})",
        embedder.options().endpoint,
        embedder.options().model
    );

    println!("Loading documents from {}...", args.path.display());
    let docs = load_path(&args.path, &args.pattern)?;
    if docs.is_empty() {
        println!("No PDF documents found.");
        return Ok(());
    }
    println!("Loaded {} document(s)", docs.len());

    println!("Seeding collection '{}'...", args.collection);
    let stats = seed_documents(
        db,
        &embedder,
        &args.collection,
        &docs,
        Some(Box::new(|progress: SeedProgress| {
            eprint!(
                "\rSeeding: {}/{} docs, {} chunks embedded   ",
                progress.processed_docs, progress.total_docs, progress.embedded_chunks
            );
        })),
    )
    .await?;

    eprintln!();
    println!("Seeding complete:");
    println!("  Documents: {}", stats.documents);
    println!("  Chunks:    {}", stats.chunks);
    println!("  Embedded:  {}", stats.embedded);

    Ok(())
}
