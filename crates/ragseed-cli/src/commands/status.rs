//! Status command

use anyhow::Result;
use ragseed_core::Database;

pub fn run(db: &Database) -> Result<()> {
    let stats = db.collection_stats()?;
    if stats.is_empty() {
        println!("No seeded collections.");
        return Ok(());
    }

    println!("{:<24} {:>8} {:>8}", "COLLECTION", "DOCS", "CHUNKS");
    for collection in &stats {
        println!(
            "{:<24} {:>8} {:>8}",
            collection.name, collection.documents, collection.chunks
        );
    }
    println!();
    println!("Embeddings stored: {}", db.count_embeddings()?);

    Ok(())
}
