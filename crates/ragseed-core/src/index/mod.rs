//! Seeding pipeline
//!
//! Takes loaded documents through chunking, embedding, and storage.

mod chunker;

pub use chunker::{chunk_by_chars, Chunk, CHUNK_OVERLAP_CHARS, CHUNK_SIZE_CHARS};

use crate::db::Database;
use crate::error::Result;
use crate::ingest::SourceDocument;
use crate::llm::Embedder;
use futures::stream::{self, StreamExt};

/// Chunks sent to the embedding service per request.
const EMBED_BATCH_SIZE: usize = 32;

/// Concurrent embedding requests in flight.
const EMBED_CONCURRENCY: usize = 4;

/// Prefix applied to stored chunks before embedding. Queries use the
/// matching `search_query:` prefix; the embedding model is instruction
/// asymmetric.
const DOCUMENT_EMBED_PREFIX: &str = "search_document: ";

/// Progress snapshot passed to the seeding callback.
#[derive(Debug, Clone)]
pub struct SeedProgress {
    pub total_docs: usize,
    pub processed_docs: usize,
    pub embedded_chunks: usize,
}

/// Seeding statistics
#[derive(Debug, Clone, Default)]
pub struct SeedStats {
    pub documents: usize,
    pub chunks: usize,
    pub embedded: usize,
}

/// Chunk, embed, and store documents into a collection.
///
/// Re-seeding a document with the same content hash replaces its prior
/// chunks and embeddings.
pub async fn seed_documents(
    db: &Database,
    embedder: &dyn Embedder,
    collection: &str,
    docs: &[SourceDocument],
    progress: Option<Box<dyn Fn(SeedProgress) + Send + Sync>>,
) -> Result<SeedStats> {
    let mut stats = SeedStats {
        documents: docs.len(),
        ..Default::default()
    };
    let model = embedder.model_name().to_string();

    for (doc_idx, doc) in docs.iter().enumerate() {
        let chunks = chunk_by_chars(&doc.text, CHUNK_SIZE_CHARS, CHUNK_OVERLAP_CHARS);
        tracing::info!(
            uri = %doc.uri,
            chunks = chunks.len(),
            "seeding document"
        );

        db.upsert_document(collection, &doc.uri, &doc.title, &doc.hash)?;
        db.replace_chunks(&doc.hash, &chunks)?;

        let inputs: Vec<String> = chunks
            .iter()
            .map(|chunk| format!("{}{}", DOCUMENT_EMBED_PREFIX, chunk.text))
            .collect();
        let vectors = embed_batches(embedder, &inputs).await?;

        for (seq, vector) in vectors.iter().enumerate() {
            db.insert_embedding(&doc.hash, seq as u32, &model, vector)?;
        }

        stats.chunks += chunks.len();
        stats.embedded += vectors.len();

        if let Some(ref callback) = progress {
            callback(SeedProgress {
                total_docs: docs.len(),
                processed_docs: doc_idx + 1,
                embedded_chunks: stats.embedded,
            });
        }
    }

    Ok(stats)
}

/// Embed inputs in fixed-size batches, a few requests in flight at once,
/// preserving input order in the result.
async fn embed_batches(embedder: &dyn Embedder, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
    let batches: Vec<(usize, Vec<String>)> = inputs
        .chunks(EMBED_BATCH_SIZE)
        .map(|batch| batch.to_vec())
        .enumerate()
        .collect();
    let total_batches = batches.len();

    let mut results: Vec<(usize, Result<Vec<Vec<f32>>>)> = stream::iter(batches)
        .map(|(idx, batch)| async move {
            tracing::debug!("embedding batch {}/{}", idx + 1, total_batches);
            let result = embedder.embed_batch(&batch).await;
            (idx, result)
        })
        .buffer_unordered(EMBED_CONCURRENCY)
        .collect()
        .await;

    results.sort_by_key(|(idx, _)| *idx);

    let mut vectors = Vec::with_capacity(inputs.len());
    for (_, result) in results {
        vectors.extend(result?);
    }
    Ok(vectors)
}
