//! Vector similarity search over seeded chunks
//!
//! Embeds the query and ranks stored chunk embeddings by cosine
//! similarity, keeping the best chunk per document.

use crate::db::vectors::cosine_similarity;
use crate::db::Database;
use crate::error::Result;
use crate::llm::Embedder;
use std::collections::HashMap;

/// Prefix applied to queries before embedding; pairs with the
/// `search_document:` prefix used at seeding time.
const QUERY_EMBED_PREFIX: &str = "search_query: ";

/// Search options
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Restrict to one collection.
    pub collection: Option<String>,

    /// Number of chunks to return.
    pub limit: usize,

    /// Minimum cosine similarity.
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            collection: None,
            limit: 4,
            min_score: 0.0,
        }
    }
}

/// One retrieved chunk with its provenance and score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub collection: String,
    pub uri: String,
    pub title: String,
    pub hash: String,
    pub seq: u32,
    pub text: String,
    pub score: f32,
}

/// Retrieve the chunks most similar to the query.
pub async fn search_chunks(
    db: &Database,
    embedder: &dyn Embedder,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<RetrievedChunk>> {
    let query_embedding = embedder
        .embed(&format!("{}{}", QUERY_EMBED_PREFIX, query))
        .await?;

    let stored = if let Some(ref collection) = options.collection {
        db.get_embeddings_for_collection(collection)?
    } else {
        db.get_all_embeddings()?
    };

    let mut similarities: Vec<(String, f32)> = stored
        .iter()
        .map(|(hash_seq, embedding)| {
            (
                hash_seq.clone(),
                cosine_similarity(&query_embedding, embedding),
            )
        })
        .collect();
    similarities.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    // Over-fetch so deduplication still fills the limit
    let fetch_limit = options.limit * 3;
    let mut results = Vec::new();
    for (hash_seq, score) in similarities.into_iter().take(fetch_limit) {
        if let Some(result) = retrieve_chunk(db, &hash_seq, score)? {
            results.push(result);
        }
    }

    // Keep the best chunk per document
    let mut best_by_hash: HashMap<String, RetrievedChunk> = HashMap::new();
    for result in results {
        match best_by_hash.get(&result.hash) {
            Some(existing) if existing.score >= result.score => {}
            _ => {
                best_by_hash.insert(result.hash.clone(), result);
            }
        }
    }

    let mut final_results: Vec<RetrievedChunk> = best_by_hash.into_values().collect();
    final_results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(final_results
        .into_iter()
        .filter(|r| r.score >= options.min_score)
        .take(options.limit)
        .collect())
}

fn retrieve_chunk(db: &Database, hash_seq: &str, score: f32) -> Result<Option<RetrievedChunk>> {
    // hash_seq format: "<hash>_<seq>"
    let parts: Vec<&str> = hash_seq.rsplitn(2, '_').collect();
    if parts.len() != 2 {
        return Ok(None);
    }
    let hash = parts[1];
    let seq: u32 = match parts[0].parse() {
        Ok(seq) => seq,
        Err(_) => return Ok(None),
    };

    let Some((collection, uri, title, text)) = db.get_chunk_with_document(hash, seq)? else {
        return Ok(None);
    };

    Ok(Some(RetrievedChunk {
        collection,
        uri,
        title,
        hash: hash.to_string(),
        seq,
        text,
        score,
    }))
}
