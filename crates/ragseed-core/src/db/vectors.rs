//! Embedding storage and similarity
//!
//! Embeddings are stored as little-endian f32 BLOBs keyed by
//! `<hash>_<seq>`; cosine similarity is computed in Rust.

use super::Database;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

impl Database {
    /// Insert (or replace) the embedding for one chunk.
    pub fn insert_embedding(
        &self,
        hash: &str,
        seq: u32,
        model: &str,
        embedding: &[f32],
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let hash_seq = format!("{}_{}", hash, seq);
        self.conn.execute(
            "INSERT OR REPLACE INTO embeddings (hash_seq, model, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![hash_seq, model, embedding_to_bytes(embedding), now],
        )?;
        Ok(())
    }

    /// All stored embeddings, for similarity search.
    pub fn get_all_embeddings(&self) -> Result<Vec<(String, Vec<f32>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT hash_seq, embedding FROM embeddings")?;

        let results = stmt
            .query_map([], |row| {
                let hash_seq: String = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                Ok((hash_seq, bytes_to_embedding(&bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Embeddings restricted to one collection's active documents.
    pub fn get_embeddings_for_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<(String, Vec<f32>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.hash_seq, e.embedding
             FROM embeddings e
             JOIN chunks c ON e.hash_seq = c.hash || '_' || c.seq
             JOIN documents d ON d.hash = c.hash AND d.active = 1
             WHERE d.collection = ?1",
        )?;

        let results = stmt
            .query_map(params![collection], |row| {
                let hash_seq: String = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                Ok((hash_seq, bytes_to_embedding(&bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
