//! SQLite storage for seeded documents, chunks, and embeddings

pub mod vectors;

use crate::error::Result;
use crate::index::Chunk;
use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const CREATE_TABLES: &str = r#"
-- Seeded document metadata
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    uri TEXT NOT NULL,
    title TEXT NOT NULL,
    hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    UNIQUE(collection, uri)
);

-- Chunked document text (keyed by content hash)
CREATE TABLE IF NOT EXISTS chunks (
    hash TEXT NOT NULL,
    seq INTEGER NOT NULL,
    pos INTEGER NOT NULL,
    text TEXT NOT NULL,
    PRIMARY KEY (hash, seq)
);

-- Chunk embeddings as little-endian f32 BLOBs
CREATE TABLE IF NOT EXISTS embeddings (
    hash_seq TEXT PRIMARY KEY,
    model TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
CREATE INDEX IF NOT EXISTS idx_documents_hash ON documents(hash);
"#;

/// Per-collection counts for status reporting.
#[derive(Debug, Clone)]
pub struct CollectionStats {
    pub name: String,
    pub documents: usize,
    pub chunks: usize,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("index.sqlite")
    }

    /// Create tables and indexes if they do not exist.
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(CREATE_TABLES)?;
        Ok(())
    }

    /// Insert or update a document row.
    pub fn upsert_document(
        &self,
        collection: &str,
        uri: &str,
        title: &str,
        hash: &str,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (collection, uri, title, hash, created_at, active)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)
             ON CONFLICT(collection, uri)
             DO UPDATE SET title = ?3, hash = ?4, active = 1",
            params![collection, uri, title, hash, now],
        )?;
        Ok(())
    }

    /// Replace all chunks (and their embeddings) for a content hash.
    pub fn replace_chunks(&self, hash: &str, chunks: &[Chunk]) -> Result<()> {
        self.conn.execute("BEGIN IMMEDIATE", [])?;
        let result = (|| {
            self.conn
                .execute("DELETE FROM chunks WHERE hash = ?1", params![hash])?;
            // GLOB wildcards never appear in SHA-256 hex, unlike LIKE's.
            self.conn.execute(
                "DELETE FROM embeddings WHERE hash_seq GLOB ?1",
                params![format!("{}_*", hash)],
            )?;
            for (seq, chunk) in chunks.iter().enumerate() {
                self.conn.execute(
                    "INSERT INTO chunks (hash, seq, pos, text) VALUES (?1, ?2, ?3, ?4)",
                    params![hash, seq as u32, chunk.position, chunk.text],
                )?;
            }
            Ok(())
        })();

        if result.is_ok() {
            self.conn.execute("COMMIT", [])?;
        } else {
            let _ = self.conn.execute("ROLLBACK", []);
        }
        result
    }

    /// Chunk text plus owning document details, for search results.
    pub fn get_chunk_with_document(
        &self,
        hash: &str,
        seq: u32,
    ) -> Result<Option<(String, String, String, String)>> {
        let result = self.conn.query_row(
            "SELECT d.collection, d.uri, d.title, c.text
             FROM chunks c
             JOIN documents d ON d.hash = c.hash AND d.active = 1
             WHERE c.hash = ?1 AND c.seq = ?2
             LIMIT 1",
            params![hash, seq],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                ))
            },
        );

        match result {
            Ok(row) => Ok(Some(row)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Per-collection document and chunk counts.
    pub fn collection_stats(&self) -> Result<Vec<CollectionStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.collection, COUNT(DISTINCT d.id), COUNT(c.seq)
             FROM documents d
             LEFT JOIN chunks c ON c.hash = d.hash
             WHERE d.active = 1
             GROUP BY d.collection
             ORDER BY d.collection",
        )?;

        let results = stmt
            .query_map([], |row| {
                Ok(CollectionStats {
                    name: row.get(0)?,
                    documents: row.get::<_, i64>(1)? as usize,
                    chunks: row.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Count stored embeddings.
    pub fn count_embeddings(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    fn chunk(text: &str, position: usize) -> Chunk {
        Chunk {
            text: text.to_string(),
            position,
        }
    }

    #[test]
    fn test_hash_content() {
        let hash = hash_content("Hello, World!");
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_upsert_and_stats() {
        let db = test_db();
        db.upsert_document("dnd", "data/handbook.pdf", "Handbook", "abc123")
            .unwrap();
        db.replace_chunks("abc123", &[chunk("first", 0), chunk("second", 100)])
            .unwrap();

        let stats = db.collection_stats().unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "dnd");
        assert_eq!(stats[0].documents, 1);
        assert_eq!(stats[0].chunks, 2);
    }

    #[test]
    fn test_reseed_replaces_chunks() {
        let db = test_db();
        db.upsert_document("dnd", "data/handbook.pdf", "Handbook", "abc123")
            .unwrap();
        db.replace_chunks("abc123", &[chunk("one", 0), chunk("two", 10), chunk("three", 20)])
            .unwrap();
        db.replace_chunks("abc123", &[chunk("only", 0)]).unwrap();

        let stats = db.collection_stats().unwrap();
        assert_eq!(stats[0].chunks, 1);
    }

    #[test]
    fn test_chunk_with_document() {
        let db = test_db();
        db.upsert_document("dnd", "data/handbook.pdf", "Handbook", "abc123")
            .unwrap();
        db.replace_chunks("abc123", &[chunk("dragon lore", 0)]).unwrap();

        let row = db.get_chunk_with_document("abc123", 0).unwrap().unwrap();
        assert_eq!(row.0, "dnd");
        assert_eq!(row.2, "Handbook");
        assert_eq!(row.3, "dragon lore");

        assert!(db.get_chunk_with_document("abc123", 9).unwrap().is_none());
    }
}
