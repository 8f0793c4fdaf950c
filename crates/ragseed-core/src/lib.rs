//! Ragseed Core Library
//!
//! Seeds a local vector store from PDF documents and answers questions
//! against it through a deployed instruct endpoint.
//!
//! # Features
//! - PDF text extraction and character-window chunking
//! - Embeddings via an OpenAI-compatible embedding service
//! - SQLite-backed vector storage with cosine similarity search
//! - Completion client for the deployed instruct endpoint

pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod search;

pub use config::{ApiKey, EmbeddingOptions, InstructOptions};
pub use db::{hash_content, CollectionStats, Database};
pub use error::{Error, RagseedError, Result};
pub use index::{
    chunk_by_chars, seed_documents, Chunk, SeedProgress, SeedStats, CHUNK_OVERLAP_CHARS,
    CHUNK_SIZE_CHARS,
};
pub use ingest::{load_path, SourceDocument, DEFAULT_PDF_PATTERN};
pub use llm::{
    ChatMessage, Completion, CompletionModel, Embedder, GeneratedText, HttpEmbedder,
    InstructClient, TokenUsage, DEFAULT_STOP,
};
pub use rag::{answer_question, build_prompt, RagAnswer};
pub use search::{search_chunks, RetrievedChunk, SearchOptions};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "ragseed";
