//! Model trait definitions
//!
//! Small seams any orchestration layer can consume without depending on a
//! concrete provider client.

use crate::error::Result;
use crate::llm::Completion;
use async_trait::async_trait;

/// Text completion endpoint: single call plus batch generate.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Complete one prompt, returning the generated text.
    async fn call(&self, prompt: &str, stop: Option<&[String]>) -> Result<String>;

    /// Complete a batch of prompts, returning generations and token usage.
    async fn generate(&self, prompts: &[String], stop: Option<&[String]>) -> Result<Completion>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}
