//! HTTP client for an OpenAI-compatible embedding service

use crate::config::EmbeddingOptions;
use crate::error::{RagseedError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedder backed by an external HTTP service (vLLM, text-embeddings
/// servers, or any OpenAI-compatible `/v1/embeddings` deployment).
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    options: EmbeddingOptions,
}

impl HttpEmbedder {
    /// Create an embedder from options.
    pub fn new(options: EmbeddingOptions) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            options,
        })
    }

    /// Create an embedder from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingOptions::default())
    }

    pub fn options(&self) -> &EmbeddingOptions {
        &self.options
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| RagseedError::ExternalService("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request_body = EmbedRequest {
            model: &self.options.model,
            input: texts,
        };

        let url = format!("{}/v1/embeddings", self.options.endpoint);
        let mut request = self.http_client.post(&url).json(&request_body);

        if let Some(key) = &self.options.apikey {
            request = request.header("Authorization", format!("Bearer {}", key.expose()));
        }

        tracing::debug!(count = texts.len(), model = %self.options.model, "embedding batch");
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagseedError::ExternalService(format!(
                "embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let parsed: EmbedResponse = response.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(RagseedError::ExternalService(format!(
                "embedding service returned {} vectors for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.options.dimensions
    }

    fn model_name(&self) -> &str {
        &self.options.model
    }
}
