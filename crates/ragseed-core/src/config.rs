//! Configuration for the instruct endpoint and the embedding service
//!
//! Options resolve from explicit values first, then environment variables,
//! then documented defaults. An empty environment value counts as unset.

use serde_json::{Map, Value};
use std::fmt;

/// Instruct endpoint when `MODEL_ENDPOINT` is unset
pub const DEFAULT_MODEL_ENDPOINT: &str = "http://localhost:8001";

/// Model identifier when `MODEL_NAME` is unset
pub const DEFAULT_MODEL_NAME: &str = "ibm/merlinite-7b";

/// Embedding service endpoint when `EMBEDDING_ENDPOINT` is unset
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "http://localhost:8000";

/// Embedding model when `EMBEDDING_MODEL` is unset
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// System prompt sent with every completion request unless overridden.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI language model developed by \
IBM Research. You are a cautious assistant. You carefully follow instructions. \
You are helpful and harmless and you follow ethical guidelines and promote \
positive behavior.";

/// Read an environment variable, treating an empty value as unset.
pub(crate) fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_nonempty(name).unwrap_or_else(|| default.to_string())
}

fn default_timeout() -> u64 {
    30
}

/// API credential wrapper. Redacts itself in diagnostics; the raw value is
/// only reachable through [`ApiKey::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Render the secret, e.g. for an Authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Options for the instruct completion endpoint.
///
/// Immutable once handed to a client. Keys in `extra_params` pass through
/// to the effective request parameters unchanged, so provider options the
/// base set does not model can still be supplied.
#[derive(Debug, Clone)]
pub struct InstructOptions {
    /// Endpoint URL of the deployed model.
    pub model_endpoint: String,

    /// Identifier of the deployed model.
    pub model_name: String,

    /// Bearer credential, if the deployment requires one.
    pub apikey: Option<ApiKey>,

    /// System message sent ahead of every user prompt.
    pub system_prompt: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Total probability mass of tokens considered at each step.
    pub top_p: f64,

    /// Penalty on tokens by frequency of prior occurrence.
    pub frequency_penalty: f64,

    /// Penalty on repeated tokens.
    pub repetition_penalty: f64,

    /// Maximum number of tokens to generate in the completion.
    pub max_tokens: u32,

    /// Passthrough provider parameters not modeled above.
    pub extra_params: Map<String, Value>,

    /// Streaming is not implemented; `true` is rejected at client
    /// construction.
    pub streaming: bool,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InstructOptions {
    fn default() -> Self {
        Self {
            model_endpoint: env_or("MODEL_ENDPOINT", DEFAULT_MODEL_ENDPOINT),
            model_name: env_or("MODEL_NAME", DEFAULT_MODEL_NAME),
            apikey: env_nonempty("MODEL_TOKEN").map(ApiKey::new),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            top_p: 1.0,
            frequency_penalty: 0.0,
            repetition_penalty: 0.0,
            max_tokens: 4096,
            extra_params: Map::new(),
            streaming: false,
            timeout_secs: default_timeout(),
        }
    }
}

/// Options for the embedding service.
#[derive(Debug, Clone)]
pub struct EmbeddingOptions {
    /// Base URL of the embedding service.
    pub endpoint: String,

    /// Embedding model identifier.
    pub model: String,

    /// Bearer credential, if the service requires one.
    pub apikey: Option<ApiKey>,

    /// Embedding vector dimensions.
    pub dimensions: usize,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self {
            endpoint: env_or("EMBEDDING_ENDPOINT", DEFAULT_EMBEDDING_ENDPOINT),
            model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            apikey: env_nonempty("EMBEDDING_TOKEN").map(ApiKey::new),
            dimensions: env_nonempty("EMBEDDING_DIMS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(384),
            timeout_secs: default_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apikey_debug_is_redacted() {
        let key = ApiKey::new("sk-very-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(format!("{}", key), "***");
        assert_eq!(key.expose(), "sk-very-secret");
    }

    #[test]
    fn test_options_debug_does_not_leak_key() {
        let options = InstructOptions {
            apikey: Some(ApiKey::new("sk-very-secret")),
            ..Default::default()
        };
        let rendered = format!("{:?}", options);
        assert!(!rendered.contains("sk-very-secret"));
    }

    #[test]
    fn test_default_sampling_parameters() {
        let options = InstructOptions {
            model_endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            apikey: None,
            ..Default::default()
        };
        assert!((options.temperature - 0.7).abs() < f64::EPSILON);
        assert!((options.top_p - 1.0).abs() < f64::EPSILON);
        assert_eq!(options.max_tokens, 4096);
        assert!(!options.streaming);
    }
}
