//! LLM integration
//!
//! Clients for the two external services this crate talks to:
//! - the deployed instruct endpoint (completions)
//! - the embedding service (vectors)
//!
//! plus the trait seams the rest of the crate consumes.

mod embedder;
mod instruct;
mod traits;

pub use embedder::HttpEmbedder;
pub use instruct::{
    ChatMessage, Choice, Completion, GeneratedText, InstructClient, ProviderResponse, TokenUsage,
    UsageRecord, DEFAULT_STOP,
};
pub use traits::{CompletionModel, Embedder};
