//! Retrieval-augmented answering
//!
//! Stuffs retrieved chunks into a question-answering prompt and sends it
//! through the completion model.

use crate::db::Database;
use crate::error::Result;
use crate::llm::{CompletionModel, Embedder, TokenUsage};
use crate::search::{search_chunks, RetrievedChunk, SearchOptions};

/// Question-answering prompt over retrieved context.
const RAG_PROMPT: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\
Question: {question} \n\
Context: {context} \n\
Answer:";

/// Answer plus the retrieved chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: String,
    pub finish_reason: Option<String>,
    pub sources: Vec<RetrievedChunk>,
    pub usage: TokenUsage,
}

/// Assemble the augmented prompt from retrieved chunks.
pub fn build_prompt(question: &str, sources: &[RetrievedChunk]) -> String {
    let context = sources
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    RAG_PROMPT
        .replace("{question}", question)
        .replace("{context}", &context)
}

/// Retrieve context for the question and generate an answer.
pub async fn answer_question(
    db: &Database,
    embedder: &dyn Embedder,
    model: &dyn CompletionModel,
    question: &str,
    options: &SearchOptions,
) -> Result<RagAnswer> {
    let sources = search_chunks(db, embedder, question, options).await?;
    tracing::info!(retrieved = sources.len(), "assembling augmented prompt");

    let prompt = build_prompt(question, &sources);
    let completion = model.generate(&[prompt], None).await?;

    let first = completion
        .generations
        .into_iter()
        .next()
        .ok_or(crate::error::RagseedError::EmptyResponse)?;

    Ok(RagAnswer {
        answer: first.text,
        finish_reason: first.finish_reason,
        sources,
        usage: completion.usage,
    })
}
