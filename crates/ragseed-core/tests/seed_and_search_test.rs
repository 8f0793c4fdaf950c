//! End-to-end seeding and retrieval tests
//!
//! Uses an in-memory database and stub embedding/completion services, so
//! the pipeline runs without any external endpoint.

use async_trait::async_trait;
use ragseed_core::{
    answer_question, hash_content, seed_documents, Completion, CompletionModel, Database, Embedder,
    GeneratedText, Result, SearchOptions, SourceDocument, TokenUsage,
};
use std::sync::Mutex;

/// Embeds text into a 3-dim vector by keyword counts, so similarity
/// ordering is predictable.
struct StubEmbedder;

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    vec![
        lower.matches("dragon").count() as f32,
        lower.matches("wizard").count() as f32,
        0.1,
    ]
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(keyword_vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        3
    }

    fn model_name(&self) -> &str {
        "stub-embedder"
    }
}

/// Records every prompt it receives and answers with a fixed completion.
struct StubModel {
    prompts: Mutex<Vec<String>>,
}

impl StubModel {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionModel for StubModel {
    async fn call(&self, prompt: &str, _stop: Option<&[String]>) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("stub answer".to_string())
    }

    async fn generate(&self, prompts: &[String], _stop: Option<&[String]>) -> Result<Completion> {
        self.prompts.lock().unwrap().push(prompts[0].clone());
        Ok(Completion {
            generations: vec![GeneratedText {
                text: "Dragons breathe fire.".to_string(),
                finish_reason: Some("stop".to_string()),
            }],
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            model_name: "stub-model".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

fn doc(uri: &str, title: &str, text: &str) -> SourceDocument {
    SourceDocument {
        uri: uri.to_string(),
        title: title.to_string(),
        text: text.to_string(),
        hash: hash_content(text),
    }
}

fn seed_corpus() -> (Database, Vec<SourceDocument>) {
    let db = Database::in_memory().unwrap();
    db.initialize().unwrap();
    let docs = vec![
        doc(
            "data/dragons.pdf",
            "Dragons",
            "A dragon is a winged reptile. The dragon hoards treasure and breathes fire.",
        ),
        doc(
            "data/wizards.pdf",
            "Wizards",
            "A wizard studies arcane magic. The wizard prepares spells from a spellbook.",
        ),
    ];
    (db, docs)
}

#[tokio::test]
async fn seeding_stores_documents_chunks_and_embeddings() {
    let (db, docs) = seed_corpus();
    let stats = seed_documents(&db, &StubEmbedder, "dnd", &docs, None)
        .await
        .unwrap();

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.chunks, 2);
    assert_eq!(stats.embedded, 2);
    assert_eq!(db.count_embeddings().unwrap(), 2);

    let collections = db.collection_stats().unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].name, "dnd");
    assert_eq!(collections[0].documents, 2);
}

#[tokio::test]
async fn search_ranks_matching_document_first() {
    let (db, docs) = seed_corpus();
    seed_documents(&db, &StubEmbedder, "dnd", &docs, None)
        .await
        .unwrap();

    let options = SearchOptions {
        collection: Some("dnd".to_string()),
        limit: 2,
        min_score: 0.0,
    };
    let results = ragseed_core::search_chunks(&db, &StubEmbedder, "dragon", &options)
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].uri, "data/dragons.pdf");
    assert!(results[0].text.contains("dragon"));
    assert!(results[0].score > 0.5);
}

#[tokio::test]
async fn search_respects_collection_filter() {
    let (db, docs) = seed_corpus();
    seed_documents(&db, &StubEmbedder, "dnd", &docs, None)
        .await
        .unwrap();

    let options = SearchOptions {
        collection: Some("recipes".to_string()),
        limit: 4,
        min_score: 0.0,
    };
    let results = ragseed_core::search_chunks(&db, &StubEmbedder, "dragon", &options)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn answer_question_grounds_the_prompt_in_retrieved_chunks() {
    let (db, docs) = seed_corpus();
    seed_documents(&db, &StubEmbedder, "dnd", &docs, None)
        .await
        .unwrap();

    let model = StubModel::new();
    let options = SearchOptions {
        collection: Some("dnd".to_string()),
        limit: 2,
        min_score: 0.0,
    };
    let result = answer_question(&db, &StubEmbedder, &model, "what is a dragon", &options)
        .await
        .unwrap();

    assert_eq!(result.answer, "Dragons breathe fire.");
    assert_eq!(result.finish_reason.as_deref(), Some("stop"));
    assert_eq!(result.usage.total_tokens, 15);
    assert!(!result.sources.is_empty());

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("what is a dragon"));
    assert!(prompts[0].contains("winged reptile"));
}
