//! Ask command

use crate::app::AskArgs;
use anyhow::Result;
use ragseed_core::{
    answer_question, Database, HttpEmbedder, InstructClient, SearchOptions, TokenUsage,
};

pub async fn run(args: AskArgs, db: &Database) -> Result<()> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        anyhow::bail!("empty question");
    }

    let embedder = HttpEmbedder::from_env()?;
    let model = InstructClient::from_env()?;

    let options = SearchOptions {
        collection: args.collection.clone(),
        limit: args.limit,
        min_score: args.min_score,
    };

    let result = answer_question(db, &embedder, &model, &question, &options).await?;

    println!("{}", result.answer);

    if args.sources {
        println!();
        println!("Sources:");
        for chunk in &result.sources {
            println!(
                "  [{:.3}] {} #{} ({})",
                chunk.score, chunk.uri, chunk.seq, chunk.title
            );
        }
    }

    if result.usage != TokenUsage::default() {
        println!();
        println!(
            "Tokens: {} prompt + {} completion = {} total",
            result.usage.prompt_tokens, result.usage.completion_tokens, result.usage.total_tokens
        );
    }

    Ok(())
}
