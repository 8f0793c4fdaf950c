//! Complete command

use crate::app::CompleteArgs;
use anyhow::Result;
use ragseed_core::InstructClient;
use serde_json::{json, Map};

pub async fn run(args: CompleteArgs) -> Result<()> {
    let prompt = args.prompt.join(" ");
    if prompt.trim().is_empty() {
        anyhow::bail!("empty prompt");
    }

    let client = InstructClient::from_env()?;

    let mut overrides = Map::new();
    if let Some(temperature) = args.temperature {
        overrides.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = args.max_tokens {
        overrides.insert("max_tokens".to_string(), json!(max_tokens));
    }

    let stop = if args.stop.is_empty() {
        None
    } else {
        Some(args.stop.as_slice())
    };

    let text = client.call_with_params(&prompt, stop, &overrides).await?;
    println!("{}", text);

    Ok(())
}
