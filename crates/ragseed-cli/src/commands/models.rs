//! Models command

use anyhow::Result;
use ragseed_core::InstructClient;

pub fn run() -> Result<()> {
    println!("{:<32} {:>12}", "MODEL", "CONTEXT SIZE");
    for (name, context_size) in InstructClient::known_models() {
        println!("{:<32} {:>12}", name, context_size);
    }

    Ok(())
}
