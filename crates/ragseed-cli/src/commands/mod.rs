//! CLI subcommand implementations

pub mod ask;
pub mod complete;
pub mod models;
pub mod seed;
pub mod status;
