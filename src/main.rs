//! temposync - contract activity sync CLI
//!
//! Syncs recent on-chain activity for a single contract into a local
//! RocksDB index and prints a JSON summary.

use anyhow::Result;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    tempo_indexer::cli::run().await
}
