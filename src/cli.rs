//! CLI implementation for temposync
//!
//! Parses arguments, wires the RPC client, codec, and store together,
//! runs one sync, and prints a pretty JSON summary.

use crate::codec::EthCodec;
use crate::config::load_abi;
use crate::rpc::{AbiResolver, RpcClient};
use crate::store::RocksIndexStore;
use crate::sync::sync_recent_blocks;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;

/// Sync recent contract activity into a local index
#[derive(Parser)]
#[command(name = "temposync")]
#[command(about = "Sync recent blocks, logs, and transactions for a contract")]
pub struct Cli {
    /// JSON-RPC endpoint URL
    #[arg(short, long)]
    rpc_url: String,

    /// Contract address (hex, with or without 0x prefix)
    #[arg(short, long)]
    address: String,

    /// Number of recent blocks to sync
    #[arg(short, long, default_value_t = 100)]
    blocks: u64,

    /// Path to the RocksDB database directory
    #[arg(short, long, default_value = "./index_db")]
    db_path: PathBuf,

    /// Path to contract ABI JSON (optional)
    #[arg(long)]
    abi: Option<PathBuf>,
}

/// Pad an odd-length hex string with a leading zero.
fn pad_hex_string(s: &str) -> String {
    if s.is_empty() {
        return s.to_string();
    }
    if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    }
}

/// Parse a hex string into a 20-byte address.
fn parse_address(s: &str) -> Result<Address> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let s = pad_hex_string(s);
    let bytes = hex::decode(&s).with_context(|| format!("Invalid hex address: {}", s))?;
    if bytes.len() != 20 {
        anyhow::bail!("Address must be 20 bytes (40 hex chars), got {} bytes", bytes.len());
    }
    Ok(Address::from_slice(&bytes))
}

/// Run one sync and print the JSON summary.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let address = parse_address(&cli.address)?;

    let abi = match &cli.abi {
        Some(path) => Some(load_abi(path)?),
        None => None,
    };

    let client = RpcClient::new(cli.rpc_url);
    let store = RocksIndexStore::open(&cli.db_path)
        .with_context(|| format!("Failed to open database at {:?}", cli.db_path))?;

    let resolver_fn;
    let resolver: Option<&dyn AbiResolver> = match abi {
        Some(loaded) => {
            resolver_fn = move |_address: Address| Some(loaded.clone());
            Some(&resolver_fn)
        }
        None => None,
    };

    let result =
        sync_recent_blocks(&client, &store, &EthCodec, resolver, address, cli.blocks).await?;

    let summary = json!({
        "contract": format!("0x{:x}", result.contract.address),
        "blocks_synced": result.blocks_synced,
        "logs_processed": result.logs_processed,
        "transactions_processed": result.transactions_processed,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
