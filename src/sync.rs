//! Sync job for contract activity
//!
//! Drives one sequential pass over a recent block window: contract
//! metadata, then logs, then full blocks in ascending order. Any RPC
//! failure aborts the run; writes that already happened stay committed.

use crate::codec::AbiCodec;
use crate::decoder::{decode_event, decode_function_call, DecodedCall};
use crate::records::{AbiProvenance, ContractRecord, EventRecord, TransactionRecord};
use crate::rpc::{AbiResolver, ChainClient};
use crate::store::IndexStore;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Aggregate outcome of one sync run.
#[derive(Debug, Clone)]
pub struct SyncResult {
    /// Metadata persisted for the target contract
    pub contract: ContractRecord,
    /// Block numbers fetched, ascending
    pub blocks_synced: Vec<u64>,
    /// Number of log entries stored
    pub logs_processed: u64,
    /// Number of transactions stored (all transactions in the window,
    /// not just those addressed to the contract)
    pub transactions_processed: u64,
}

/// Fetch contract metadata: bytecode from the node, ABI from the resolver.
///
/// The resolver is a parameter rather than client state so callers can
/// swap it per run. Fetched exactly once per sync.
pub async fn fetch_contract_metadata(
    client: &dyn ChainClient,
    resolver: Option<&dyn AbiResolver>,
    address: Address,
) -> Result<ContractRecord> {
    let code = client
        .code(address)
        .await
        .context("Failed to fetch contract code")?;
    let abi = resolver.and_then(|r| r.resolve(address));
    let verified = abi.is_some();

    Ok(ContractRecord {
        address,
        code,
        abi,
        verified,
        provenance: if verified { AbiProvenance::Resolver } else { AbiProvenance::Rpc },
    })
}

/// Sync the most recent `blocks` blocks of activity for `address`.
///
/// The window is inclusive `[max(latest - blocks + 1, 0), latest]`.
/// Contracts and transactions are upserted (idempotent re-sync); event
/// rows are appended, so re-syncing the same window duplicates them.
pub async fn sync_recent_blocks(
    client: &dyn ChainClient,
    store: &dyn IndexStore,
    codec: &dyn AbiCodec,
    resolver: Option<&dyn AbiResolver>,
    address: Address,
    blocks: u64,
) -> Result<SyncResult> {
    let latest = client
        .head_block_number()
        .await
        .context("Failed to fetch head block number")?;
    let from_block = latest.saturating_add(1).saturating_sub(blocks);

    info!(
        "Syncing blocks {}..={} for contract 0x{:x}",
        from_block, latest, address
    );

    store.ensure_schema().context("Failed to ensure storage schema")?;

    let contract = fetch_contract_metadata(client, resolver, address).await?;
    store
        .upsert_contract(&contract)
        .context("Failed to persist contract metadata")?;

    let logs = client
        .logs(address, from_block, latest)
        .await
        .context("Failed to fetch logs")?;

    let mut logs_processed = 0u64;
    for log in &logs {
        let decoded = decode_event(contract.abi.as_ref(), log, codec);
        let event_name = decoded
            .name
            .or_else(|| log.topics.first().cloned())
            .unwrap_or_else(|| "unknown".to_string());

        store
            .insert_event(&EventRecord {
                transaction_hash: log.transaction_hash,
                event_name,
                decoded_fields: decoded.fields,
            })
            .context("Failed to persist event")?;
        logs_processed += 1;
    }
    debug!("Stored {} log entries", logs_processed);

    let mut transactions_processed = 0u64;
    let mut blocks_synced = Vec::new();
    for number in from_block..=latest {
        let block = client
            .block_by_number(number, true)
            .await
            .with_context(|| format!("Failed to fetch block {}", number))?;
        blocks_synced.push(number);

        for tx in &block.transactions {
            // Decoding is only attempted for transactions addressed to the
            // target; everything else in the block is still persisted.
            let decoded = if tx.to == Some(address) {
                decode_function_call(contract.abi.as_ref(), &tx.input, codec)
            } else {
                DecodedCall::empty()
            };

            store
                .upsert_transaction(&TransactionRecord {
                    hash: tx.hash,
                    block_number: number,
                    from: tx.from,
                    to: tx.to,
                    input: tx.input.clone(),
                    decoded_function: decoded.function,
                    decoded_args: decoded.args,
                })
                .context("Failed to persist transaction")?;
            transactions_processed += 1;
        }
    }

    info!(
        "Sync complete: {} blocks, {} logs, {} transactions",
        blocks_synced.len(),
        logs_processed,
        transactions_processed
    );

    Ok(SyncResult {
        contract,
        blocks_synced,
        logs_processed,
        transactions_processed,
    })
}
