//! Tempo contract indexer
//!
//! This library syncs recent on-chain activity for a single contract:
//! it fetches blocks, logs, and transactions over JSON-RPC, decodes the
//! ones that belong to the contract using its ABI, and persists the
//! decoded results in a local RocksDB index.

pub mod abi;
pub mod cli;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod keys;
pub mod records;
pub mod rpc;
pub mod store;
pub mod sync;
pub mod types;

// Re-export the main types for convenience
pub use abi::{Abi, AbiEntry, AbiError, Param};
pub use codec::{AbiCodec, EthCodec, NoopCodec};
pub use decoder::{decode_event, decode_function_call, DecodedCall, DecodedEvent};
pub use records::{AbiProvenance, ContractRecord, EventRecord, TransactionRecord};
pub use rpc::{AbiResolver, ChainClient, RpcClient, RpcError};
pub use store::{IndexStore, RocksIndexStore};
pub use sync::{fetch_contract_metadata, sync_recent_blocks, SyncResult};
