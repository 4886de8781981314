//! Record types for indexed contract activity
//!
//! These structs represent the data stored in the index store.
//! They use postcard for binary serialization, which is compact and deterministic.

use crate::abi::Abi;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the contract's ABI came from during metadata fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbiProvenance {
    /// Supplied by the injected ABI resolver
    Resolver,
    /// No resolver result; only RPC-visible data (bytecode) is known
    Rpc,
}

/// Contract metadata, created once per sync run and upserted by address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Contract address (rendered lowercase everywhere)
    pub address: Address,
    /// Deployed bytecode
    pub code: Vec<u8>,
    /// Loaded ABI, when a resolver produced one
    pub abi: Option<Abi>,
    /// Whether an ABI is known for this contract
    pub verified: bool,
    /// Provenance of the metadata
    pub provenance: AbiProvenance,
}

/// A transaction observed in the synced window, upserted by hash.
///
/// `decoded_function` and `decoded_args` are both Some or both None,
/// and stay None for transactions not addressed to the target contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    /// Raw input data, hex as returned by the node
    pub input: String,
    pub decoded_function: Option<String>,
    pub decoded_args: Option<BTreeMap<String, String>>,
}

/// A decoded (or raw) log entry. Appended, never upserted: re-syncing a
/// range produces duplicate rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Hash of the originating transaction, when the log carried one
    pub transaction_hash: Option<B256>,
    /// Decoded event name, or topic0, or "unknown"
    pub event_name: String,
    pub decoded_fields: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_record_roundtrip() {
        let record = TransactionRecord {
            hash: B256::repeat_byte(0xab),
            block_number: 105,
            from: Address::repeat_byte(0x11),
            to: Some(Address::repeat_byte(0x22)),
            input: "0xa9059cbb".to_string(),
            decoded_function: Some("transfer".to_string()),
            decoded_args: Some(BTreeMap::from([
                ("to".to_string(), "0x22".to_string()),
                ("amount".to_string(), "1000".to_string()),
            ])),
        };

        let bytes = postcard::to_allocvec(&record).unwrap();
        let decoded: TransactionRecord = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_event_record_roundtrip_without_hash() {
        let record = EventRecord {
            transaction_hash: None,
            event_name: "unknown".to_string(),
            decoded_fields: None,
        };

        let bytes = postcard::to_allocvec(&record).unwrap();
        let decoded: EventRecord = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_contract_record_roundtrip() {
        let record = ContractRecord {
            address: Address::repeat_byte(0x33),
            code: vec![0x60, 0x80, 0x60, 0x40],
            abi: None,
            verified: false,
            provenance: AbiProvenance::Rpc,
        };

        let bytes = postcard::to_allocvec(&record).unwrap();
        let decoded: ContractRecord = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(record, decoded);
    }
}
