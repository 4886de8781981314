//! Key encoding utilities
//!
//! All keys use a single-byte prefix followed by binary data.
//! This ensures deterministic, lexicographically ordered keys in RocksDB.

use alloy_primitives::{Address, B256};

/// Encode a contract key.
///
/// Format: byte 'c' (0x63) + address (20 bytes)
/// Total length: 21 bytes
pub fn encode_contract_key(addr: Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(21);
    key.push(b'c');
    key.extend_from_slice(addr.as_slice());
    key
}

/// Encode a transaction key.
///
/// Format: byte 't' (0x74) + transaction hash (32 bytes)
/// Total length: 33 bytes
pub fn encode_transaction_key(hash: B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.push(b't');
    key.extend_from_slice(hash.as_slice());
    key
}

/// Encode an event key.
///
/// Format: byte 'e' (0x65) + event id (8 bytes, big-endian)
/// Total length: 9 bytes
///
/// Big-endian ids keep events in insertion order under forward iteration.
pub fn encode_event_key(id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(b'e');
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Decode an event key back into its id.
pub fn decode_event_key(key: &[u8]) -> Option<u64> {
    if key.len() != 9 || key[0] != b'e' {
        return None;
    }
    Some(u64::from_be_bytes(key[1..9].try_into().ok()?))
}

/// Encode a meta key.
///
/// Format: byte 'm' (0x6D) + meta_id (1 byte)
/// Total length: 2 bytes
///
/// Meta IDs:
/// - 0x01: next_event_id
pub fn encode_meta_key(meta_id: u8) -> Vec<u8> {
    vec![b'm', meta_id]
}
