//! ABI codec capability
//!
//! Hashing and parameter decoding are injected behind a trait so the
//! decode paths fail soft: a codec that is unavailable (or a payload it
//! cannot decode) reports no match instead of erroring, and raw data is
//! persisted regardless.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, B256};

/// Hashing and ABI parameter decoding, injected into the decoder.
pub trait AbiCodec {
    /// Keccak-256 of a canonical signature string (UTF-8 bytes).
    ///
    /// Returns None when the hashing primitive is unavailable, in which
    /// case every decode attempt deterministically reports no match.
    fn signature_hash(&self, signature: &str) -> Option<B256>;

    /// Decode ABI-encoded values for the given type list, formatted as
    /// canonical strings in declaration order.
    ///
    /// Returns None when the codec is unavailable or the payload does not
    /// decode against the type list.
    fn decode(&self, types: &[String], data: &[u8]) -> Option<Vec<String>>;
}

/// Default codec backed by keccak-256 and the dynamic Solidity ABI codec.
pub struct EthCodec;

impl AbiCodec for EthCodec {
    fn signature_hash(&self, signature: &str) -> Option<B256> {
        Some(keccak256(signature.as_bytes()))
    }

    fn decode(&self, types: &[String], data: &[u8]) -> Option<Vec<String>> {
        let mut parsed = Vec::with_capacity(types.len());
        for ty in types {
            match ty.parse::<DynSolType>() {
                Ok(t) => parsed.push(t),
                Err(e) => {
                    tracing::warn!("Unparseable ABI type '{}': {}", ty, e);
                    return None;
                }
            }
        }

        let tuple = DynSolType::Tuple(parsed);
        match tuple.abi_decode_sequence(data) {
            Ok(DynSolValue::Tuple(values)) => {
                Some(values.iter().map(format_value).collect())
            }
            Ok(other) => Some(vec![format_value(&other)]),
            Err(e) => {
                tracing::warn!("Failed to decode ABI payload: {}", e);
                None
            }
        }
    }
}

/// Codec stand-in for environments without the hashing/decoding primitive.
///
/// Every operation reports unavailable, so all decode attempts degrade
/// to empty results while raw data still flows to storage.
pub struct NoopCodec;

impl AbiCodec for NoopCodec {
    fn signature_hash(&self, _signature: &str) -> Option<B256> {
        None
    }

    fn decode(&self, _types: &[String], _data: &[u8]) -> Option<Vec<String>> {
        None
    }
}

/// Format a decoded value as a canonical string.
///
/// Numbers render in decimal, addresses and byte strings as 0x-prefixed
/// lowercase hex, composites recursively.
fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Uint(v, _) => v.to_string(),
        DynSolValue::Int(v, _) => v.to_string(),
        DynSolValue::Address(a) => format!("0x{:x}", a),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(","))
        }
        DynSolValue::Tuple(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("({})", inner.join(","))
        }
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    #[test]
    fn test_signature_hash_known_event() {
        // keccak256("Transfer(address,address,uint256)")
        let hash = EthCodec.signature_hash("Transfer(address,address,uint256)").unwrap();
        assert_eq!(
            hex::encode(hash),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_signature_hash_deterministic() {
        let a = EthCodec.signature_hash("transfer(address,uint256)").unwrap();
        let b = EthCodec.signature_hash("transfer(address,uint256)").unwrap();
        assert_eq!(a, b);
        // First 4 bytes are the well-known ERC20 transfer selector.
        assert_eq!(hex::encode(&a[..4]), "a9059cbb");
    }

    #[test]
    fn test_decode_static_types() {
        let addr = Address::from_slice(
            &hex::decode("0742d35cc6634c0532925a3b844bc9e7595f0beb").unwrap(),
        );
        let encoded = DynSolValue::Tuple(vec![
            DynSolValue::Address(addr),
            DynSolValue::Uint(U256::from(1000u64), 256),
        ])
        .abi_encode_params();

        let types = vec!["address".to_string(), "uint256".to_string()];
        let values = EthCodec.decode(&types, &encoded).unwrap();
        assert_eq!(values[0], "0x0742d35cc6634c0532925a3b844bc9e7595f0beb");
        assert_eq!(values[1], "1000");
    }

    #[test]
    fn test_decode_dynamic_string() {
        let encoded = DynSolValue::Tuple(vec![
            DynSolValue::String("hello tempo".to_string()),
            DynSolValue::Bool(true),
        ])
        .abi_encode_params();

        let types = vec!["string".to_string(), "bool".to_string()];
        let values = EthCodec.decode(&types, &encoded).unwrap();
        assert_eq!(values[0], "hello tempo");
        assert_eq!(values[1], "true");
    }

    #[test]
    fn test_decode_garbage_payload_is_none() {
        let types = vec!["uint256".to_string()];
        // Too short to hold a 32-byte word.
        assert!(EthCodec.decode(&types, &[0x01, 0x02]).is_none());
    }

    #[test]
    fn test_noop_codec_unavailable() {
        assert!(NoopCodec.signature_hash("transfer(address,uint256)").is_none());
        assert!(NoopCodec.decode(&["uint256".to_string()], &[0u8; 32]).is_none());
    }
}
