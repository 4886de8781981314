//! ABI-driven decoding of calldata and event logs
//!
//! Pure functions that match selectors against an ABI and bind decoded
//! values to parameter names. Every failure path degrades to the empty
//! result; the caller persists raw data either way.

use crate::abi::{Abi, AbiEntry, Param};
use crate::codec::AbiCodec;
use crate::types::Log;
use std::collections::BTreeMap;

/// Result of decoding a transaction's input data.
///
/// `function` and `args` are both Some or both None.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    /// Matched function name
    pub function: Option<String>,
    /// Decoded arguments keyed by parameter name (`arg{i}` when unnamed)
    pub args: Option<BTreeMap<String, String>>,
}

impl DecodedCall {
    /// The no-match result.
    pub fn empty() -> Self {
        Self { function: None, args: None }
    }
}

/// Result of decoding a log entry.
///
/// `name` and `fields` are both Some or both None.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Matched event name
    pub name: Option<String>,
    /// Decoded non-indexed fields keyed by name (`field{i}` when unnamed)
    pub fields: Option<BTreeMap<String, String>>,
}

impl DecodedEvent {
    /// The no-match result.
    pub fn empty() -> Self {
        Self { name: None, fields: None }
    }
}

/// Decode transaction input data against the contract ABI.
///
/// Accepts 0x-prefixed or bare hex. Absent ABI, empty input, or the "0x"
/// no-data marker short-circuit to the empty result. Function entries are
/// scanned in declaration order; the first whose selector (first 4 bytes
/// of the signature hash) matches wins.
pub fn decode_function_call(
    abi: Option<&Abi>,
    input: &str,
    codec: &dyn AbiCodec,
) -> DecodedCall {
    let abi = match abi {
        Some(a) if !a.is_empty() => a,
        _ => return DecodedCall::empty(),
    };

    let body = input.strip_prefix("0x").unwrap_or(input);
    if body.is_empty() || body.len() < 8 {
        return DecodedCall::empty();
    }

    let selector = match hex::decode(&body[..8]) {
        Ok(b) => b,
        Err(_) => return DecodedCall::empty(),
    };
    let payload = match hex::decode(&body[8..]) {
        Ok(b) => b,
        Err(_) => return DecodedCall::empty(),
    };

    for entry in abi.entries() {
        let AbiEntry::Function { name, inputs } = entry else {
            continue;
        };

        let Some(hash) = codec.signature_hash(&entry.signature()) else {
            continue;
        };
        if &hash[..4] != selector.as_slice() {
            continue;
        }

        let types: Vec<String> = inputs.iter().map(|p| p.ty.clone()).collect();
        let values = if types.is_empty() {
            Vec::new()
        } else {
            match codec.decode(&types, &payload) {
                Some(v) => v,
                None => return DecodedCall::empty(),
            }
        };

        return DecodedCall {
            function: Some(name.clone()),
            args: Some(bind_values(inputs, &values, "arg")),
        };
    }

    DecodedCall::empty()
}

/// Decode a log entry against the contract ABI.
///
/// The log's first topic carries the full event signature hash. Only
/// non-indexed parameters are decoded from `data`; indexed values are
/// not recovered from topics.
pub fn decode_event(abi: Option<&Abi>, log: &Log, codec: &dyn AbiCodec) -> DecodedEvent {
    let abi = match abi {
        Some(a) if !a.is_empty() => a,
        _ => return DecodedEvent::empty(),
    };

    let Some(topic0) = log.topics.first() else {
        return DecodedEvent::empty();
    };
    let topic0 = match decode_topic(topic0) {
        Some(b) => b,
        None => return DecodedEvent::empty(),
    };

    for entry in abi.entries() {
        let AbiEntry::Event { name, inputs } = entry else {
            continue;
        };

        let Some(hash) = codec.signature_hash(&entry.signature()) else {
            continue;
        };
        if hash.as_slice() != topic0.as_slice() {
            continue;
        }

        let non_indexed: Vec<&Param> = inputs.iter().filter(|p| !p.indexed).collect();
        let types: Vec<String> = non_indexed.iter().map(|p| p.ty.clone()).collect();

        let data_hex = log.data.strip_prefix("0x").unwrap_or(&log.data);
        let data = match hex::decode(data_hex) {
            Ok(b) => b,
            Err(_) => return DecodedEvent::empty(),
        };

        let values = if types.is_empty() {
            Vec::new()
        } else {
            match codec.decode(&types, &data) {
                Some(v) => v,
                None => return DecodedEvent::empty(),
            }
        };

        let mut fields = BTreeMap::new();
        for (idx, (param, value)) in non_indexed.iter().zip(values.iter()).enumerate() {
            let key = param.name.clone().unwrap_or_else(|| format!("field{}", idx));
            fields.insert(key, value.clone());
        }

        return DecodedEvent {
            name: Some(name.clone()),
            fields: Some(fields),
        };
    }

    DecodedEvent::empty()
}

/// Bind decoded values positionally to parameter names.
fn bind_values(params: &[Param], values: &[String], fallback: &str) -> BTreeMap<String, String> {
    let mut bound = BTreeMap::new();
    for (idx, (param, value)) in params.iter().zip(values.iter()).enumerate() {
        let key = param.name.clone().unwrap_or_else(|| format!("{}{}", fallback, idx));
        bound.insert(key, value.clone());
    }
    bound
}

/// Parse a 32-byte hex topic.
fn decode_topic(topic: &str) -> Option<Vec<u8>> {
    let s = topic.strip_prefix("0x").unwrap_or(topic);
    let bytes = hex::decode(s).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    Some(bytes)
}
