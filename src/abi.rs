//! Contract ABI model and signature derivation
//!
//! Parses loose ABI JSON into tagged entries at load time, rejecting
//! malformed entries early so the decode paths never see ambiguity.
//! Signatures are the canonical `name(type1,type2,...)` form, parameter
//! types exactly as declared and in declaration order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while loading an ABI definition.
///
/// A malformed entry cannot reliably produce a selector, so loading
/// fails fast instead of propagating bad entries into decoding.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("ABI root must be a JSON array of entries")]
    NotAnArray,

    #[error("ABI entry {0} is not a JSON object")]
    EntryNotObject(usize),

    #[error("ABI entry {index} missing string field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("ABI entry {index} input {input} missing string field `type`")]
    MalformedInput { index: usize, input: usize },
}

/// A single function or event parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Declared parameter name (None when unnamed)
    pub name: Option<String>,
    /// Declared Solidity type string, e.g. "uint256" or "(address,bool)"
    pub ty: String,
    /// Whether the parameter is indexed (events only, always false for functions)
    pub indexed: bool,
}

/// A callable function or emitted event declared by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbiEntry {
    Function { name: String, inputs: Vec<Param> },
    Event { name: String, inputs: Vec<Param> },
}

impl AbiEntry {
    /// Entry name as declared in the ABI.
    pub fn name(&self) -> &str {
        match self {
            AbiEntry::Function { name, .. } | AbiEntry::Event { name, .. } => name,
        }
    }

    /// Declared parameters in declaration order.
    pub fn inputs(&self) -> &[Param] {
        match self {
            AbiEntry::Function { inputs, .. } | AbiEntry::Event { inputs, .. } => inputs,
        }
    }

    /// Canonical signature string: `name(t1,t2,...)`.
    ///
    /// Type strings are used exactly as declared; no alias normalization.
    pub fn signature(&self) -> String {
        signature(self.name(), self.inputs())
    }
}

/// Build the canonical signature string for a name and parameter list.
pub fn signature(name: &str, inputs: &[Param]) -> String {
    let types: Vec<&str> = inputs.iter().map(|p| p.ty.as_str()).collect();
    format!("{}({})", name, types.join(","))
}

/// An ordered ABI definition, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abi {
    entries: Vec<AbiEntry>,
}

impl Abi {
    /// Build an ABI from already-validated entries.
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        Self { entries }
    }

    /// Parse an ABI from loose JSON.
    ///
    /// Entries of kinds other than `function` and `event` (constructor,
    /// fallback, receive, error) are skipped; entries of the supported
    /// kinds are validated strictly and fail the whole load when malformed.
    pub fn from_json(value: &Value) -> Result<Self, AbiError> {
        let items = value.as_array().ok_or(AbiError::NotAnArray)?;

        let mut entries = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let obj = item.as_object().ok_or(AbiError::EntryNotObject(index))?;

            let kind = obj
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or(AbiError::MissingField { index, field: "type" })?;
            if kind != "function" && kind != "event" {
                continue;
            }

            let name = obj
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or(AbiError::MissingField { index, field: "name" })?
                .to_string();

            let inputs = parse_inputs(obj.get("inputs"), index)?;

            entries.push(match kind {
                "function" => AbiEntry::Function { name, inputs },
                _ => AbiEntry::Event { name, inputs },
            });
        }

        Ok(Self { entries })
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the `inputs` array of an entry. Missing array means no parameters.
fn parse_inputs(value: Option<&Value>, index: usize) -> Result<Vec<Param>, AbiError> {
    let items = match value {
        Some(v) => v
            .as_array()
            .ok_or(AbiError::MalformedInput { index, input: 0 })?,
        None => return Ok(Vec::new()),
    };

    let mut params = Vec::with_capacity(items.len());
    for (input, item) in items.iter().enumerate() {
        let ty = item
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(AbiError::MalformedInput { index, input })?
            .to_string();

        // An empty name string means the parameter is unnamed.
        let name = item
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let indexed = item
            .get("indexed")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        params.push(Param { name, ty, indexed });
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signature_order_sensitive() {
        let a = Param { name: Some("to".into()), ty: "address".into(), indexed: false };
        let b = Param { name: Some("amount".into()), ty: "uint256".into(), indexed: false };

        let forward = signature("transfer", &[a.clone(), b.clone()]);
        let reversed = signature("transfer", &[b, a]);

        assert_eq!(forward, "transfer(address,uint256)");
        assert_eq!(reversed, "transfer(uint256,address)");
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_signature_no_params() {
        let entry = AbiEntry::Function { name: "pause".into(), inputs: vec![] };
        assert_eq!(entry.signature(), "pause()");
    }

    #[test]
    fn test_from_json_parses_functions_and_events() {
        let value = json!([
            {
                "type": "function",
                "name": "transfer",
                "inputs": [
                    {"name": "to", "type": "address"},
                    {"name": "amount", "type": "uint256"}
                ]
            },
            {
                "type": "event",
                "name": "Transfer",
                "inputs": [
                    {"name": "from", "type": "address", "indexed": true},
                    {"name": "to", "type": "address", "indexed": true},
                    {"name": "value", "type": "uint256"}
                ]
            },
            {"type": "constructor", "inputs": []}
        ]);

        let abi = Abi::from_json(&value).unwrap();
        assert_eq!(abi.entries().len(), 2);
        assert_eq!(abi.entries()[0].signature(), "transfer(address,uint256)");
        assert_eq!(abi.entries()[1].signature(), "Transfer(address,address,uint256)");

        match &abi.entries()[1] {
            AbiEntry::Event { inputs, .. } => {
                assert!(inputs[0].indexed);
                assert!(!inputs[2].indexed);
            }
            _ => panic!("expected event entry"),
        }
    }

    #[test]
    fn test_from_json_unnamed_param() {
        let value = json!([
            {
                "type": "function",
                "name": "seed",
                "inputs": [{"name": "", "type": "bytes32"}]
            }
        ]);

        let abi = Abi::from_json(&value).unwrap();
        assert_eq!(abi.entries()[0].inputs()[0].name, None);
        assert_eq!(abi.entries()[0].signature(), "seed(bytes32)");
    }

    #[test]
    fn test_from_json_rejects_missing_name() {
        let value = json!([{"type": "function", "inputs": []}]);
        let err = Abi::from_json(&value).unwrap_err();
        assert!(matches!(err, AbiError::MissingField { index: 0, field: "name" }));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let value = json!([
            {"type": "event", "name": "Ping", "inputs": [{"name": "x"}]}
        ]);
        let err = Abi::from_json(&value).unwrap_err();
        assert!(matches!(err, AbiError::MalformedInput { index: 0, input: 0 }));
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        let err = Abi::from_json(&json!({"abi": []})).unwrap_err();
        assert!(matches!(err, AbiError::NotAnArray));
    }
}
