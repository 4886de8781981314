//! JSON-RPC chain client port and implementation
//!
//! The orchestrator talks to the chain through the `ChainClient` trait;
//! `RpcClient` is the reqwest-backed implementation. Any RPC failure is
//! fatal to the current sync; there are no retries here.

use crate::abi::Abi;
use crate::types::{Block, Log};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

/// RPC failure taxonomy. Both variants abort the current sync.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Network unreachable, timeout, or other transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node returned an error object.
    #[error("RPC error for {method}: {message}")]
    Remote { method: String, message: String },

    /// The node's response did not have the expected shape.
    #[error("malformed RPC response for {method}: {message}")]
    Response { method: String, message: String },
}

impl RpcError {
    fn response(method: &str, message: impl Into<String>) -> Self {
        Self::Response { method: method.to_string(), message: message.into() }
    }
}

/// Abstract RPC port consumed by the sync orchestrator.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current chain head height.
    async fn head_block_number(&self) -> Result<u64, RpcError>;

    /// Deployed bytecode at an address (empty for EOAs).
    async fn code(&self, address: Address) -> Result<Vec<u8>, RpcError>;

    /// All logs emitted by an address within an inclusive block window.
    async fn logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError>;

    /// A block by number, optionally with full transaction objects.
    async fn block_by_number(
        &self,
        number: u64,
        full_transactions: bool,
    ) -> Result<Block, RpcError>;
}

/// Optional ABI lookup capability.
///
/// Passed explicitly to the metadata fetch rather than bound at client
/// construction, so tests can swap it freely. When absent, the ABI is
/// unknown and decoding degenerates to empty results.
pub trait AbiResolver {
    fn resolve(&self, address: Address) -> Option<Abi>;
}

impl<F> AbiResolver for F
where
    F: Fn(Address) -> Option<Abi>,
{
    fn resolve(&self, address: Address) -> Option<Abi> {
        self(address)
    }
}

/// JSON-RPC client for Ethereum-compatible nodes.
pub struct RpcClient {
    client: reqwest::Client,
    url: String,
}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Make a JSON-RPC call.
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let response = self.client.post(&self.url).json(&request).send().await?;
        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            return Err(RpcError::Remote {
                method: method.to_string(),
                message: error.to_string(),
            });
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| RpcError::response(method, "missing 'result' field"))
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn head_block_number(&self) -> Result<u64, RpcError> {
        let result = self.call("eth_blockNumber", json!([])).await?;
        let number = result
            .as_str()
            .ok_or_else(|| RpcError::response("eth_blockNumber", "result is not a string"))?;
        parse_hex_u64(number)
            .ok_or_else(|| RpcError::response("eth_blockNumber", "invalid hex block number"))
    }

    async fn code(&self, address: Address) -> Result<Vec<u8>, RpcError> {
        let addr_str = format!("0x{:x}", address);
        let result = self.call("eth_getCode", json!([addr_str, "latest"])).await?;

        let code_str = result
            .as_str()
            .ok_or_else(|| RpcError::response("eth_getCode", "result is not a string"))?;
        let code_str = code_str.strip_prefix("0x").unwrap_or(code_str);
        if code_str.is_empty() {
            return Ok(Vec::new());
        }

        let code_str = pad_hex_string(code_str);
        hex::decode(&code_str).map_err(|e| RpcError::response("eth_getCode", e.to_string()))
    }

    async fn logs(
        &self,
        address: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>, RpcError> {
        let filter = json!({
            "address": format!("0x{:x}", address),
            "fromBlock": format!("0x{:x}", from_block),
            "toBlock": format!("0x{:x}", to_block),
        });
        let result = self.call("eth_getLogs", json!([filter])).await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::response("eth_getLogs", e.to_string()))
    }

    async fn block_by_number(
        &self,
        number: u64,
        full_transactions: bool,
    ) -> Result<Block, RpcError> {
        let params = json!([format!("0x{:x}", number), full_transactions]);
        let result = self.call("eth_getBlockByNumber", params).await?;
        if result.is_null() {
            return Err(RpcError::response(
                "eth_getBlockByNumber",
                format!("block {} not found", number),
            ));
        }
        serde_json::from_value(result)
            .map_err(|e| RpcError::response("eth_getBlockByNumber", e.to_string()))
    }
}

/// Parse a hex block number ("0x" prefix optional).
fn parse_hex_u64(s: &str) -> Option<u64> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    u64::from_str_radix(s, 16).ok()
}

/// Pad an odd-length hex string with a leading zero.
fn pad_hex_string(s: &str) -> String {
    if s.len() % 2 == 1 {
        format!("0{}", s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_u64() {
        assert_eq!(parse_hex_u64("0x69"), Some(105));
        assert_eq!(parse_hex_u64("69"), Some(105));
        assert_eq!(parse_hex_u64("0x"), None);
        assert_eq!(parse_hex_u64("0xzz"), None);
    }

    #[test]
    fn test_address_formatting() {
        let addr_bytes = hex::decode("0742d35Cc6634C0532925a3b844Bc9e7595f0bEb").unwrap();
        let addr = Address::from_slice(&addr_bytes);
        assert_eq!(format!("0x{:x}", addr), "0x0742d35cc6634c0532925a3b844bc9e7595f0beb");
    }

    #[test]
    fn test_resolver_closure() {
        let resolver = |_address: Address| -> Option<Abi> { Some(Abi::new(vec![])) };
        assert!(resolver.resolve(Address::ZERO).is_some());
    }
}
