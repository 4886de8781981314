//! ABI file loading
//!
//! Handles loading a contract ABI from a JSON file. Accepts either a bare
//! array of entries or a compiler artifact object with an "abi" field.

use crate::abi::Abi;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a contract ABI from a JSON file.
pub fn load_abi(path: &Path) -> Result<Abi> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ABI file: {:?}", path))?;

    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("ABI file is not valid JSON: {:?}", path))?;

    // Compiler artifacts wrap the ABI in an object.
    let entries = value.get("abi").unwrap_or(&value);

    Abi::from_json(entries).with_context(|| format!("Invalid ABI in {:?}", path))
}
