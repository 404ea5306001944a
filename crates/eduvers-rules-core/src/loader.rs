//! # Transaction Loader
//!
//! Reads the transactions file written by the EDUVERS application.
//!
//! - Input is a JSON array of arrays of item identifiers
//! - Strings are taken as-is, numbers as their decimal text
//! - Items repeated within one record collapse to one
//! - Anything else is rejected with `MinerError::Load`

use crate::primitives::MAX_INPUT_FILE_SIZE;
use crate::{Item, MinerError, Transaction};
use serde_json::Value;
use std::path::Path;

/// The Loader turns a transactions source into in-memory transactions.
pub struct TransactionLoader;

impl TransactionLoader {
    /// Load transactions from a JSON file.
    ///
    /// Fails if the file is missing, not a regular file, larger than
    /// `MAX_INPUT_FILE_SIZE`, or malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<Transaction>, MinerError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| {
            MinerError::Load(format!("cannot read '{}': {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(MinerError::Load(format!(
                "'{}' is not a regular file",
                path.display()
            )));
        }

        if metadata.len() > MAX_INPUT_FILE_SIZE {
            return Err(MinerError::Load(format!(
                "file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_INPUT_FILE_SIZE
            )));
        }

        let contents = std::fs::read(path).map_err(|e| {
            MinerError::Load(format!("cannot read '{}': {}", path.display(), e))
        })?;

        Self::from_slice(&contents)
    }

    /// Parse transactions from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Vec<Transaction>, MinerError> {
        let root: Value = serde_json::from_slice(bytes)
            .map_err(|e| MinerError::Load(format!("invalid JSON: {}", e)))?;

        let Value::Array(records) = root else {
            return Err(MinerError::Load(
                "expected a top-level array of transactions".to_string(),
            ));
        };

        let mut transactions = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            transactions.push(Self::parse_record(index, record)?);
        }
        Ok(transactions)
    }

    fn parse_record(index: usize, record: Value) -> Result<Transaction, MinerError> {
        let Value::Array(values) = record else {
            return Err(MinerError::Load(format!(
                "transaction {} is not an array",
                index
            )));
        };

        values
            .into_iter()
            .map(|value| match value {
                Value::String(s) => Ok(Item::new(s)),
                Value::Number(n) => Ok(Item::new(n.to_string())),
                other => Err(MinerError::Load(format!(
                    "transaction {} holds a non-identifier item: {}",
                    index, other
                ))),
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
