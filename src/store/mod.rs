use std::fmt;

use thiserror::Error;

pub mod in_memory_store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Get,
    Put,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOperation::Get => f.write_str("get"),
            StoreOperation::Put => f.write_str("put"),
        }
    }
}

#[derive(Debug, Error)]
#[error("Store {operation} failed for `{key}`: {reason}")]
pub struct StoreError {
    pub operation: StoreOperation,
    pub key: String,
    pub reason: String,
}

/// Key-value state supplied by the host.
///
/// Reads must observe earlier writes of the same invocation. Absence of a
/// key is `Ok(None)`, not an error.
pub trait LedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}
