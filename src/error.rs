// Store errors
//
// Reads never surface to callers (a missing or corrupt document degrades to
// the empty store), so what escapes the backend comes from writing the
// document back.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidFormat(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
