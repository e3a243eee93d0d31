//! Storage error types

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate record key: {0}")]
    DuplicateKey(String),

    #[error("Unknown record key: {0}")]
    UnknownKey(String),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(String),
}
