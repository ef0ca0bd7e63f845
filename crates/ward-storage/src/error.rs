//! Storage error types.

use thiserror::Error;

/// Storage error type.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// LMDB error.
    #[error("database error: {0}")]
    Database(#[from] heed::Error),

    /// Binary encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// World names become file and key names, so they are restricted.
    #[error("invalid world name '{0}'")]
    InvalidWorldName(String),

    /// Stored data decoded but does not make sense.
    #[error("corrupt data for world '{world}': {reason}")]
    Corrupt { world: String, reason: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
