//! Manager error types.

use std::path::PathBuf;

use thiserror::Error;
use ward_region::RegionError;
use ward_storage::StorageError;

/// Manager error type.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// An administrative operation was refused.
    #[error(transparent)]
    Region(#[from] RegionError),

    /// The store failed; the in-memory index is unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("world '{0}' is not loaded")]
    WorldNotLoaded(String),

    #[error("world '{0}' is already loaded")]
    WorldAlreadyLoaded(String),

    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::ManagerConfig`].
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// An environment override holds an unusable value.
    #[error("invalid value '{value}' for {var}")]
    ConfigEnv { var: &'static str, value: String },
}

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;
