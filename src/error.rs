//! Error types for studio_assets

use std::time::Duration;
use thiserror::Error;

/// Main error type for asset operations
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Network error: HTTP {status} {reason}")]
    Network { status: u16, reason: String },

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Thumbnail pool is shut down")]
    PoolShutDown,
}

/// Result type alias for asset operations
pub type Result<T> = std::result::Result<T, AssetError>;
