//! Error types for identity persistence

use std::path::PathBuf;

/// Errors that can occur while reading or writing the stored blob
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored content is not a valid envelope
    #[error("Failed to decode stored blob: {0}")]
    Decode(String),

    /// Blob could not be serialized
    #[error("Failed to encode blob: {0}")]
    Encode(String),

    /// Stored blob was written by a newer schema
    #[error("Unsupported storage version {found} (max supported {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// No platform data directory could be determined
    #[error("No data directory available on this platform")]
    NoDataDir,
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
