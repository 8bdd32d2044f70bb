//! Error types for bluray-state

use bluray_api::ApiError;
use identity_store::StoreError;

/// Result type for bluray-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can escape the synchronization core
///
/// Device failures during a refresh never show up here; they collapse the
/// playback state instead. What remains are failures of the machinery
/// itself and errors from actions a caller asked for explicitly.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Error from the device client
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Error from the identity store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A blocking worker panicked or was cancelled
    #[error("Blocking worker failed: {0}")]
    Worker(String),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The polling task could not be joined
    #[error("Polling task error: {0}")]
    Polling(String),
}
