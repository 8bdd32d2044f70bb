use thiserror::Error;

/// Errors reported by a device client
///
/// The split between [`ApiError::Connection`] and the other variants matters
/// to callers: a connection failure means the player is not reachable yet
/// (powered down, still booting, wrong host) and the request can simply be
/// retried later, while every other variant means the player answered but
/// the exchange itself failed.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure
    ///
    /// The device could not be reached at all: connection refused, timeout
    /// while connecting, DNS failure, no route to host.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The device was reached but the request failed
    ///
    /// Covers HTTP error statuses, unexpected redirects and protocol-level
    /// faults returned by the player.
    #[error("Request error: {0}")]
    Request(String),

    /// Response parsing error
    ///
    /// The device answered with content that could not be decoded into the
    /// expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Authentication was rejected by the device
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Persisted identity blob could not be encoded or decoded
    #[error("Identity blob error: {0}")]
    IdentityBlob(String),
}

impl ApiError {
    /// Whether this error is a connection-level failure
    pub fn is_connection(&self) -> bool {
        matches!(self, ApiError::Connection(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::IdentityBlob(error.to_string())
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;
