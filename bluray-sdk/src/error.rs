use thiserror::Error;

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("State management error: {0}")]
    State(#[from] bluray_state::StateError),

    #[error("API error: {0}")]
    Api(#[from] bluray_api::ApiError),

    #[error("Identity store error: {0}")]
    Store(#[from] identity_store::StoreError),

    /// The player wants a PIN typed in before it accepts this controller
    #[error("Authentication required: the player is showing a PIN")]
    AuthenticationRequired,

    /// The player did not accept the submitted PIN
    #[error("The player rejected the PIN")]
    PinRejected,

    /// Zero-config registration was rejected for an unknown reason
    #[error("Registration failed: {0}")]
    Registration(String),

    /// Setup could not complete; retry later
    #[error("Player not ready: {0}")]
    NotReady(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pairing already completed")]
    PairingComplete,

    #[error("Blocking worker failed: {0}")]
    Worker(String),
}

impl SdkError {
    /// Whether retrying the same operation later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SdkError::NotReady(_) | SdkError::Worker(_))
            || matches!(self, SdkError::Api(e) if e.is_connection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(SdkError::NotReady("first refresh failed".to_string()).is_retryable());
        assert!(SdkError::Api(bluray_api::ApiError::Connection("refused".to_string())).is_retryable());
        assert!(!SdkError::AuthenticationRequired.is_retryable());
        assert!(!SdkError::PinRejected.is_retryable());
        assert!(!SdkError::Api(bluray_api::ApiError::Request("HTTP 403".to_string())).is_retryable());
    }
}
