//! Error types for the providers module

use thiserror::Error;

/// Errors that can occur when talking to a provider
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ProviderError {
    /// Authentication failed (never includes key details)
    #[error("Authentication failed")]
    AuthError,

    /// Rate limited by provider
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Network error occurred
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Generic provider error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid model specified
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Response envelope did not have the expected shape
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ProviderError {
    /// Whether fixing configuration (not retrying) is the way out.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthError | ProviderError::ConfigError(_) | ProviderError::InvalidModel(_)
        )
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::NetworkError("Request timeout".to_string())
        } else if err.is_connect() {
            ProviderError::NetworkError(err.to_string())
        } else {
            ProviderError::ProviderError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(ProviderError::AuthError.is_configuration());
        assert!(ProviderError::ConfigError("x".into()).is_configuration());
        assert!(ProviderError::InvalidModel("x".into()).is_configuration());
        assert!(!ProviderError::RateLimited(60).is_configuration());
        assert!(!ProviderError::NetworkError("down".into()).is_configuration());
        assert!(!ProviderError::ParseError("bad".into()).is_configuration());
    }

    #[test]
    fn test_auth_error_message_has_no_details() {
        assert_eq!(ProviderError::AuthError.to_string(), "Authentication failed");
    }
}
