//! Error types for the analysis pipeline.
//!
//! Only failures that leave nothing to show are errors. A reply that cannot
//! be validated is not one of them: it becomes a fallback result instead.

use parksense_images::ImageError;
use parksense_providers::ProviderError;
use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that abort an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Credential or provider settings are unusable; retrying will not help.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider could not be reached or answered with an error.
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// The captured frame could not be prepared for upload.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
}

impl AnalysisError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, AnalysisError::Configuration(_))
    }
}

impl From<ProviderError> for AnalysisError {
    fn from(err: ProviderError) -> Self {
        if err.is_configuration() {
            AnalysisError::Configuration(err.to_string())
        } else {
            AnalysisError::Provider(err)
        }
    }
}

impl From<serde_yaml::Error> for AnalysisError {
    fn from(err: serde_yaml::Error) -> Self {
        AnalysisError::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Configuration(err.to_string())
    }
}
