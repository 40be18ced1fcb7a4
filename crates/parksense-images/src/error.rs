//! Error types for image operations.

use thiserror::Error;

/// Result type for image operations.
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors that can occur while capturing or encoding images.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Bytes could not be decoded as an image.
    #[error("Invalid image file: {0}")]
    InvalidFile(String),

    /// Re-encoding the optimized image failed.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// The camera could not be started or a frame could not be read.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => ImageError::EncodingFailed(e.to_string()),
            image::ImageError::IoError(e) => ImageError::IoError(e),
            other => ImageError::InvalidFile(other.to_string()),
        }
    }
}
