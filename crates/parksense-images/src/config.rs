//! Encoding settings for captured frames.

use serde::{Deserialize, Serialize};

use crate::error::{ImageError, ImageResult};

/// Default maximum width of the transported image, in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1024;

/// Default lossy quality (0.0 - 1.0).
pub const DEFAULT_QUALITY: f32 = 0.8;

/// Image optimization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Frames wider than this are scaled down before upload
    pub max_width: u32,
    /// JPEG quality in the range (0.0, 1.0]
    pub quality: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl ImageConfig {
    /// Reject settings the codec cannot honour.
    pub fn validate(&self) -> ImageResult<()> {
        if self.max_width == 0 {
            return Err(ImageError::ConfigError(
                "max_width must be greater than zero".to_string(),
            ));
        }

        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(ImageError::ConfigError(format!(
                "quality must be in (0, 1], got {}",
                self.quality
            )));
        }

        Ok(())
    }
}
