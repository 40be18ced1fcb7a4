//! Downscaling and lossy re-encoding of captured frames.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};
use tracing::debug;

use crate::config::ImageConfig;
use crate::error::{ImageError, ImageResult};
use crate::formats::ImageFormat;

/// An image ready to be sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    /// Encoded bytes
    pub bytes: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoding of `bytes`
    pub format: ImageFormat,
}

impl EncodedImage {
    /// Base64 payload without the data-URI prefix.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>` form accepted by vision providers.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.base64())
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Shrinks frames and re-encodes them as JPEG for network transport.
#[derive(Debug, Clone, Default)]
pub struct ImageCodec {
    config: ImageConfig,
}

impl ImageCodec {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Optimize a frame with the configured width limit and quality.
    pub fn optimize(&self, bytes: &[u8]) -> ImageResult<EncodedImage> {
        Self::optimize_with(bytes, self.config.max_width, self.config.quality)
    }

    /// Optimize a frame.
    ///
    /// Frames wider than `max_width` are scaled down with their aspect ratio
    /// preserved; every frame is re-encoded as JPEG at `quality` (0.0 - 1.0).
    /// Decoding failures are the only error.
    pub fn optimize_with(bytes: &[u8], max_width: u32, quality: f32) -> ImageResult<EncodedImage> {
        let format = ImageFormat::detect_from_bytes(bytes)?;
        let decoded = image::load_from_memory_with_format(bytes, format.to_decoder_format())
            .map_err(|e| ImageError::InvalidFile(format!("Failed to decode image: {}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        let (target_width, target_height) = scaled_dimensions(width, height, max_width);

        let resized = if (target_width, target_height) != (width, height) {
            debug!(
                "Scaling frame from {}x{} to {}x{}",
                width, height, target_width, target_height
            );
            decoded.resize_exact(target_width, target_height, FilterType::Triangle)
        } else {
            decoded
        };

        let bytes = encode_jpeg(&resized, quality_percent(quality))?;

        Ok(EncodedImage {
            bytes,
            width: resized.width(),
            height: resized.height(),
            format: ImageFormat::Jpeg,
        })
    }
}

/// Target dimensions for a frame under a width limit.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if max_width == 0 || width <= max_width {
        return (width, height);
    }

    let scaled_height = (height as f64 * max_width as f64 / width as f64).round();
    (max_width, (scaled_height as u32).max(1))
}

fn quality_percent(quality: f32) -> u8 {
    if quality.is_nan() {
        return 80;
    }
    (quality.clamp(0.01, 1.0) * 100.0).round() as u8
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> ImageResult<Vec<u8>> {
    // JPEG has no alpha channel
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.encode_image(&rgb)?;
    Ok(buffer)
}
