//! Image handling for ParkSense.
//!
//! This crate owns everything between the camera and the network:
//! - Format detection (PNG, JPG, GIF, WebP)
//! - Downscaling and lossy re-encoding for transport
//! - Data-URI payloads for vision providers
//! - The camera collaborator interface and a file-backed camera

pub mod camera;
pub mod codec;
pub mod config;
pub mod error;
pub mod formats;

pub use camera::{Camera, CameraConfig, CameraStream, CapturedImage, FacingMode, FileCamera};
pub use codec::{EncodedImage, ImageCodec};
pub use config::ImageConfig;
pub use error::{ImageError, ImageResult};
pub use formats::ImageFormat;
