//! Camera collaborator interface.
//!
//! Device access lives outside this workspace; front ends plug a concrete
//! [`Camera`] in. [`FileCamera`] serves frames from a file on disk, which is
//! what the command-line front end and the tests use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ImageError, ImageResult};
use crate::formats::ImageFormat;

/// Which physical camera to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointed at the sign
    Environment,
    /// Front camera
    User,
}

/// Stream constraints requested from the camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub facing_mode: FacingMode,
    /// Ideal frame width; devices may deliver something else
    pub ideal_width: u32,
    /// Ideal frame height; devices may deliver something else
    pub ideal_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// Handle to an open camera stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraStream {
    pub id: u64,
    pub config: CameraConfig,
}

/// A frame grabbed from a stream, as delivered by the device.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl CapturedImage {
    /// Wrap raw frame bytes, detecting their format.
    pub fn from_bytes(bytes: Vec<u8>) -> ImageResult<Self> {
        let format = ImageFormat::detect_from_bytes(&bytes)?;
        Ok(Self { bytes, format })
    }
}

/// Source of captured frames.
pub trait Camera: Send {
    /// Open a stream with the given constraints.
    fn start_stream(&mut self, config: &CameraConfig) -> ImageResult<CameraStream>;

    /// Grab the current frame from an open stream.
    fn capture_frame(&mut self, stream: &CameraStream) -> ImageResult<CapturedImage>;

    /// Release the stream. Stopping a stream twice is harmless.
    fn stop_stream(&mut self, stream: CameraStream);
}

/// Camera that reads every frame from a single image file.
#[derive(Debug)]
pub struct FileCamera {
    path: PathBuf,
    active: Option<u64>,
    next_id: u64,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            active: None,
            next_id: 1,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }
}

impl Camera for FileCamera {
    fn start_stream(&mut self, config: &CameraConfig) -> ImageResult<CameraStream> {
        if !self.path.is_file() {
            return Err(ImageError::CameraUnavailable(format!(
                "no frame source at {}",
                self.path.display()
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.active = Some(id);

        info!(
            "Camera stream {} started ({:?}, {}x{})",
            id, config.facing_mode, config.ideal_width, config.ideal_height
        );

        Ok(CameraStream {
            id,
            config: config.clone(),
        })
    }

    fn capture_frame(&mut self, stream: &CameraStream) -> ImageResult<CapturedImage> {
        if self.active != Some(stream.id) {
            return Err(ImageError::CameraUnavailable(format!(
                "stream {} is not active",
                stream.id
            )));
        }

        let bytes = std::fs::read(&self.path)?;
        debug!("Captured {} bytes from {}", bytes.len(), self.path.display());
        CapturedImage::from_bytes(bytes)
    }

    fn stop_stream(&mut self, stream: CameraStream) {
        if self.active == Some(stream.id) {
            self.active = None;
            debug!("Camera stream {} stopped", stream.id);
        }
    }
}
