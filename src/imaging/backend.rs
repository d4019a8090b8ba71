//! Image engine trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the attribute layer
//! needs from an image engine: identify (read dimensions) and transform
//! (resize, orient, strip, re-encode). Both work on in-memory bytes so the
//! same code path serves local files and stored blobs.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image` crate.

use super::params::TransformParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Re-encoded image content and the dimensions it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
}

/// Trait for image engines.
pub trait ImageBackend {
    /// Get image dimensions from encoded content.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Get image dimensions from a file. Backends that can read a header
    /// without loading the whole file should override this.
    fn identify_path(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let data = std::fs::read(path)?;
        self.identify(&data)
    }

    /// Decode, resize, correct orientation, strip metadata and re-encode.
    fn transform(&self, data: &[u8], params: &TransformParams) -> Result<Encoded, BackendError>;
}
