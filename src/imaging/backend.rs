//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! identify (display-oriented dimensions) and resize (decode, scale, encode
//! to WebP). The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// Filesystem failure (opening a source, writing an output).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The image itself could not be decoded or encoded.
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions, already corrected for EXIF orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Display-oriented dimensions of a source image.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize and encode one rendition.
    ///
    /// Returns the dimensions of the written file when the encoder reports
    /// them, `None` otherwise.
    fn resize(&self, params: &ResizeParams) -> Result<Option<Dimensions>, BackendError>;
}
