//! Production image backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → WebP (lossy) | `webp::Encoder` (libwebp) |
//!
//! AVIF sources are not decodable with this feature set; they fail identify
//! and the pipeline skips them.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::path::Path;

/// Backend built on the `image` and `webp` crates.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
}

/// Open a decoder, sniffing the format from content rather than extension.
fn open_decoder(path: &Path) -> Result<impl ImageDecoder, BackendError> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(path, e))?
        .into_decoder()
        .map_err(|e| decode_error(path, e))
}

/// Whether an EXIF orientation swaps width and height on display.
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Stored dimensions adjusted for display orientation.
fn oriented(stored: (u32, u32), orientation: Orientation) -> Dimensions {
    let (width, height) = if swaps_axes(orientation) {
        (stored.1, stored.0)
    } else {
        stored
    };
    Dimensions { width, height }
}

/// Decode fully and rotate pixels into display orientation.
fn load_oriented(path: &Path) -> Result<DynamicImage, BackendError> {
    let mut decoder = open_decoder(path)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// libwebp only takes 8-bit RGB or RGBA buffers.
fn to_webp_compatible(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => img,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Lossy WebP encode at the given quality and write to `path`.
fn save_webp(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let encoder = webp::Encoder::from_image(img)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {}", e)))?;
    let encoded = encoder.encode(quality as f32);
    std::fs::write(path, &*encoded)?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let mut decoder = open_decoder(path)?;
        let stored = decoder.dimensions();
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let dims = oriented(stored, orientation);
        if dims.width == 0 || dims.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "No dimensions for {}",
                path.display()
            )));
        }
        Ok(dims)
    }

    fn resize(&self, params: &ResizeParams) -> Result<Option<Dimensions>, BackendError> {
        let img = load_oriented(&params.source)?;

        let resized = if params.width >= img.width() {
            img
        } else {
            img.resize_exact(params.width, params.height.max(1), FilterType::Lanczos3)
        };
        let resized = to_webp_compatible(resized);

        save_webp(&resized, &params.output, params.quality.value())?;
        Ok(Some(Dimensions {
            width: resized.width(),
            height: resized.height(),
        }))
    }
}
