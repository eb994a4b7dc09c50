//! Shared test utilities.
//!
//! Writes small synthetic images with the `image` crate and lays out a
//! throwaway project tree shaped like the site:
//!
//! ```text
//! <tmp>/
//! └── public/
//!     ├── lebob.png
//!     ├── media/...
//!     └── members/...
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write a small valid JPEG with the given dimensions, creating parent dirs.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a JPEG whose stored pixels are `width`x`height` and whose EXIF
/// Orientation tag is `orientation` (6 = rotate 90° clockwise on display).
pub fn write_test_jpeg_with_orientation(path: &Path, width: u32, height: u32, orientation: u16) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = gradient(width, height);
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();

    // Big-endian TIFF header, one IFD entry: 0x0112 SHORT x1.
    let mut exif = b"Exif\0\0MM\0\x2a\0\0\0\x08\0\x01\x01\x12\0\x03\0\0\0\x01".to_vec();
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    let mut app1 = vec![0xFF, 0xE1];
    app1.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    app1.extend_from_slice(&exif);

    // After SOI, and after the JFIF APP0 segment when the encoder wrote one.
    let at = if jpeg[2..4] == [0xFF, 0xE0] {
        4 + u16::from_be_bytes([jpeg[4], jpeg[5]]) as usize
    } else {
        2
    };
    jpeg.splice(at..at, app1);
    std::fs::write(path, jpeg).unwrap();
}

/// Write a small valid RGBA PNG with the given dimensions, creating parent dirs.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(y % 256) as u8, (x % 256) as u8, 64, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write a zero-byte placeholder; enough for mock-backend tests.
pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

/// Temp project with an empty `public/` directory.
pub fn setup_project() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let public = tmp.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    (tmp, public)
}
