//! # Site Variants
//!
//! Build-time responsive image variants for a static site.
//!
//! Raster images under the site's public root are resized into a ladder of
//! WebP renditions. A JSON manifest maps each source's URL path to its
//! natural size and renditions, and page code picks the right rendition for
//! a display width from that manifest alone.
//!
//! # Architecture: Two Halves, One Manifest
//!
//! ```text
//! 1. Generate   public/{media,members,lebob.png}  →  public/_img/ + image-variants.json
//! 2. Select     image-variants.json               →  src / srcset for an <img>
//! ```
//!
//! The generator runs once per build and owns the filesystem. The selector
//! is a pure, immutable lookup over the loaded manifest; it never checks
//! that a rendition file exists.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Finds source images under the configured directories and files |
//! | [`naming`] | Canonical URL keys, deterministic rendition file names, user tag |
//! | [`imaging`] | Width ladder, scaled heights, decode/resize/WebP encode |
//! | [`process`] | The generator run: output directory, per-image work, manifest write |
//! | [`manifest`] | Manifest types and (de)serialization |
//! | [`select`] | Rendition lookups by display width |
//! | [`render`] | `srcset` strings and `<img>` markup under an optional base path |
//! | [`config`] | `variants.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Content-Addressed Names
//!
//! A rendition's file name is the sanitized source stem, the first 8 hex
//! digits of a SHA-1 over the source's relative path, and the width:
//! `my-photo-1a2b3c4d-640.webp`. Two sources with the same stem in
//! different folders never clash, and names are stable across builds.
//!
//! ## Never Upscale
//!
//! Widths at or above the source's natural width are dropped from the
//! ladder. The natural width itself is added when it is at most the upscale
//! cap (2560 by default), so small images still get a full-size WebP.
//!
//! ## Self-Contained Imaging
//!
//! Decoding and Lanczos3 resampling use the `image` crate. Lossy WebP
//! encoding uses `webp`, which builds its own libwebp. There is no
//! ImageMagick to install.

pub mod config;
pub mod imaging;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod process;
pub mod render;
pub mod scan;
pub mod select;

#[cfg(test)]
pub(crate) mod test_helpers;
