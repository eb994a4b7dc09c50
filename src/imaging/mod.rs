//! Image processing: identify, resize, encode to WebP.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image` decoder header + EXIF orientation |
//! | **Resize → WebP** | Lanczos3 + libwebp (`webp` crate) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for width ladders and dimension math
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{scaled_height, variant_widths};
pub use operations::{
    GeneratedVariant, ResponsiveConfig, create_variants, get_dimensions, plan_variants,
};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
