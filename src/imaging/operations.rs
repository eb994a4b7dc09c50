//! High-level image operations.
//!
//! These functions combine calculations with backend execution: decide the
//! renditions for one source, then hand each to the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{scaled_height, variant_widths};
use super::params::{Quality, ResizeParams};
use crate::config::SiteConfig;
use crate::naming;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get display-oriented image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Width ladder and encoding policy for responsive renditions.
#[derive(Debug, Clone)]
pub struct ResponsiveConfig {
    pub widths: Vec<u32>,
    pub upscale_cap: u32,
    pub standard: Quality,
    pub large: Quality,
    /// Widths strictly above this use `large`.
    pub large_above: u32,
}

impl ResponsiveConfig {
    pub fn from_site_config(config: &SiteConfig) -> Self {
        Self {
            widths: config.variants.widths.clone(),
            upscale_cap: config.variants.upscale_cap,
            standard: Quality::new(config.quality.standard),
            large: Quality::new(config.quality.large),
            large_above: config.quality.large_above,
        }
    }

    /// Encoding quality for a rendition of the given width.
    pub fn quality_for(&self, width: u32) -> Quality {
        if width > self.large_above {
            self.large
        } else {
            self.standard
        }
    }
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self::from_site_config(&SiteConfig::default())
    }
}

/// A rendition written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedVariant {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Plan every rendition for one source without executing anything.
///
/// `relative_source` is the forward-slash path under the public root; it
/// seeds the file name hash. Outputs land directly in `output_folder`.
pub fn plan_variants(
    source: &Path,
    relative_source: &str,
    output_folder: &Path,
    natural: Dimensions,
    config: &ResponsiveConfig,
) -> Vec<ResizeParams> {
    variant_widths(natural.width, &config.widths, config.upscale_cap)
        .into_iter()
        .map(|width| ResizeParams {
            source: source.to_path_buf(),
            output: output_folder.join(naming::variant_file_name(relative_source, width)),
            width,
            height: scaled_height((natural.width, natural.height), width),
            quality: config.quality_for(width),
        })
        .collect()
}

/// Create all renditions for one source, ascending by width.
///
/// Records the size the backend reports; when it reports none, falls back
/// to the requested width and proportional height. Renditions the encoder
/// reports at an already-recorded width are dropped from the list.
pub fn create_variants(
    backend: &impl ImageBackend,
    source: &Path,
    relative_source: &str,
    output_folder: &Path,
    natural: Dimensions,
    config: &ResponsiveConfig,
) -> Result<Vec<GeneratedVariant>> {
    let mut variants = Vec::new();

    for params in plan_variants(source, relative_source, output_folder, natural, config) {
        let reported = backend.resize(&params)?;
        let Dimensions { width, height } = reported.unwrap_or(Dimensions {
            width: params.width,
            height: params.height,
        });
        variants.push(GeneratedVariant {
            path: params.output,
            width,
            height,
        });
    }

    variants.sort_by_key(|v| v.width);
    variants.dedup_by_key(|v| v.width);
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn quality_threshold_is_exclusive() {
        let config = ResponsiveConfig::default();
        assert_eq!(config.quality_for(64).value(), 78);
        assert_eq!(config.quality_for(1400).value(), 78);
        assert_eq!(config.quality_for(1401).value(), 72);
        assert_eq!(config.quality_for(2048).value(), 72);
    }

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(&[("test.jpg", 1920, 1080)]);
        let d = get_dimensions(&backend, Path::new("/test.jpg")).unwrap();
        assert_eq!(d, dims(1920, 1080));
    }

    #[test]
    fn plan_for_large_source_uses_full_ladder() {
        let plan = plan_variants(
            Path::new("/public/media/big.jpg"),
            "media/big.jpg",
            Path::new("/public/_img/media"),
            dims(3000, 2000),
            &ResponsiveConfig::default(),
        );

        let widths: Vec<u32> = plan.iter().map(|p| p.width).collect();
        assert_eq!(
            widths,
            vec![64, 96, 160, 240, 320, 480, 640, 768, 960, 1200, 1600, 2048]
        );
        let q1600 = plan.iter().find(|p| p.width == 1600).unwrap();
        assert_eq!(q1600.quality.value(), 72);
        assert_eq!(q1600.height, 1067);
        let q1200 = plan.iter().find(|p| p.width == 1200).unwrap();
        assert_eq!(q1200.quality.value(), 78);
    }

    #[test]
    fn plan_outputs_use_deterministic_names() {
        let plan = plan_variants(
            Path::new("/public/media/Team Photo.jpg"),
            "media/Team Photo.jpg",
            Path::new("/public/_img/media"),
            dims(100, 50),
            &ResponsiveConfig::default(),
        );
        let hash = naming::path_hash("media/Team Photo.jpg");
        let names: Vec<String> = plan
            .iter()
            .map(|p| p.output.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                format!("team-photo-{hash}-64.webp"),
                format!("team-photo-{hash}-96.webp"),
                format!("team-photo-{hash}-100.webp"),
            ]
        );
        assert!(plan.iter().all(|p| p.output.starts_with("/public/_img/media")));
    }

    #[test]
    fn create_variants_records_backend_sizes() {
        let backend = MockBackend::new();
        let variants = create_variants(
            &backend,
            Path::new("/src.png"),
            "src.png",
            Path::new("/out"),
            dims(400, 300),
            &ResponsiveConfig::default(),
        )
        .unwrap();

        let widths: Vec<u32> = variants.iter().map(|v| v.width).collect();
        assert_eq!(widths, vec![64, 96, 160, 240, 320, 400]);
        assert_eq!(variants[0].height, 48);
        assert_eq!(variants[5].height, 300);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 6);
        assert!(ops.iter().all(|op| matches!(op, RecordedOp::Resize { quality: 78, .. })));
    }

    #[test]
    fn create_variants_falls_back_when_encoder_is_silent() {
        let backend = MockBackend {
            silent_encoder: true,
            ..MockBackend::new()
        };
        let variants = create_variants(
            &backend,
            Path::new("/src.png"),
            "src.png",
            Path::new("/out"),
            dims(1000, 333),
            &ResponsiveConfig {
                widths: vec![64],
                ..ResponsiveConfig::default()
            },
        )
        .unwrap();

        // 64 plus natural 1000 (below the cap)
        assert_eq!(variants.len(), 2);
        assert_eq!((variants[0].width, variants[0].height), (64, 21));
        assert_eq!((variants[1].width, variants[1].height), (1000, 333));
    }

    #[test]
    fn create_variants_propagates_backend_failure() {
        let backend = MockBackend {
            corrupt: vec!["bad.jpg".to_string()],
            ..MockBackend::new()
        };
        let result = create_variants(
            &backend,
            Path::new("/bad.jpg"),
            "bad.jpg",
            Path::new("/out"),
            dims(200, 200),
            &ResponsiveConfig::default(),
        );
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
