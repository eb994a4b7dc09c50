//! Pipeline configuration module.
//!
//! Handles loading, validating, and merging `variants.toml`. Stock defaults
//! are serialized to a TOML table and the user's file is merged on top of it
//! key by key, so a config file only needs the values it wants to change.
//!
//! ## Config File Location
//!
//! `variants.toml` lives in the project root (the directory that contains the
//! `public/` assets tree):
//!
//! ```text
//! site/
//! ├── variants.toml                 # optional, overrides stock defaults
//! ├── public/
//! │   ├── lebob.png
//! │   ├── media/
//! │   └── members/
//! └── src/generated/image-variants.json
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! public_dir = "public"
//! manifest_path = "src/generated/image-variants.json"
//!
//! [sources]
//! dirs = ["media", "members"]       # walked recursively, relative to public_dir
//! files = ["lebob.png"]             # individual files, relative to public_dir
//! extensions = ["jpg", "jpeg", "png", "webp", "avif"]
//!
//! [variants]
//! widths = [64, 96, 160, 240, 320, 480, 640, 768, 960, 1200, 1600, 2048]
//! upscale_cap = 2560                # keep natural width as a variant up to this size
//! output_dir = "_img"               # under public_dir
//!
//! [quality]
//! standard = 78
//! large = 72
//! large_above = 1400                # widths above this use `large`
//!
//! [processing]
//! max_processes = 4                 # omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "variants.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `variants.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Public assets root, relative to the project root.
    pub public_dir: String,
    /// Where the manifest is written, relative to the project root.
    pub manifest_path: String,
    pub sources: SourcesConfig,
    pub variants: VariantsConfig,
    pub quality: QualityConfig,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            public_dir: "public".to_string(),
            manifest_path: "src/generated/image-variants.json".to_string(),
            sources: SourcesConfig::default(),
            variants: VariantsConfig::default(),
            quality: QualityConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let widths = &self.variants.widths;
        if widths.is_empty() {
            return Err(ConfigError::Validation(
                "variants.widths must not be empty".into(),
            ));
        }
        if widths.contains(&0) {
            return Err(ConfigError::Validation(
                "variants.widths values must be non-zero".into(),
            ));
        }
        if widths.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Validation(
                "variants.widths must be strictly ascending".into(),
            ));
        }
        if self.variants.upscale_cap == 0 {
            return Err(ConfigError::Validation(
                "variants.upscale_cap must be non-zero".into(),
            ));
        }
        let out = &self.variants.output_dir;
        if out.is_empty() || out.contains(['/', '\\']) || out == "." || out == ".." {
            return Err(ConfigError::Validation(
                "variants.output_dir must be a single directory name".into(),
            ));
        }
        if self.quality.standard > 100 || self.quality.large > 100 {
            return Err(ConfigError::Validation(
                "quality.standard and quality.large must be 0-100".into(),
            ));
        }
        if self.sources.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "sources.extensions must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Absolute (or root-relative) public assets directory.
    pub fn public_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.public_dir)
    }

    /// Location of the manifest file for a given project root.
    pub fn manifest_file(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.manifest_path)
    }
}

/// Which files under the public root are variant sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Directories walked recursively, relative to `public_dir`.
    pub dirs: Vec<String>,
    /// Individually named files, relative to `public_dir`.
    pub files: Vec<String>,
    /// Recognized raster extensions, without the dot. Matched case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            dirs: vec!["media".to_string(), "members".to_string()],
            files: vec!["lebob.png".to_string()],
            extensions: ["jpg", "jpeg", "png", "webp", "avif"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl SourcesConfig {
    /// Whether `path` carries one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

/// The width ladder and where variants are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantsConfig {
    /// Ascending candidate widths in pixels.
    pub widths: Vec<u32>,
    /// Natural widths up to this size are kept as an extra variant.
    pub upscale_cap: u32,
    /// Output directory name under `public_dir`.
    pub output_dir: String,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            widths: vec![64, 96, 160, 240, 320, 480, 640, 768, 960, 1200, 1600, 2048],
            upscale_cap: 2560,
            output_dir: "_img".to_string(),
        }
    }
}

/// WebP quality by rendition size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    /// Quality for widths up to and including `large_above`.
    pub standard: u32,
    /// Quality for widths above `large_above`.
    pub large: u32,
    pub large_above: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            standard: 78,
            large: 72,
            large_above: 1400,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Used as the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `variants.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `variants.toml` in the given project root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `variants.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Image variant pipeline configuration
# ====================================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Public assets root, relative to the project root.
public_dir = "public"

# Manifest consumed by the page renderer, relative to the project root.
manifest_path = "src/generated/image-variants.json"

# ---------------------------------------------------------------------------
# Sources
# ---------------------------------------------------------------------------
[sources]
# Directories under public_dir walked recursively. Missing ones are skipped.
dirs = ["media", "members"]

# Individual files under public_dir.
files = ["lebob.png"]

# Raster extensions (case-insensitive, no dot).
extensions = ["jpg", "jpeg", "png", "webp", "avif"]

# ---------------------------------------------------------------------------
# Variants
# ---------------------------------------------------------------------------
[variants]
# Candidate widths, strictly ascending. Only widths below an image's natural
# width are produced.
widths = [64, 96, 160, 240, 320, 480, 640, 768, 960, 1200, 1600, 2048]

# The natural width is added as a variant when it is not already a rung and
# does not exceed this cap.
upscale_cap = 2560

# Output directory name under public_dir. It is cleared on every run. When
# it is not writable, "<output_dir>-<user>" is used instead.
output_dir = "_img"

# ---------------------------------------------------------------------------
# WebP quality
# ---------------------------------------------------------------------------
[quality]
standard = 78
large = 72
# Widths above this value use `large`.
large_above = 1400

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
