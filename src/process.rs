//! Variant generation: the full build-time run.
//!
//! Discovers source images under the public root, writes WebP renditions
//! for each into the output directory, and records the result in the
//! manifest.
//!
//! ## Output Structure
//!
//! The output tree mirrors the source tree:
//!
//! ```text
//! public/
//! ├── lebob.png
//! ├── media/events/party.jpg
//! └── _img/                                   # cleared on every run
//!     ├── lebob-5f1c9e02-64.webp
//!     ├── ...
//!     └── media/events/
//!         ├── party-a07c33d1-64.webp
//!         └── ...
//! ```
//!
//! When the default output directory cannot be cleared or created because
//! of permissions (a root-owned `_img` left by a container build), the run
//! switches to `_img-<user>` and says so once. Any other failure aborts.
//!
//! ## Per-image failures
//!
//! A source that cannot be decoded is reported and left out of the
//! manifest. Failing to write a rendition is an environment problem and
//! aborts the run.
//!
//! ## Parallel Processing
//!
//! Sources are processed in parallel with [rayon](https://docs.rs/rayon).
//! Results are merged into an ordered map, so the manifest is identical no
//! matter the completion order.

use crate::config::{ConfigError, SiteConfig};
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, ResponsiveConfig, RustBackend, create_variants,
    get_dimensions, variant_widths,
};
use crate::manifest::{Manifest, ManifestError, VariantEntry, VariantImage};
use crate::naming;
use crate::scan::{self, ScanError};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Source scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Cannot prepare output directory {path} (also tried after {default}): {source}")]
    OutputDir {
        default: PathBuf,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Path is outside the public root: {0}")]
    OutsidePublicRoot(PathBuf),
}

/// Progress events emitted during a run, consumed by the CLI printer.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// Source discovery finished.
    SourcesFound { count: usize },
    /// The default output directory was unusable; variants go to `chosen`.
    OutputFallback { default: PathBuf, chosen: PathBuf },
    ImageProcessed {
        /// 1-based position in the sorted source list.
        index: usize,
        key: String,
        /// Forward-slash path relative to the public root.
        source_path: String,
        natural: Dimensions,
        widths: Vec<u32>,
    },
    ImageSkipped { source_path: String, reason: String },
}

/// Where variants are written for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    pub path: PathBuf,
    pub used_fallback: bool,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct ProcessResult {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    pub output_dir: OutputDir,
    pub skipped: usize,
}

/// `_img` → `_img-<tag>`.
pub fn fallback_dir_name(name: &str, user_tag: &str) -> String {
    format!("{name}-{user_tag}")
}

/// Both output trees a run may write to. They hold earlier variants, never
/// sources, so discovery skips them.
fn output_candidates(public_root: &Path, name: &str, user_tag: &str) -> [PathBuf; 2] {
    [
        public_root.join(name),
        public_root.join(fallback_dir_name(name, user_tag)),
    ]
}

/// Remove whatever sits at `dir` (a directory tree, a file or a symlink),
/// then create it as an empty directory.
pub fn clear_and_create(dir: &Path) -> io::Result<()> {
    match std::fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(dir)?,
        Ok(_) => std::fs::remove_file(dir)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::fs::create_dir_all(dir)
}

/// Pick and prepare the output directory using `prepare`.
///
/// Tries `<public>/<name>` first. Only a permission error moves the run to
/// `<public>/<name>-<tag>`; the fallback gets one attempt.
pub fn resolve_output_dir_with(
    public_root: &Path,
    name: &str,
    user_tag: &str,
    prepare: impl Fn(&Path) -> io::Result<()>,
) -> Result<OutputDir, ProcessError> {
    let default = public_root.join(name);
    match prepare(&default) {
        Ok(()) => Ok(OutputDir {
            path: default,
            used_fallback: false,
        }),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            let fallback = public_root.join(fallback_dir_name(name, user_tag));
            match prepare(&fallback) {
                Ok(()) => Ok(OutputDir {
                    path: fallback,
                    used_fallback: true,
                }),
                Err(source) => Err(ProcessError::OutputDir {
                    default,
                    path: fallback,
                    source,
                }),
            }
        }
        Err(source) => Err(ProcessError::Io {
            path: default,
            source,
        }),
    }
}

/// Run the generator with the default image backend.
pub fn process(
    project_root: &Path,
    config: &SiteConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, project_root, config, &naming::user_tag(), events)
}

/// Run the generator with a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    project_root: &Path,
    config: &SiteConfig,
    user_tag: &str,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    process_with(backend, project_root, config, user_tag, clear_and_create, events)
}

fn process_with(
    backend: &impl ImageBackend,
    project_root: &Path,
    config: &SiteConfig,
    user_tag: &str,
    prepare: impl Fn(&Path) -> io::Result<()>,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let emit = |event: ProcessEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    let public_root = config.public_root(project_root);
    let output_name = &config.variants.output_dir;

    let exclude = output_candidates(&public_root, output_name, user_tag);
    let sources = scan::collect_sources(&public_root, &config.sources, &exclude)?;
    emit(ProcessEvent::SourcesFound {
        count: sources.len(),
    });

    let output_dir = resolve_output_dir_with(&public_root, output_name, user_tag, prepare)?;
    if output_dir.used_fallback {
        emit(ProcessEvent::OutputFallback {
            default: public_root.join(output_name),
            chosen: output_dir.path.clone(),
        });
    }

    let responsive = ResponsiveConfig::from_site_config(config);
    let outcomes = sources
        .par_iter()
        .enumerate()
        .map(|(i, source)| {
            let outcome =
                process_source(backend, &public_root, &output_dir.path, source, &responsive)?;
            match &outcome {
                SourceOutcome::Done {
                    key,
                    source_path,
                    entry,
                } => emit(ProcessEvent::ImageProcessed {
                    index: i + 1,
                    key: key.clone(),
                    source_path: source_path.clone(),
                    natural: Dimensions {
                        width: entry.width,
                        height: entry.height,
                    },
                    widths: entry.variants.iter().map(|v| v.width).collect(),
                }),
                SourceOutcome::Skipped {
                    source_path,
                    reason,
                } => emit(ProcessEvent::ImageSkipped {
                    source_path: source_path.clone(),
                    reason: reason.clone(),
                }),
            }
            Ok(outcome)
        })
        .collect::<Result<Vec<_>, ProcessError>>()?;

    let mut manifest = Manifest::new();
    let mut skipped = 0;
    for outcome in outcomes {
        match outcome {
            SourceOutcome::Done { key, entry, .. } => {
                manifest.insert(key, entry);
            }
            SourceOutcome::Skipped { .. } => skipped += 1,
        }
    }

    let manifest_path = config.manifest_file(project_root);
    manifest.save(&manifest_path)?;

    Ok(ProcessResult {
        manifest,
        manifest_path,
        output_dir,
        skipped,
    })
}

/// A discovered source and the widths a run would generate for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSource {
    pub key: String,
    pub source_path: String,
    /// `None` when the source cannot be decoded (a run would skip it).
    pub natural: Option<Dimensions>,
    pub widths: Vec<u32>,
}

/// Discover sources and plan their renditions without writing anything.
pub fn plan(project_root: &Path, config: &SiteConfig) -> Result<Vec<PlannedSource>, ProcessError> {
    plan_with_backend(&RustBackend::new(), project_root, config, &naming::user_tag())
}

pub fn plan_with_backend(
    backend: &impl ImageBackend,
    project_root: &Path,
    config: &SiteConfig,
    user_tag: &str,
) -> Result<Vec<PlannedSource>, ProcessError> {
    let public_root = config.public_root(project_root);
    let output_name = &config.variants.output_dir;
    let exclude = output_candidates(&public_root, output_name, user_tag);
    let sources = scan::collect_sources(&public_root, &config.sources, &exclude)?;

    sources
        .par_iter()
        .map(|source| {
            let relative = naming::relative_posix(&public_root, source)
                .ok_or_else(|| ProcessError::OutsidePublicRoot(source.clone()))?;
            let natural = get_dimensions(backend, source).ok();
            let widths = natural
                .map(|d| {
                    variant_widths(d.width, &config.variants.widths, config.variants.upscale_cap)
                })
                .unwrap_or_default();
            Ok(PlannedSource {
                key: naming::url_path(&relative),
                source_path: relative,
                natural,
                widths,
            })
        })
        .collect()
}

enum SourceOutcome {
    Done {
        key: String,
        source_path: String,
        entry: VariantEntry,
    },
    Skipped {
        source_path: String,
        reason: String,
    },
}

fn process_source(
    backend: &impl ImageBackend,
    public_root: &Path,
    output_root: &Path,
    source: &Path,
    config: &ResponsiveConfig,
) -> Result<SourceOutcome, ProcessError> {
    let relative = naming::relative_posix(public_root, source)
        .ok_or_else(|| ProcessError::OutsidePublicRoot(source.to_path_buf()))?;
    let skipped = |reason: String| SourceOutcome::Skipped {
        source_path: relative.clone(),
        reason,
    };

    let natural = match get_dimensions(backend, source) {
        Ok(d) => d,
        Err(e) => return Ok(skipped(e.to_string())),
    };

    let output_folder = match Path::new(&relative).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => output_root.join(parent),
        _ => output_root.to_path_buf(),
    };
    std::fs::create_dir_all(&output_folder).map_err(|source| ProcessError::Io {
        path: output_folder.clone(),
        source,
    })?;

    let generated =
        match create_variants(backend, source, &relative, &output_folder, natural, config) {
            Ok(v) => v,
            Err(BackendError::ProcessingFailed(reason)) => return Ok(skipped(reason)),
            Err(e) => return Err(e.into()),
        };

    let variants = generated
        .into_iter()
        .map(|v| {
            let src = naming::manifest_key(public_root, &v.path)
                .ok_or_else(|| ProcessError::OutsidePublicRoot(v.path.clone()))?;
            Ok(VariantImage {
                src,
                width: v.width,
                height: v.height,
            })
        })
        .collect::<Result<Vec<_>, ProcessError>>()?;

    Ok(SourceOutcome::Done {
        key: naming::url_path(&relative),
        source_path: relative,
        entry: VariantEntry {
            width: natural.width,
            height: natural.height,
            variants,
        },
    })
}
