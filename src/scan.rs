//! Source image discovery.
//!
//! Walks the configured source directories under the public root, adds the
//! individually named source files, keeps recognized raster extensions, and
//! returns a sorted, de-duplicated list of paths.
//!
//! ## Missing vs. broken
//!
//! - A source directory or named file that does not exist contributes
//!   nothing. Content authors add and remove folders between builds.
//! - A named path that exists but is not a regular file is ignored.
//! - Any other I/O error (permissions, a source "directory" that is a file)
//!   aborts the scan; there is no partial result.

use crate::config::SourcesConfig;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// `Ok(None)` when `path` does not exist.
fn stat(path: &Path) -> Result<Option<std::fs::Metadata>, ScanError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ScanError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Every file under `dir`, recursively, skipping the `exclude` subtrees.
fn walk_dir(dir: &Path, exclude: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let Some(meta) = stat(dir)? else {
        return Ok(Vec::new());
    };
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| !exclude.iter().any(|x| entry.path() == x));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Collect source images under `public_root`.
///
/// `exclude` lists directories never to descend into (the output
/// directories, so earlier variants are not mistaken for sources).
pub fn collect_sources(
    public_root: &Path,
    sources: &SourcesConfig,
    exclude: &[PathBuf],
) -> Result<Vec<PathBuf>, ScanError> {
    let mut images = Vec::new();

    for dir in &sources.dirs {
        let files = walk_dir(&public_root.join(dir), exclude)?;
        images.extend(files.into_iter().filter(|f| sources.accepts(f)));
    }

    for file in &sources.files {
        let path = public_root.join(file);
        match stat(&path)? {
            Some(meta) if meta.is_file() && sources.accepts(&path) => images.push(path),
            _ => {}
        }
    }

    images.sort();
    images.dedup();
    Ok(images)
}
