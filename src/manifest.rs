//! The variant manifest: the only artifact shared by generator and selector.
//!
//! ```json
//! {
//!   "/media/Sub%20Folder/My%20Photo.JPG": {
//!     "width": 3000,
//!     "height": 2000,
//!     "variants": [
//!       { "src": "/_img/media/Sub%20Folder/my-photo-1a2b3c4d-64.webp", "width": 64, "height": 43 },
//!       ...
//!     ]
//!   }
//! }
//! ```
//!
//! Keys are canonical URL paths rooted at the public root. Variants are
//! ascending by width, unique per width, never wider than the source.
//! Entries are kept in a `BTreeMap`, so serialization order is stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One rendition of a source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantImage {
    pub src: String,
    pub width: u32,
    pub height: u32,
}

/// A source image's natural size and its renditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEntry {
    pub width: u32,
    pub height: u32,
    pub variants: Vec<VariantImage>,
}

/// Canonical source key → entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, VariantEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous one under the same key.
    pub fn insert(&mut self, key: String, entry: VariantEntry) -> Option<VariantEntry> {
        self.entries.insert(key, entry)
    }

    pub fn get(&self, key: &str) -> Option<&VariantEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VariantEntry)> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut VariantEntry> {
        self.entries.values_mut()
    }

    /// Pretty JSON with two-space indent and a trailing newline.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Write the manifest, replacing any existing file only once the new
    /// content is fully on disk.
    ///
    /// Writes to a sibling `*.tmp` file and renames it into place. Parent
    /// directories are created as needed.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ManifestError::Io { path, source }
        };

        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, json).map_err(io_err(&tmp_path))?;
        std::fs::rename(&tmp_path, path).map_err(io_err(path))?;
        Ok(())
    }
}
