//! Variant lookups for page rendering.
//!
//! A [`VariantSelector`] wraps a loaded manifest and answers "which
//! rendition fits this display width" without touching the filesystem.
//! Sources are looked up by their canonical key, exactly as written by the
//! generator (`/media/Sub%20Folder/My%20Photo.JPG`). Unknown sources are
//! not an error: pages fall back to the original asset.

use crate::imaging::Dimensions;
use crate::manifest::{Manifest, ManifestError, VariantEntry, VariantImage};
use std::path::Path;

/// Read-only view over a manifest.
///
/// Variants are sorted ascending by width once, at construction.
#[derive(Debug, Clone, Default)]
pub struct VariantSelector {
    manifest: Manifest,
}

impl VariantSelector {
    pub fn new(mut manifest: Manifest) -> Self {
        for entry in manifest.entries_mut() {
            entry.variants.sort_by_key(|v| v.width);
        }
        Self { manifest }
    }

    /// Load the manifest file once.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        Ok(Self::new(Manifest::load(path)?))
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn entry(&self, source: &str) -> Option<&VariantEntry> {
        self.manifest.get(source)
    }

    /// Natural size of the source, if it was processed.
    pub fn dimensions(&self, source: &str) -> Option<Dimensions> {
        self.entry(source).map(|e| Dimensions {
            width: e.width,
            height: e.height,
        })
    }

    /// All renditions, ascending by width; empty for unknown sources.
    pub fn variants(&self, source: &str) -> &[VariantImage] {
        self.entry(source)
            .map(|e| e.variants.as_slice())
            .unwrap_or_default()
    }

    /// The widest rendition not wider than `target`, or the narrowest one
    /// when every rendition is wider.
    ///
    /// ```
    /// use site_variants::manifest::{Manifest, VariantEntry, VariantImage};
    /// use site_variants::select::VariantSelector;
    ///
    /// let mut manifest = Manifest::new();
    /// let variants = [64, 320, 640]
    ///     .map(|w| VariantImage { src: format!("/_img/a-{w}.webp"), width: w, height: w });
    /// manifest.insert(
    ///     "/a.png".into(),
    ///     VariantEntry { width: 640, height: 640, variants: variants.to_vec() },
    /// );
    /// let selector = VariantSelector::new(manifest);
    ///
    /// assert_eq!(selector.best_for_width("/a.png", 500).unwrap().width, 320);
    /// assert_eq!(selector.best_for_width("/a.png", 10).unwrap().width, 64);
    /// assert!(selector.best_for_width("/missing.png", 500).is_none());
    /// ```
    pub fn best_for_width(&self, source: &str, target: u32) -> Option<&VariantImage> {
        let variants = self.variants(source);
        variants
            .iter()
            .rev()
            .find(|v| v.width <= target)
            .or_else(|| variants.first())
    }

    /// `srcset` attribute value: `"<src> <w>w, ..."`.
    pub fn srcset(&self, source: &str) -> Option<String> {
        self.srcset_with(source, str::to_string)
    }

    /// [`srcset`](Self::srcset) with every rendition URL passed through `url`.
    pub fn srcset_with(&self, source: &str, url: impl Fn(&str) -> String) -> Option<String> {
        let variants = self.variants(source);
        if variants.is_empty() {
            return None;
        }
        Some(
            variants
                .iter()
                .map(|v| format!("{} {}w", url(&v.src), v.width))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(width: u32) -> VariantImage {
        VariantImage {
            src: format!("/_img/media/a-00000000-{width}.webp"),
            width,
            height: width / 2,
        }
    }

    fn selector_with(widths: &[u32]) -> VariantSelector {
        let mut manifest = Manifest::new();
        manifest.insert(
            "/media/a.jpg".to_string(),
            VariantEntry {
                width: 3000,
                height: 1500,
                variants: widths.iter().map(|w| variant(*w)).collect(),
            },
        );
        VariantSelector::new(manifest)
    }

    fn widths(selector: &VariantSelector) -> Vec<u32> {
        selector
            .variants("/media/a.jpg")
            .iter()
            .map(|v| v.width)
            .collect()
    }

    #[test]
    fn variants_are_sorted_on_construction() {
        let selector = selector_with(&[640, 64, 320]);
        assert_eq!(widths(&selector), vec![64, 320, 640]);
    }

    #[test]
    fn unknown_source_is_empty() {
        let selector = selector_with(&[64]);
        assert!(selector.variants("/media/unknown.jpg").is_empty());
        assert!(selector.dimensions("/media/unknown.jpg").is_none());
        assert!(selector.entry("/media/unknown.jpg").is_none());
        assert!(selector.srcset("/media/unknown.jpg").is_none());
    }

    #[test]
    fn lookup_is_exact_on_canonical_key() {
        let selector = selector_with(&[64]);
        assert!(selector.entry("media/a.jpg").is_none());
        assert!(selector.entry("/media/A.jpg").is_none());
    }

    #[test]
    fn dimensions_are_natural_size() {
        let selector = selector_with(&[64]);
        assert_eq!(
            selector.dimensions("/media/a.jpg"),
            Some(Dimensions {
                width: 3000,
                height: 1500
            })
        );
    }

    #[test]
    fn best_for_width_picks_largest_fitting() {
        let selector = selector_with(&[64, 96, 160, 240, 320, 480, 640]);
        let pick = |t| selector.best_for_width("/media/a.jpg", t).unwrap().width;
        assert_eq!(pick(400), 320);
        assert_eq!(pick(480), 480);
        assert_eq!(pick(5000), 640);
        assert_eq!(pick(63), 64);
        assert_eq!(pick(0), 64);
    }

    #[test]
    fn single_variant_is_always_returned() {
        let selector = selector_with(&[240]);
        assert_eq!(selector.best_for_width("/media/a.jpg", 1).unwrap().width, 240);
        assert_eq!(selector.best_for_width("/media/a.jpg", 9999).unwrap().width, 240);
    }

    #[test]
    fn entry_without_variants_has_no_pick() {
        let selector = selector_with(&[]);
        assert!(selector.best_for_width("/media/a.jpg", 100).is_none());
        assert!(selector.dimensions("/media/a.jpg").is_some());
    }

    #[test]
    fn srcset_lists_ascending_widths() {
        let selector = selector_with(&[96, 64]);
        assert_eq!(
            selector.srcset("/media/a.jpg").unwrap(),
            "/_img/media/a-00000000-64.webp 64w, /_img/media/a-00000000-96.webp 96w"
        );
    }

    #[test]
    fn srcset_with_rewrites_each_url() {
        let selector = selector_with(&[64, 96]);
        assert_eq!(
            selector
                .srcset_with("/media/a.jpg", |src| format!("https://cdn.test{src}"))
                .unwrap(),
            "https://cdn.test/_img/media/a-00000000-64.webp 64w, \
             https://cdn.test/_img/media/a-00000000-96.webp 96w"
        );
        assert!(selector.srcset_with("/nope.jpg", str::to_string).is_none());
    }

    #[test]
    fn load_reads_generated_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("image-variants.json");
        selector_with(&[64, 96]).manifest().save(&path).unwrap();

        let selector = VariantSelector::load(&path).unwrap();
        assert_eq!(widths(&selector), vec![64, 96]);
    }
}
