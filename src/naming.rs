//! Canonical keys and output file names.
//!
//! Every name the pipeline produces is derived from a source's path relative
//! to the public root, never from timestamps, so regenerating an unchanged
//! tree yields the same keys and file names.
//!
//! - Manifest key: `/media/Sub%20Folder/My%20Photo.JPG`. Each path segment
//!   is percent-encoded except ASCII alphanumerics and `-_.!~*'()`, then
//!   segments are joined with `/`. Case is preserved.
//! - Variant file: `my-photo-1a2b3c4d-640.webp`. Sanitized stem, the first
//!   8 hex chars of the SHA-1 of the relative path, the width.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::{Digest, Sha1};
use std::path::{Component, Path};

/// Everything except ASCII alphanumerics and `-_.!~*'()` is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Lowercase, collapse runs of non `[a-z0-9]` into `-`, trim dashes.
///
/// Returns `None` when nothing survives.
fn sanitize(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Sanitize a path segment or operator name, falling back to `local`.
pub fn sanitize_segment(value: &str) -> String {
    sanitize(value).unwrap_or_else(|| "local".to_string())
}

/// Relative path with forward slashes, e.g. `media/Sub Folder/x.jpg`.
///
/// Returns `None` if `path` is not under `root` or contains parent references.
pub fn relative_posix(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Percent-encode each segment of a forward-slash path and root it at `/`.
pub fn url_path(relative_posix: &str) -> String {
    let encoded: Vec<String> = relative_posix
        .split('/')
        .map(|segment| utf8_percent_encode(segment, URI_COMPONENT).to_string())
        .collect();
    format!("/{}", encoded.join("/"))
}

/// Canonical manifest key for a file under the public root.
pub fn manifest_key(public_root: &Path, path: &Path) -> Option<String> {
    relative_posix(public_root, path).map(|rel| url_path(&rel))
}

/// First 8 hex chars of the SHA-1 digest of the relative source path.
pub fn path_hash(relative_posix: &str) -> String {
    let digest = Sha1::digest(relative_posix.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(8);
    hex
}

/// Deterministic variant file name for a source and target width.
pub fn variant_file_name(relative_posix: &str, width: u32) -> String {
    let stem = Path::new(relative_posix)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let base = sanitize(&stem).unwrap_or_else(|| "image".to_string());
    format!("{}-{}-{}.webp", base, path_hash(relative_posix), width)
}

/// Tag identifying the operator, used to name the fallback output directory.
///
/// Checks `SUDO_USER`, `USER`, `LOGNAME` in that order via `lookup`, then
/// `uid-<n>` when the process uid is known, then `local`.
pub fn user_tag_from(lookup: impl Fn(&str) -> Option<String>, uid: Option<u32>) -> String {
    ["SUDO_USER", "USER", "LOGNAME"]
        .iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.is_empty())
        .map(|value| sanitize_segment(&value))
        .or_else(|| uid.map(|uid| format!("uid-{uid}")))
        .unwrap_or_else(|| "local".to_string())
}

/// Real uid of this process, read from the owner of `/proc/self`.
#[cfg(unix)]
fn current_uid() -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata("/proc/self").ok().map(|meta| meta.uid())
}

#[cfg(not(unix))]
fn current_uid() -> Option<u32> {
    None
}

/// [`user_tag_from`] over the process environment.
pub fn user_tag() -> String {
    user_tag_from(|var| std::env::var(var).ok(), current_uid())
}
