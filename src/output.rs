//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every source leads with its manifest key, the identity pages use to look
//! it up. The file it came from is secondary context on an indented
//! `Source:` line.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Found 3 source images
//! 001 /lebob.png
//!     Source: lebob.png
//!     400x300 → 64, 96, 160, 240, 320, 400
//! 002 /media/party.jpg
//!     Source: media/party.jpg
//!     3000x2000 → 64, 96, ..., 2048
//! image variants: generated 2 entries in public/_img
//! Manifest: src/generated/image-variants.json
//! ```
//!
//! Skipped sources and the output-directory fallback go to stderr:
//!
//! ```text
//! image variants: skipped media/broken.jpg (decode failed: ...)
//! image variants: default output dir "_img" is not writable, using "_img-alice" instead
//! ```
//!
//! ## Check
//!
//! ```text
//! /lebob.png
//!     Source: lebob.png
//!     400x300 → 64, 96, 160, 240, 320, 400
//! /media/broken.jpg
//!     Source: media/broken.jpg
//!     unreadable, would be skipped
//!
//! 2 sources, 1 unreadable
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure: no I/O, no side effects.

use crate::imaging::Dimensions;
use crate::manifest::VariantImage;
use crate::process::{PlannedSource, ProcessEvent, ProcessResult};
use crate::select::VariantSelector;
use std::path::Path;

const PREFIX: &str = "image variants:";

fn size(d: Dimensions) -> String {
    format!("{}x{}", d.width, d.height)
}

fn width_list(widths: &[u32]) -> String {
    widths
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Forward-slash form of `path` relative to `root`, or the full path.
fn display_relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

// ============================================================================
// Generate
// ============================================================================

/// True for events that belong on stderr.
pub fn is_warning(event: &ProcessEvent) -> bool {
    matches!(
        event,
        ProcessEvent::ImageSkipped { .. } | ProcessEvent::OutputFallback { .. }
    )
}

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::SourcesFound { count } => {
            vec![format!("Found {} source images", count)]
        }
        ProcessEvent::OutputFallback { default, chosen } => vec![format!(
            "{} default output dir \"{}\" is not writable, using \"{}\" instead",
            PREFIX,
            dir_name(default),
            dir_name(chosen)
        )],
        ProcessEvent::ImageProcessed {
            index,
            key,
            source_path,
            natural,
            widths,
        } => vec![
            format!("{:03} {}", index, key),
            format!("    Source: {}", source_path),
            format!("    {} \u{2192} {}", size(*natural), width_list(widths)),
        ],
        ProcessEvent::ImageSkipped {
            source_path,
            reason,
        } => vec![format!("{} skipped {} ({})", PREFIX, source_path, reason)],
    }
}

/// Print one event, routing warnings to stderr.
pub fn print_process_event(event: &ProcessEvent) {
    let warning = is_warning(event);
    for line in format_process_event(event) {
        if warning {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Closing summary of a run.
pub fn format_summary(result: &ProcessResult, project_root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "{} generated {} entries in {}",
        PREFIX,
        result.manifest.len(),
        display_relative(project_root, &result.output_dir.path)
    )];
    if result.output_dir.used_fallback {
        lines.push(format!(
            "{} warning: variants were written to the fallback directory \"{}\"",
            PREFIX,
            dir_name(&result.output_dir.path)
        ));
    }
    if result.skipped > 0 {
        lines.push(format!("{} {} source(s) skipped", PREFIX, result.skipped));
    }
    lines.push(format!(
        "Manifest: {}",
        display_relative(project_root, &result.manifest_path)
    ));
    lines
}

pub fn print_summary(result: &ProcessResult, project_root: &Path) {
    for line in format_summary(result, project_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the dry-run plan for every discovered source.
pub fn format_check_output(planned: &[PlannedSource]) -> Vec<String> {
    let mut lines = Vec::new();
    for source in planned {
        lines.push(source.key.clone());
        lines.push(format!("    Source: {}", source.source_path));
        match source.natural {
            Some(natural) => lines.push(format!(
                "    {} \u{2192} {}",
                size(natural),
                width_list(&source.widths)
            )),
            None => lines.push("    unreadable, would be skipped".to_string()),
        }
    }

    let unreadable = planned.iter().filter(|p| p.natural.is_none()).count();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    if unreadable > 0 {
        lines.push(format!(
            "{} sources, {} unreadable",
            planned.len(),
            unreadable
        ));
    } else {
        lines.push(format!("{} sources", planned.len()));
    }
    lines
}

pub fn print_check_output(planned: &[PlannedSource]) {
    for line in format_check_output(planned) {
        println!("{}", line);
    }
}

// ============================================================================
// Lookups
// ============================================================================

fn variant_line(v: &VariantImage) -> String {
    format!("{:>5}w  {}x{}  {}", v.width, v.width, v.height, v.src)
}

/// Format every rendition recorded for `source`.
pub fn format_variant_list(selector: &VariantSelector, source: &str) -> Vec<String> {
    let Some(natural) = selector.dimensions(source) else {
        return vec![format!("{}: not in manifest", source)];
    };
    let mut lines = vec![format!("{} ({})", source, size(natural))];
    let variants = selector.variants(source);
    if variants.is_empty() {
        lines.push("    no variants".to_string());
    }
    lines.extend(variants.iter().map(|v| format!("    {}", variant_line(v))));
    lines
}

pub fn print_variant_list(selector: &VariantSelector, source: &str) {
    for line in format_variant_list(selector, source) {
        println!("{}", line);
    }
}

/// Format the rendition chosen for a display width.
pub fn format_pick(selector: &VariantSelector, source: &str, width: u32) -> Vec<String> {
    match selector.best_for_width(source, width) {
        Some(v) => vec![variant_line(v)],
        None => vec![format!("{}: no variants", source)],
    }
}

pub fn print_pick(selector: &VariantSelector, source: &str, width: u32) {
    for line in format_pick(selector, source, width) {
        println!("{}", line);
    }
}
