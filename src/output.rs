//! CLI output formatting for builds and garbage collection.
//!
//! # Information-First Display
//!
//! Output is organised around documents and the references inside them, with
//! filesystem paths as secondary context. Every document follows the same
//! two-level pattern:
//!
//! 1. **Header line**: positional index + source path
//! 2. **Context lines**: one indented line per asset reference and a counts line
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Documents
//! 001 content/hello.md
//!     img/cat.png → /assets/cat.png (optimized)
//!     img/ghost.png: missing source
//!     1 link, 1 video, 0 status embeds
//!
//! Pages
//!     index.html
//!     hello.html
//!
//! Assets: 1 written, 0 up to date, 1 failed
//! ```
//!
//! ## Garbage collection
//!
//! ```text
//! Unreferenced assets (dry run)
//!     b.png
//!     c.png
//! 2 assets would be deleted
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::assets::AssetOutcome;
use crate::gc::GcReport;
use crate::types::{AssetRecord, BuildReport, DocumentReport};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// Path relative to `root` when it lives below it.
fn display_path(path: &Path, root: Option<&Path>) -> String {
    root.and_then(|r| path.strip_prefix(r).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// One line per asset reference.
///
/// ```text
/// img/cat.png → /assets/cat.png (optimized)
/// img/ghost.png: missing source
/// ```
fn asset_line(record: &AssetRecord) -> String {
    let reference = &record.reference;
    match &record.outcome {
        AssetOutcome::Optimized { public_path } => format!("{reference} → {public_path} (optimized)"),
        AssetOutcome::Copied { public_path } => format!("{reference} → {public_path} (copied)"),
        AssetOutcome::FallbackCopied { public_path } => {
            format!("{reference} → {public_path} (copied, optimization failed)")
        }
        AssetOutcome::Fresh { public_path } => format!("{reference} → {public_path} (up to date)"),
        AssetOutcome::External => format!("{reference}: external"),
        AssetOutcome::MissingSource { .. } => format!("{reference}: missing source"),
        AssetOutcome::CopyFailed { reason, .. } => format!("{reference}: copy failed ({reason})"),
    }
}

// ============================================================================
// Build
// ============================================================================

/// Lines for one processed document.
pub fn format_document_report(
    index: usize,
    report: &DocumentReport,
    root: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}",
        format_index(index),
        display_path(&report.source, root)
    )];
    for record in &report.assets {
        lines.push(format!("{}{}", indent(1), asset_line(record)));
    }
    lines.push(format!(
        "{}{}, {}, {}",
        indent(1),
        plural(report.links_rewritten, "link", "links"),
        plural(report.videos, "video", "videos"),
        plural(report.statuses, "status embed", "status embeds"),
    ));
    lines
}

pub fn format_build_report(report: &BuildReport, root: Option<&Path>) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.documents.is_empty() {
        lines.push("Documents".to_string());
        for (i, doc) in report.documents.iter().enumerate() {
            lines.extend(format_document_report(i + 1, doc, root));
        }
        lines.push(String::new());
    }
    if !report.pages.is_empty() {
        lines.push("Pages".to_string());
        for page in &report.pages {
            lines.push(format!("{}{}", indent(1), page));
        }
        lines.push(String::new());
    }
    let totals = report.totals();
    lines.push(format!(
        "Assets: {} written, {} up to date, {} failed",
        totals.written(),
        totals.fresh,
        totals.failed()
    ));
    lines
}

pub fn print_build_report(report: &BuildReport, root: Option<&Path>) {
    for line in format_build_report(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Garbage collection
// ============================================================================

pub fn format_gc_report(report: &GcReport) -> Vec<String> {
    if report.deletable.is_empty() {
        return vec!["No unreferenced assets".to_string()];
    }

    let mut lines = Vec::new();
    if report.dry_run {
        lines.push("Unreferenced assets (dry run)".to_string());
        for name in &report.deletable {
            lines.push(format!("{}{}", indent(1), name));
        }
        lines.push(format!(
            "{} would be deleted",
            plural(report.deletable.len(), "asset", "assets")
        ));
        return lines;
    }

    lines.push("Deleted".to_string());
    for name in &report.deleted {
        lines.push(format!("{}{}", indent(1), name));
    }
    if !report.failed.is_empty() {
        lines.push("Failed".to_string());
        for failure in &report.failed {
            lines.push(format!("{}{}: {}", indent(1), failure.name, failure.reason));
        }
    }
    lines.push(format!(
        "{} deleted, {} failed",
        plural(report.deleted.len(), "asset", "assets"),
        report.failed.len()
    ));
    lines
}

pub fn print_gc_report(report: &GcReport) {
    for line in format_gc_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
