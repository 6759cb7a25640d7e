//! Shared types produced by the pipeline and consumed by the assembler, the
//! CLI output and the JSON build report.

use crate::assets::{AssetKind, AssetOutcome};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One asset reference and what materializing it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    /// The path as written in the document.
    pub reference: String,
    pub kind: AssetKind,
    #[serde(flatten)]
    pub outcome: AssetOutcome,
}

/// Everything the pipeline did to one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    /// Internal asset references in order of appearance.
    pub assets: Vec<AssetRecord>,
    pub links_rewritten: usize,
    pub videos: usize,
    pub statuses: usize,
}

impl DocumentReport {
    pub fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            ..Self::default()
        }
    }

    /// Asset references left unrewritten.
    pub fn failures(&self) -> impl Iterator<Item = &AssetRecord> {
        self.assets.iter().filter(|a| a.outcome.is_failure())
    }
}

/// Aggregated outcome counts across a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssetTotals {
    pub optimized: usize,
    pub copied: usize,
    pub fallback_copied: usize,
    pub fresh: usize,
    pub missing: usize,
    pub copy_failed: usize,
}

impl AssetTotals {
    fn add(&mut self, outcome: &AssetOutcome) {
        match outcome {
            AssetOutcome::Optimized { .. } => self.optimized += 1,
            AssetOutcome::Copied { .. } => self.copied += 1,
            AssetOutcome::FallbackCopied { .. } => self.fallback_copied += 1,
            AssetOutcome::Fresh { .. } => self.fresh += 1,
            AssetOutcome::MissingSource { .. } => self.missing += 1,
            AssetOutcome::CopyFailed { .. } => self.copy_failed += 1,
            AssetOutcome::External => {}
        }
    }

    pub fn written(&self) -> usize {
        self.optimized + self.copied + self.fallback_copied
    }

    pub fn failed(&self) -> usize {
        self.missing + self.copy_failed
    }
}

/// Per-document reports for one build, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub documents: Vec<DocumentReport>,
    /// Published pages written, relative to the output folder.
    pub pages: Vec<String>,
}

impl BuildReport {
    pub fn push(&mut self, report: DocumentReport) {
        self.documents.push(report);
    }

    pub fn totals(&self) -> AssetTotals {
        let mut totals = AssetTotals::default();
        for record in self.documents.iter().flat_map(|d| &d.assets) {
            totals.add(&record.outcome);
        }
        totals
    }
}

/// A listed post on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub title: String,
    /// Published URL of the post.
    pub link: String,
    pub preview_image: Option<String>,
    /// Inner HTML of the first rendered paragraph.
    pub excerpt: Option<String>,
}
