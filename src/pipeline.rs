//! Per-document transformation.
//!
//! ```text
//! raw text ─ frontmatter::parse ─▶ body ─ scan::tokenize ─▶ spans
//!
//!   Asset  ─▶ Materializer      (path replaced by the public URL)
//!   Link   ─▶ rewrite_target    (target replaced by the published URL)
//!   Embed  ─▶ EmbedMatch::render
//!   Text   ─▶ unchanged
//!
//! spans ─ concat ─▶ text ─ append_widget_script ─▶ ProcessedDocument
//! ```
//!
//! Each span is classified once and handed to exactly one transformer, so a
//! URL inside link syntax is never embedded and rewritten text is never
//! scanned again. The widget script is appended last, once, when the document
//! produced at least one status embed.
//!
//! Processing the same unchanged document twice yields identical text, and the
//! second run writes nothing to the asset store.

use crate::assets::{AssetKind, AssetReference, Materializer, is_data_uri};
use crate::config::SiteConfig;
use crate::embed::append_widget_script;
use crate::frontmatter::{self, FrontMatter};
use crate::imaging::ImageOptimizer;
use crate::links::rewrite_target;
use crate::naming::AssetNaming;
use crate::scan::{Span, tokenize};
use crate::types::{AssetRecord, DocumentReport};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source document as read from disk (or stdin).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDocument {
    pub source_path: PathBuf,
    pub text: String,
}

impl ContentDocument {
    pub fn new(source_path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            text: text.into(),
        }
    }

    pub fn read(path: &Path) -> io::Result<Self> {
        Ok(Self::new(path, fs::read_to_string(path)?))
    }

    /// Directory relative references resolve against.
    pub fn directory(&self) -> &Path {
        self.source_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    /// File stem, used as the published page name.
    pub fn stem(&self) -> Option<&str> {
        self.source_path.file_stem().and_then(|s| s.to_str())
    }
}

/// Output of [`Pipeline::process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub front_matter: FrontMatter,
    /// Raw header block, kept so `process` can re-emit it.
    pub header: Option<String>,
    /// Transformed body, ready for Markdown rendering.
    pub text: String,
    /// Public path of the first in-body image that was rewritten.
    pub first_image: Option<String>,
    pub report: DocumentReport,
}

impl ProcessedDocument {
    /// Transformed body with the original header block in front of it.
    pub fn with_header(&self) -> String {
        match &self.header {
            Some(header) => format!("{header}{}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Runs documents through front matter, asset, link and embed handling.
pub struct Pipeline<'a> {
    config: &'a SiteConfig,
    materializer: Materializer<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a SiteConfig,
        optimizer: &'a dyn ImageOptimizer,
        naming: &'a dyn AssetNaming,
    ) -> Self {
        Self {
            config,
            materializer: Materializer::new(config, optimizer, naming),
        }
    }

    pub fn process(&self, document: &ContentDocument) -> ProcessedDocument {
        let parsed = frontmatter::parse(&document.text);
        let document_dir = document.directory();
        let mut report = DocumentReport::new(&document.source_path);
        let mut first_image = None;
        let mut out = String::with_capacity(parsed.body.len());

        for span in tokenize(parsed.body) {
            match span {
                Span::Text(text) => out.push_str(text),
                Span::Asset { span, .. } => {
                    let path = span.path();
                    if path.is_empty() || is_data_uri(path) {
                        out.push_str(span.raw);
                        continue;
                    }
                    let reference =
                        AssetReference::new(path, document_dir, &self.config.content_folder);
                    let outcome = self.materializer.materialize(&reference);
                    match outcome.public_path() {
                        Some(public_path) => {
                            if first_image.is_none() && reference.kind == AssetKind::Image {
                                first_image = Some(public_path.to_string());
                            }
                            out.push_str(&span.with_path(public_path));
                        }
                        None => out.push_str(span.raw),
                    }
                    if !reference.is_external() {
                        report.assets.push(AssetRecord {
                            reference: reference.original_path,
                            kind: reference.kind,
                            outcome,
                        });
                    }
                }
                Span::Link(link) => match rewrite_target(link.path(), &self.config.site_url) {
                    Some(url) => {
                        report.links_rewritten += 1;
                        out.push_str(&link.with_path(&url));
                    }
                    None => out.push_str(link.raw),
                },
                Span::Embed { embed, .. } => {
                    if embed.is_status() {
                        report.statuses += 1;
                    } else {
                        report.videos += 1;
                    }
                    out.push_str(&embed.render().into_string());
                }
            }
        }

        debug!(
            document = %document.source_path.display(),
            assets = report.assets.len(),
            links = report.links_rewritten,
            embeds = report.videos + report.statuses,
            "processed document"
        );

        ProcessedDocument {
            front_matter: parsed.front_matter,
            header: parsed.header.map(str::to_string),
            text: append_widget_script(out, report.statuses),
            first_image,
            report,
        }
    }
}
