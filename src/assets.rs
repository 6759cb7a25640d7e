//! Asset resolution and materialization.
//!
//! Every asset reference found in a document goes through three steps:
//!
//! 1. **Classify**: paths starting with `http://`, `https://`, `//`, `mailto:`
//!    or `tel:` are external and never touched.
//! 2. **Resolve**: `/img/a.png` is looked up below the content root, anything
//!    else relative to the referencing document's directory.
//! 3. **Materialize**: the source is re-encoded (raster images) or copied
//!    (everything else) into the flat store at `<output>/assets/`, and the
//!    reference is rewritten to `<site_url>/assets/<name>`.
//!
//! ## Freshness
//!
//! A destination is (re)written only when it is missing or the source's
//! modification time is strictly newer than the destination's. Rebuilding an
//! unchanged site therefore writes nothing. The check is not atomic and
//! assumes a single build process per output directory.
//!
//! ## Failures
//!
//! Nothing here returns an error. Each reference yields an [`AssetOutcome`];
//! failures are logged where they happen and the caller keeps the original
//! reference text:
//!
//! | Situation | Outcome | Reference |
//! |---|---|---|
//! | source missing | [`AssetOutcome::MissingSource`] | unchanged |
//! | optimizer fails | [`AssetOutcome::FallbackCopied`] | rewritten |
//! | copy fails | [`AssetOutcome::CopyFailed`] | unchanged |
//!
//! Files are written to a `.staging-<name>` sibling and renamed into place.
//! A failed write never leaves a truncated file at the destination.

use crate::config::{ASSET_DIR, SiteConfig};
use crate::imaging::{ImageOptimizer, Quality, is_raster_extension, optimize_image};
use crate::links::site_path;
use crate::naming::AssetNaming;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Prefixes that mark a reference as external.
pub const EXTERNAL_PREFIXES: &[&str] = &["http://", "https://", "//", "mailto:", "tel:"];

/// Prefix of the temporary sibling a store file is written to.
const STAGING_PREFIX: &str = ".staging-";

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "ogv", "mov", "m4v"];

/// Whether `path` points outside the site.
pub fn is_external(path: &str) -> bool {
    let lower = path.trim_start().to_ascii_lowercase();
    EXTERNAL_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Whether `path` is an inline `data:` URI.
pub fn is_data_uri(path: &str) -> bool {
    path.trim_start()
        .get(..5)
        .is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

/// Broad media category of an asset, from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Generic,
}

impl AssetKind {
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if is_raster_extension(path) || ext == "svg" {
            AssetKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            AssetKind::Video
        } else {
            AssetKind::Generic
        }
    }
}

/// An asset reference as written in a document, classified and resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub original_path: String,
    pub kind: AssetKind,
    /// Absolute (or content-root based) source location. `None` for external
    /// references.
    pub resolved_source: Option<PathBuf>,
}

impl AssetReference {
    /// Classify `original` as written in the document at `document_dir`.
    pub fn new(original: &str, document_dir: &Path, content_root: &Path) -> Self {
        let resolved_source = if is_external(original) {
            None
        } else {
            Some(resolve_source(original, document_dir, content_root))
        };
        Self {
            original_path: original.to_string(),
            kind: AssetKind::of(Path::new(original)),
            resolved_source,
        }
    }

    pub fn is_external(&self) -> bool {
        self.resolved_source.is_none()
    }
}

/// Resolve an internal reference to a source file location.
///
/// `/img/a.png` (or `\img\a.png`) resolves below `content_root`; any other
/// path resolves relative to `document_dir`.
pub fn resolve_source(original: &str, document_dir: &Path, content_root: &Path) -> PathBuf {
    let trimmed = original.trim_start_matches(['/', '\\']);
    if trimmed.len() != original.len() {
        content_root.join(trimmed)
    } else {
        document_dir.join(original)
    }
}

/// What happened to one asset reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum AssetOutcome {
    /// Re-encoded into the store.
    Optimized { public_path: String },
    /// Copied verbatim into the store.
    Copied { public_path: String },
    /// Optimization failed; the source was copied verbatim instead.
    FallbackCopied { public_path: String },
    /// The store already holds an up-to-date copy; nothing was written.
    Fresh { public_path: String },
    /// External reference, left alone.
    External,
    /// The source file does not exist; the reference was left unrewritten.
    MissingSource { source: PathBuf },
    /// Writing into the store failed; the reference was left unrewritten.
    CopyFailed { source: PathBuf, reason: String },
}

impl AssetOutcome {
    /// The rewritten URL, if the reference should be rewritten.
    pub fn public_path(&self) -> Option<&str> {
        match self {
            Self::Optimized { public_path }
            | Self::Copied { public_path }
            | Self::FallbackCopied { public_path }
            | Self::Fresh { public_path } => Some(public_path),
            Self::External | Self::MissingSource { .. } | Self::CopyFailed { .. } => None,
        }
    }

    /// Whether this outcome wrote a file into the store.
    pub fn wrote(&self) -> bool {
        matches!(
            self,
            Self::Optimized { .. } | Self::Copied { .. } | Self::FallbackCopied { .. }
        )
    }

    /// Whether this outcome leaves a broken reference behind.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::MissingSource { .. } | Self::CopyFailed { .. })
    }
}

/// Materializes resolved sources into the asset store.
pub struct Materializer<'a> {
    config: &'a SiteConfig,
    optimizer: &'a dyn ImageOptimizer,
    naming: &'a dyn AssetNaming,
}

impl<'a> Materializer<'a> {
    pub fn new(
        config: &'a SiteConfig,
        optimizer: &'a dyn ImageOptimizer,
        naming: &'a dyn AssetNaming,
    ) -> Self {
        Self {
            config,
            optimizer,
            naming,
        }
    }

    /// Materialize one reference and report what happened.
    pub fn materialize(&self, reference: &AssetReference) -> AssetOutcome {
        let Some(source) = reference.resolved_source.as_deref() else {
            return AssetOutcome::External;
        };
        if !source.is_file() {
            warn!(
                reference = %reference.original_path,
                source = %source.display(),
                "source asset not found"
            );
            return AssetOutcome::MissingSource {
                source: source.to_path_buf(),
            };
        }

        match self.store(source) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(source = %source.display(), error = %e, "failed to copy asset");
                AssetOutcome::CopyFailed {
                    source: source.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn store(&self, source: &Path) -> io::Result<AssetOutcome> {
        let name = self.naming.store_name(source)?;
        let store = self.config.asset_store();
        let destination = store.join(&name);
        let public_path = site_path(&self.config.site_url, &format!("{ASSET_DIR}/{name}"));

        if !needs_materialization(source, &destination)? {
            debug!(asset = %name, "asset is up to date");
            return Ok(AssetOutcome::Fresh { public_path });
        }

        fs::create_dir_all(&store)?;
        // The destination is only ever replaced by a complete file.
        let staging = store.join(format!("{STAGING_PREFIX}{name}"));
        let written = self
            .write(source, &staging, &name, public_path)
            .and_then(|outcome| fs::rename(&staging, &destination).map(|()| outcome));
        if written.is_err()
            && staging.exists()
            && let Err(e) = fs::remove_file(&staging)
        {
            debug!(path = %staging.display(), error = %e, "could not remove staging file");
        }
        written
    }

    /// Optimize or copy `source` into `target`.
    fn write(
        &self,
        source: &Path,
        target: &Path,
        name: &str,
        public_path: String,
    ) -> io::Result<AssetOutcome> {
        if is_raster_extension(source) {
            let quality = Quality::new(self.config.images.quality);
            if optimize_image(self.optimizer, source, target, quality) {
                return Ok(AssetOutcome::Optimized { public_path });
            }
            warn!(asset = %name, "falling back to a plain copy");
            fs::copy(source, target)?;
            return Ok(AssetOutcome::FallbackCopied { public_path });
        }

        fs::copy(source, target)?;
        debug!(asset = %name, "copied asset");
        Ok(AssetOutcome::Copied { public_path })
    }
}

/// Whether `destination` must be (re)written from `source`: it is missing, or
/// the source was modified strictly after it.
pub fn needs_materialization(source: &Path, destination: &Path) -> io::Result<bool> {
    let destination_modified = match fs::metadata(destination) {
        Ok(meta) => meta.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    let source_modified: SystemTime = fs::metadata(source)?.modified()?;
    Ok(source_modified > destination_modified)
}
