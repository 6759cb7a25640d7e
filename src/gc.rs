//! Asset garbage collection.
//!
//! ```text
//! current     = file names directly inside <output>/assets/
//! referenced  = base names of every internal asset reference found in
//!               content sources, rendered output (outside the store) and
//!               templates
//! deletable   = current − referenced
//! ```
//!
//! References are extracted with [`scan::reference_paths`]: image syntax, tag
//! `src`/`href` attributes and CSS `url()` values, in files ending in `.md`,
//! `.markdown`, `.html`, `.htm` or `.css`. External references and `data:`
//! URIs are ignored; query strings and fragments are dropped before taking the
//! base name.
//!
//! A dry run only reports the deletable set. A live run deletes each file on
//! its own; a failure is logged and the remaining deletions go ahead.
//!
//! Any error while reading the referenced set aborts the run before anything is
//! deleted. The collector assumes no build is writing to the store meanwhile.

use crate::assets::{is_data_uri, is_external};
use crate::config::SiteConfig;
use crate::naming::base_name_of_reference;
use crate::scan;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Extensions of files scanned for references.
pub const SCANNED_EXTENSIONS: &[&str] = &["md", "markdown", "html", "htm", "css"];

#[derive(Error, Debug)]
pub enum GcError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A file that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GcFailure {
    pub name: String,
    pub reason: String,
}

/// Result of a collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    pub dry_run: bool,
    /// Unreferenced store files, sorted.
    pub deletable: Vec<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<GcFailure>,
}

/// File names of the regular files directly inside `store`. A missing store
/// is empty.
pub fn current_assets(store: &Path) -> Result<BTreeSet<String>, GcError> {
    let entries = match fs::read_dir(store) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Base names of the internal asset references in `text`.
pub fn referenced_names(text: &str) -> impl Iterator<Item = &str> {
    scan::reference_paths(text)
        .into_iter()
        .filter(|path| !is_external(path) && !is_data_uri(path))
        .filter_map(|path| {
            let path = path.split(['?', '#']).next().unwrap_or(path);
            base_name_of_reference(path)
        })
}

/// Scanned files below `root`, skipping the `excluded` subtree. A missing
/// root yields nothing.
fn scanned_files(root: &Path, excluded: &Path) -> Result<Vec<PathBuf>, GcError> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.path() != excluded);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let scanned = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SCANNED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if scanned {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Union of referenced base names across every scanned file below `roots`.
/// Files inside `store` are not scanned: a stylesheet sitting in the store is
/// an asset, not a referrer.
pub fn referenced_assets(roots: &[&Path], store: &Path) -> Result<BTreeSet<String>, GcError> {
    let mut names = BTreeSet::new();
    for root in roots {
        for path in scanned_files(root, store)? {
            let bytes = fs::read(&path)?;
            let text = String::from_utf8_lossy(&bytes);
            names.extend(referenced_names(&text).map(str::to_string));
        }
    }
    Ok(names)
}

/// Compute the deletable set and, unless `dry_run`, delete it.
pub fn collect(config: &SiteConfig, dry_run: bool) -> Result<GcReport, GcError> {
    let store = config.asset_store();
    let current = current_assets(&store)?;
    let referenced = referenced_assets(
        &[
            config.content_folder.as_path(),
            config.output_folder.as_path(),
            config.templates_folder.as_path(),
        ],
        &store,
    )?;
    debug!(
        current = current.len(),
        referenced = referenced.len(),
        "scanned asset store"
    );

    let mut report = GcReport {
        dry_run,
        deletable: current.difference(&referenced).cloned().collect(),
        ..GcReport::default()
    };
    if dry_run {
        return Ok(report);
    }

    for name in &report.deletable {
        let path = store.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(asset = %name, "deleted unreferenced asset");
                report.deleted.push(name.clone());
            }
            Err(e) => {
                error!(asset = %name, error = %e, "failed to delete asset");
                report.failed.push(GcFailure {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}
