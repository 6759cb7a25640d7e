//! File naming inside the flat asset store.
//!
//! The store at `<output>/assets/` has no subdirectories. Every materialized
//! asset gets a single file name chosen by an [`AssetNaming`] strategy:
//!
//! - [`BaseName`] (default): the source file's own name. `posts/a/cover.png`
//!   and `posts/b/cover.png` both become `cover.png`, so the second one to be
//!   materialized overwrites the first. This is the long-standing behavior of
//!   the store and is kept as the default on purpose.
//! - [`ContentHash`]: a SHA-256 prefix of the file bytes plus the original
//!   extension, e.g. `3f2a9c0e41b7d5aa.png`. Distinct content never collides.
//!
//! The garbage collector only ever compares names found in references against
//! names found in the store, so it works unchanged with either strategy.

use crate::config::NamingScheme;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// Number of hex digits of the digest kept in content-hash names.
const HASH_LEN: usize = 16;

/// Chooses the store file name for a resolved source file.
pub trait AssetNaming {
    fn store_name(&self, source: &Path) -> io::Result<String>;
}

/// Keep the source file's base name.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseName;

impl AssetNaming for BaseName {
    fn store_name(&self, source: &Path) -> io::Result<String> {
        base_name(source).map(str::to_string).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no file name in {}", source.display()),
            )
        })
    }
}

/// Name files after a digest of their contents.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentHash;

impl AssetNaming for ContentHash {
    fn store_name(&self, source: &Path) -> io::Result<String> {
        let digest = hash_file(source)?;
        let stem = &digest[..HASH_LEN];
        Ok(match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{stem}.{}", ext.to_ascii_lowercase()),
            None => stem.to_string(),
        })
    }
}

/// Build the strategy selected in the config.
pub fn from_scheme(scheme: NamingScheme) -> Box<dyn AssetNaming> {
    match scheme {
        NamingScheme::BaseName => Box::new(BaseName),
        NamingScheme::ContentHash => Box::new(ContentHash),
    }
}

/// Last path component of a `/`- or `\`-separated reference.
///
/// Works on reference strings as written in documents, which may use either
/// separator regardless of platform.
pub fn base_name_of_reference(reference: &str) -> Option<&str> {
    reference
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

fn base_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}
