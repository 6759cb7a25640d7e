//! Shared test utilities for the mdpress test suite.
//!
//! Provides a throwaway site layout with a config pointing into it, plus
//! helpers for writing sources, reading outputs, pinning modification times
//! and capturing log output.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new().with_site_url("/blog");
//! site.write("content/img/cat.png", b"...");
//! site.write("content/post.md", b"![cat](img/cat.png)");
//!
//! let reference = site.reference("img/cat.png");
//! assert_eq!(site.read("content/img/cat.png"), b"...");
//! ```

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use crate::assets::AssetReference;
use crate::config::SiteConfig;

// =========================================================================
// Site fixture
// =========================================================================

/// Minimal templates that exercise every placeholder.
pub const HOMEPAGE_TEMPLATE: &str = "<html><head><title>__PAGE_TITLE__</title></head><body>\
<!-- NAV_PLACEHOLDER --><main><!-- INDEX_CONTENT_PLACEHOLDER --><section><!-- POSTS_PLACEHOLDER --></section></main>\
<!-- FOOTER_PLACEHOLDER --></body></html>";
pub const POST_TEMPLATE: &str = "<html><head><title>__PAGE_TITLE__ | __SITE_TITLE__</title></head><body>\
<!-- NAV_PLACEHOLDER --><article><!-- CONTENT_PLACEHOLDER --></article><!-- FOOTER_PLACEHOLDER --></body></html>";
pub const FOOTER_TEMPLATE: &str = "<footer>&copy; __CURRENT_YEAR__ __AUTHOR__</footer>";

/// A temporary site directory with `content/`, `public/` and `templates/`
/// and a [`SiteConfig`] rooted in it.
pub struct SiteFixture {
    pub tmp: TempDir,
    pub config: SiteConfig,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("content")).unwrap();
        let config = SiteConfig {
            content_folder: root.join("content"),
            output_folder: root.join("public"),
            templates_folder: root.join("templates"),
            ..SiteConfig::default()
        };
        Self { tmp, config }
    }

    pub fn with_site_url(mut self, site_url: &str) -> Self {
        self.config.site_url = site_url.to_string();
        self
    }

    /// Write the three required templates.
    pub fn with_templates(self) -> Self {
        self.write("templates/homepage.html", HOMEPAGE_TEMPLATE.as_bytes());
        self.write("templates/post.html", POST_TEMPLATE.as_bytes());
        self.write("templates/_footer.html", FOOTER_TEMPLATE.as_bytes());
        self
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.tmp.path().join(rel)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, bytes: &[u8]) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    pub fn read(&self, rel: &str) -> Vec<u8> {
        fs::read(self.path(rel)).unwrap_or_else(|e| panic!("cannot read {rel}: {e}"))
    }

    pub fn read_string(&self, rel: &str) -> String {
        String::from_utf8(self.read(rel)).unwrap()
    }

    /// A reference written in a document sitting directly in `content/`.
    pub fn reference(&self, original: &str) -> AssetReference {
        AssetReference::new(
            original,
            &self.config.content_folder,
            &self.config.content_folder,
        )
    }

    /// Sorted file names directly inside the asset store.
    pub fn store_names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.config.asset_store()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

// =========================================================================
// Filesystem helpers
// =========================================================================

/// Set a file's modification time.
pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(time))
        .unwrap_or_else(|e| panic!("cannot set mtime of {}: {e}", path.display()));
}

/// Modification time of a file.
pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

/// Encode a small RGB PNG at `path`.
pub fn write_png(path: &Path, width: u32, height: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 40) as u8, (y * 40) as u8, 128])
    });
    img.save(path).unwrap();
}

// =========================================================================
// Log capture
// =========================================================================

/// Collects formatted log output emitted inside [`LogCapture::capture`].
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Run `f` with a debug-level subscriber writing into this capture. The
    /// subscriber is only active on the current thread.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
