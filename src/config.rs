//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. The file must exist, but every
//! key inside it is optional: user config files need only specify the values
//! they want to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_folder = "content"      # Markdown sources and their assets
//! output_folder = "public"        # Published HTML; assets land in public/assets/
//! templates_folder = "templates"  # homepage.html, post.html, _footer.html, _nav.html
//! site_url = "/"                  # Base path every public URL is rooted at
//! site_title = "Blog"
//! site_description = ""
//! author = ""
//! home_document = "index.md"      # Rendered into the home page, not listed as a post
//! untitled_title = "Untitled"     # Title for documents without front matter
//!
//! [[navigation_links]]
//! text = "Home"
//! url = "/"
//!
//! [images]
//! quality = 85                    # Re-encode quality (1-100)
//!
//! [assets]
//! naming = "base-name"            # or "content-hash"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The configuration is immutable for the duration of a build. The only
//! mutation the CLI performs is the `--site-url` override, applied once right
//! after loading via [`SiteConfig::with_site_url`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the Markdown documents.
    pub content_folder: PathBuf,
    /// Directory the published site is written to.
    pub output_folder: PathBuf,
    /// Directory holding `homepage.html`, `post.html` and the partials.
    pub templates_folder: PathBuf,
    /// Base path for every public URL. May or may not end in `/`.
    pub site_url: String,
    /// Ordered navigation entries, rendered when no `_nav.html` partial exists.
    pub navigation_links: Vec<NavLink>,
    pub site_title: String,
    pub site_description: String,
    pub author: String,
    /// File name (inside `content_folder`) of the home document.
    pub home_document: String,
    /// Title used for documents whose front matter has no `title`.
    pub untitled_title: String,
    /// Image re-encoding settings.
    pub images: ImagesConfig,
    /// Asset store settings.
    pub assets: AssetsConfig,
}

/// A single navigation entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub text: String,
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_folder: PathBuf::from("content"),
            output_folder: PathBuf::from("public"),
            templates_folder: PathBuf::from("templates"),
            site_url: "/".to_string(),
            navigation_links: Vec::new(),
            site_title: "Blog".to_string(),
            site_description: String::new(),
            author: String::new(),
            home_document: "index.md".to_string(),
            untitled_title: "Untitled".to_string(),
            images: ImagesConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.home_document.trim().is_empty() {
            return Err(ConfigError::Validation(
                "home_document must not be empty".into(),
            ));
        }
        // Posts are the top-level documents, so the home document must be one.
        if self.home_document.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "home_document must be a file name directly inside content_folder, got '{}'",
                self.home_document
            )));
        }
        Ok(())
    }

    /// Return a copy with `site_url` replaced (the CLI `--site-url` override).
    pub fn with_site_url(mut self, site_url: impl Into<String>) -> Self {
        self.site_url = site_url.into();
        self
    }

    /// Flat asset store directory: `<output_folder>/assets`.
    pub fn asset_store(&self) -> PathBuf {
        self.output_folder.join(ASSET_DIR)
    }

    /// Full path of the home document.
    pub fn home_document_path(&self) -> PathBuf {
        self.content_folder.join(&self.home_document)
    }
}

/// Name of the asset store directory below the output folder. Also the first
/// segment of every public asset URL.
pub const ASSET_DIR: &str = "assets";

/// Image re-encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { quality: 85 }
    }
}

/// Asset store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub naming: NamingScheme,
}

/// How files are keyed inside the flat asset store.
///
/// `BaseName` keeps the source file's name, so two sources sharing a name in
/// different directories collide in the store. `ContentHash` keys by digest.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NamingScheme {
    #[default]
    BaseName,
    ContentHash,
}

/// Load and validate a config file.
///
/// Unlike the keys inside it, the file itself is required: a missing file is
/// [`ConfigError::NotFound`].
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all default values.
pub fn stock_config_toml() -> &'static str {
    r##"# mdpress configuration
# ======================
#
# Every key is optional; the values below are the defaults.
# Unknown keys will cause an error.

# Markdown sources. Asset references are resolved relative to each document,
# or relative to this folder when they start with "/".
content_folder = "content"

# Published site. Referenced assets are copied (or re-encoded) into
# <output_folder>/assets/, a flat directory keyed by file name.
output_folder = "public"

# homepage.html, post.html and _footer.html are required.
# _nav.html is optional; without it the links below are rendered.
templates_folder = "templates"

# Every generated URL starts with this base path.
site_url = "/"

site_title = "Blog"
site_description = ""
author = ""

# Rendered into the home page body instead of being listed as a post.
home_document = "index.md"

# Title used when a document has no front matter title.
untitled_title = "Untitled"

# [[navigation_links]]
# text = "Home"
# url = "/"

[images]
# Quality for re-encoded raster images (1-100).
quality = 85

[assets]
# "base-name": assets keep their file name (two files sharing a name collide).
# "content-hash": assets are named after a digest of their bytes.
naming = "base-name"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.content_folder, PathBuf::from("content"));
        assert_eq!(config.output_folder, PathBuf::from("public"));
        assert_eq!(config.site_url, "/");
        assert!(config.navigation_links.is_empty());
        assert_eq!(config.site_title, "Blog");
        assert_eq!(config.site_description, "");
        assert_eq!(config.author, "");
        assert_eq!(config.images.quality, 85);
        assert_eq!(config.assets.naming, NamingScheme::BaseName);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
site_url = "/blog"
site_title = "Notes"

[[navigation_links]]
text = "About"
url = "/blog/about.html"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site_url, "/blog");
        assert_eq!(config.site_title, "Notes");
        assert_eq!(
            config.navigation_links,
            vec![NavLink {
                text: "About".to_string(),
                url: "/blog/about.html".to_string(),
            }]
        );
        // Untouched keys keep defaults
        assert_eq!(config.output_folder, PathBuf::from("public"));
    }

    #[test]
    fn parse_content_hash_naming() {
        let config: SiteConfig = toml::from_str("[assets]\nnaming = \"content-hash\"").unwrap();
        assert_eq!(config.assets.naming, NamingScheme::ContentHash);
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("site_ur = \"/\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[images]\nqualty = 80");
        assert!(result.is_err());
    }

    #[test]
    fn load_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(&tmp.path().join("config.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_config_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(load_config(&path).unwrap(), SiteConfig::default());
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[images]\nquality = 101").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_quality_boundaries() {
        let mut config = SiteConfig::default();
        config.images.quality = 100;
        assert!(config.validate().is_ok());
        config.images.quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_empty_home_document() {
        let config = SiteConfig {
            home_document: "  ".to_string(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_home_document_is_a_bare_file_name() {
        for home in ["pages/index.md", "./index.md", "..\\index.md"] {
            let config = SiteConfig {
                home_document: home.to_string(),
                ..SiteConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "{home}"
            );
        }
    }

    #[test]
    fn site_url_override() {
        let config = SiteConfig::default().with_site_url("/blog/");
        assert_eq!(config.site_url, "/blog/");
    }

    #[test]
    fn asset_store_below_output() {
        let config = SiteConfig::default();
        assert_eq!(config.asset_store(), PathBuf::from("public/assets"));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
