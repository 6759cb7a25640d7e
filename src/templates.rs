//! Template loading and placeholder substitution.
//!
//! Templates are plain HTML files in `templates_folder`:
//!
//! | File | Required | Used for |
//! |---|---|---|
//! | `homepage.html` | yes | `index.html` |
//! | `post.html` | yes | every published post |
//! | `_footer.html` | yes | footer partial |
//! | `_nav.html` | no | navigation partial; generated from `navigation_links` when absent |
//!
//! ## Placeholders
//!
//! | Token | Replaced with |
//! |---|---|
//! | `<!-- NAV_PLACEHOLDER -->` | navigation partial |
//! | `<!-- FOOTER_PLACEHOLDER -->` | footer partial |
//! | `__CURRENT_YEAR__` | current year (also inside the footer) |
//! | `__SITE_TITLE__`, `__SITE_DESCRIPTION__`, `__AUTHOR__` | config values, HTML-escaped |
//! | `__PAGE_TITLE__` | document title, HTML-escaped |
//! | `<!-- CONTENT_PLACEHOLDER -->` | rendered post body (`post.html`) |
//! | `<!-- INDEX_CONTENT_PLACEHOLDER -->` | rendered home document (`homepage.html`) |
//! | `<!-- POSTS_PLACEHOLDER -->` | post listing (`homepage.html`) |
//!
//! Rendered content is inserted last, so tokens that happen to appear inside
//! a document are left alone.

use crate::config::{NavLink, SiteConfig};
use chrono::Datelike;
use maud::{Markup, html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const NAV_PLACEHOLDER: &str = "<!-- NAV_PLACEHOLDER -->";
pub const FOOTER_PLACEHOLDER: &str = "<!-- FOOTER_PLACEHOLDER -->";
pub const CONTENT_PLACEHOLDER: &str = "<!-- CONTENT_PLACEHOLDER -->";
pub const INDEX_CONTENT_PLACEHOLDER: &str = "<!-- INDEX_CONTENT_PLACEHOLDER -->";
pub const POSTS_PLACEHOLDER: &str = "<!-- POSTS_PLACEHOLDER -->";
pub const YEAR_TOKEN: &str = "__CURRENT_YEAR__";
pub const PAGE_TITLE_TOKEN: &str = "__PAGE_TITLE__";
pub const SITE_TITLE_TOKEN: &str = "__SITE_TITLE__";
pub const SITE_DESCRIPTION_TOKEN: &str = "__SITE_DESCRIPTION__";
pub const AUTHOR_TOKEN: &str = "__AUTHOR__";

const HOMEPAGE_FILE: &str = "homepage.html";
const POST_FILE: &str = "post.html";
const FOOTER_FILE: &str = "_footer.html";
const NAV_FILE: &str = "_nav.html";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    Missing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The template set of a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    pub homepage: String,
    pub post: String,
    pub footer: String,
    pub nav: Option<String>,
}

impl Templates {
    /// Read the template set from `dir`. A missing required file is an error.
    pub fn load(dir: &Path) -> Result<Self, TemplateError> {
        Ok(Self {
            homepage: read_required(&dir.join(HOMEPAGE_FILE))?,
            post: read_required(&dir.join(POST_FILE))?,
            footer: read_required(&dir.join(FOOTER_FILE))?,
            nav: read_optional(&dir.join(NAV_FILE))?,
        })
    }
}

fn read_required(path: &Path) -> Result<String, TemplateError> {
    read_optional(path)?.ok_or_else(|| TemplateError::Missing(path.to_path_buf()))
}

fn read_optional(path: &Path) -> Result<Option<String>, TemplateError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Navigation markup generated from the configured links.
pub fn render_nav(links: &[NavLink]) -> Markup {
    html! {
        nav.site-nav {
            ul {
                @for link in links {
                    li { a href=(link.url) { (link.text) } }
                }
            }
        }
    }
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Fills templates for one build.
pub struct TemplateRenderer<'a> {
    templates: &'a Templates,
    config: &'a SiteConfig,
    year: i32,
}

impl<'a> TemplateRenderer<'a> {
    pub fn new(templates: &'a Templates, config: &'a SiteConfig, year: i32) -> Self {
        Self {
            templates,
            config,
            year,
        }
    }

    fn nav(&self) -> String {
        match &self.templates.nav {
            Some(partial) => partial.clone(),
            None => render_nav(&self.config.navigation_links).into_string(),
        }
    }

    /// Substitute the site-wide placeholders into `template`.
    fn chrome(&self, template: &str) -> String {
        template
            .replace(NAV_PLACEHOLDER, &self.nav())
            .replace(FOOTER_PLACEHOLDER, &self.templates.footer)
            .replace(YEAR_TOKEN, &self.year.to_string())
            .replace(SITE_TITLE_TOKEN, &escape(&self.config.site_title))
            .replace(SITE_DESCRIPTION_TOKEN, &escape(&self.config.site_description))
            .replace(AUTHOR_TOKEN, &escape(&self.config.author))
    }

    /// `post.html` with nav, footer and site tokens filled, ready for an
    /// external converter to inject page content.
    pub fn post_shell(&self) -> String {
        self.chrome(&self.templates.post)
    }

    /// A complete post page.
    pub fn render_post(&self, title: &str, content_html: &str) -> String {
        self.post_shell()
            .replace(PAGE_TITLE_TOKEN, &escape(title))
            .replace(CONTENT_PLACEHOLDER, content_html)
    }

    /// The home page.
    pub fn render_home(&self, title: &str, index_html: &str, posts_html: &str) -> String {
        self.chrome(&self.templates.homepage)
            .replace(PAGE_TITLE_TOKEN, &escape(title))
            .replace(POSTS_PLACEHOLDER, posts_html)
            .replace(INDEX_CONTENT_PLACEHOLDER, index_html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SiteFixture;

    fn templates() -> Templates {
        Templates {
            homepage: "<title>__PAGE_TITLE__</title><!-- NAV_PLACEHOLDER --><!-- INDEX_CONTENT_PLACEHOLDER --><!-- POSTS_PLACEHOLDER --><!-- FOOTER_PLACEHOLDER -->".to_string(),
            post: "<title>__PAGE_TITLE__ - __SITE_TITLE__</title><!-- CONTENT_PLACEHOLDER --><!-- FOOTER_PLACEHOLDER -->".to_string(),
            footer: "<footer>__CURRENT_YEAR__ __AUTHOR__</footer>".to_string(),
            nav: Some("<nav>custom</nav>".to_string()),
        }
    }

    fn config() -> SiteConfig {
        SiteConfig {
            site_title: "Notes & Things".to_string(),
            author: "Ada".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn load_requires_core_templates() {
        let site = SiteFixture::new();
        site.write("templates/homepage.html", b"home");
        site.write("templates/post.html", b"post");
        let err = Templates::load(&site.path("templates")).unwrap_err();
        assert!(matches!(err, TemplateError::Missing(p) if p.ends_with("_footer.html")));
    }

    #[test]
    fn load_with_optional_nav_absent() {
        let site = SiteFixture::new().with_templates();
        let templates = Templates::load(&site.path("templates")).unwrap();
        assert!(templates.nav.is_none());
        assert!(templates.post.contains(CONTENT_PLACEHOLDER));
    }

    #[test]
    fn footer_year_is_filled() {
        let templates = templates();
        let config = config();
        let renderer = TemplateRenderer::new(&templates, &config, 2031);
        let page = renderer.render_post("Hello", "<p>hi</p>");
        assert!(page.contains("<footer>2031 Ada</footer>"));
    }

    #[test]
    fn titles_are_escaped() {
        let templates = templates();
        let config = config();
        let renderer = TemplateRenderer::new(&templates, &config, 2031);
        let page = renderer.render_post("<b>Bold</b>", "<p>hi</p>");
        assert!(page.contains("<title>&lt;b&gt;Bold&lt;/b&gt; - Notes &amp; Things</title>"));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn content_tokens_are_not_substituted() {
        let templates = templates();
        let config = config();
        let renderer = TemplateRenderer::new(&templates, &config, 2031);
        let page = renderer.render_post("T", "<code>__AUTHOR__</code>");
        assert!(page.contains("<code>__AUTHOR__</code>"));
    }

    #[test]
    fn home_page_fills_both_markers() {
        let templates = templates();
        let config = config();
        let renderer = TemplateRenderer::new(&templates, &config, 2031);
        let page = renderer.render_home("Welcome", "<p>intro</p>", "<h2>post</h2>");
        assert_eq!(
            page,
            "<title>Welcome</title><nav>custom</nav><p>intro</p><h2>post</h2><footer>2031 Ada</footer>"
        );
    }

    #[test]
    fn generated_nav_without_partial() {
        let mut templates = templates();
        templates.nav = None;
        templates.homepage = NAV_PLACEHOLDER.to_string();
        let mut config = config();
        config.navigation_links = vec![
            NavLink {
                text: "Home".to_string(),
                url: "/".to_string(),
            },
            NavLink {
                text: "About".to_string(),
                url: "/about.html".to_string(),
            },
        ];
        let renderer = TemplateRenderer::new(&templates, &config, 2031);
        assert_eq!(
            renderer.render_home("", "", ""),
            "<nav class=\"site-nav\"><ul><li><a href=\"/\">Home</a></li><li><a href=\"/about.html\">About</a></li></ul></nav>"
        );
    }

    #[test]
    fn post_shell_keeps_content_marker() {
        let templates = templates();
        let config = config();
        let renderer = TemplateRenderer::new(&templates, &config, 2031);
        let shell = renderer.post_shell();
        assert!(shell.contains(CONTENT_PLACEHOLDER));
        assert!(shell.contains(PAGE_TITLE_TOKEN));
        assert!(!shell.contains(FOOTER_PLACEHOLDER));
    }

    #[test]
    fn current_year_is_plausible() {
        assert!(current_year() >= 2024);
    }
}
