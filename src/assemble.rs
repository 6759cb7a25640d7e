//! Page assembly: the home page listing and the published post pages.
//!
//! Posts are the `.md` files directly inside `content_folder`, except the home
//! document. They are listed newest first by modification time (file name
//! breaks ties). Each one is run through the [`Pipeline`], rendered with
//! pulldown-cmark and summarized:
//!
//! - **title**: front matter `title`, or `untitled_title`
//! - **link**: `<site_url>/<stem>.html`
//! - **excerpt**: inner HTML of the first rendered `<p>`
//! - **preview image**: front matter `preview_image` used verbatim, otherwise
//!   the public path of the first in-body image that was materialized
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── index.html          # homepage.html + home document + post listing
//! ├── first-post.html     # post.html per post (build only)
//! └── assets/             # asset store
//! ```

use crate::config::SiteConfig;
use crate::links::{PUBLISHED_EXTENSION, SOURCE_EXTENSION, published_url};
use crate::pipeline::{ContentDocument, Pipeline, ProcessedDocument};
use crate::templates::{TemplateError, TemplateRenderer};
use crate::types::{BuildReport, PostSummary};
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{info, warn};

const HOME_PAGE: &str = "index.html";

static FIRST_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>(.*?)</p>").expect("paragraph pattern must compile"));

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// What one assembly run produced.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub home_html: String,
    /// Post summaries in listing order.
    pub summaries: Vec<PostSummary>,
    pub report: BuildReport,
}

/// Whether post pages are written alongside the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `index.html` only.
    HomeOnly,
    /// `index.html` and one page per post.
    Site,
}

/// Top-level source documents, excluding the home document, newest first.
pub fn discover_posts(config: &SiteConfig) -> io::Result<Vec<PathBuf>> {
    let home = config.home_document_path();
    let mut posts: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(&config.content_folder)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(SOURCE_EXTENSION) || path == home {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        posts.push((meta.modified()?, path));
    }
    posts.sort_by(|(a_time, a_path), (b_time, b_path)| {
        b_time.cmp(a_time).then_with(|| a_path.cmp(b_path))
    });
    Ok(posts.into_iter().map(|(_, path)| path).collect())
}

/// Render Markdown to HTML.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Inner HTML of the first paragraph.
pub fn excerpt(html: &str) -> Option<String> {
    FIRST_PARAGRAPH
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The post listing.
pub fn render_summaries(summaries: &[PostSummary]) -> Markup {
    html! {
        @for post in summaries {
            article.post-summary {
                @if let Some(image) = &post.preview_image {
                    a href=(post.link) {
                        img.post-preview src=(image) alt=(post.title);
                    }
                }
                h2 { a href=(post.link) { (post.title) } }
                @if let Some(text) = &post.excerpt {
                    p { (PreEscaped(text)) }
                }
            }
        }
    }
}

/// Builds the home page and post pages from the content folder.
pub struct Assembler<'a> {
    config: &'a SiteConfig,
    pipeline: &'a Pipeline<'a>,
    renderer: &'a TemplateRenderer<'a>,
}

impl<'a> Assembler<'a> {
    pub fn new(
        config: &'a SiteConfig,
        pipeline: &'a Pipeline<'a>,
        renderer: &'a TemplateRenderer<'a>,
    ) -> Self {
        Self {
            config,
            pipeline,
            renderer,
        }
    }

    pub fn assemble(&self, mode: Mode) -> Result<BuildOutput, AssembleError> {
        let mut report = BuildReport::default();
        fs::create_dir_all(&self.config.output_folder)?;

        let (home_title, index_html) = self.home_content(&mut report)?;

        let mut summaries = Vec::new();
        for path in discover_posts(self.config)? {
            let document = ContentDocument::read(&path)?;
            let processed = self.pipeline.process(&document);
            let body_html = render_markdown(&processed.text);
            let summary = self.summarize(&document, &processed, &body_html);
            report.push(processed.report);

            if mode == Mode::Site
                && let Some(stem) = document.stem()
            {
                let name = format!("{stem}{PUBLISHED_EXTENSION}");
                let page = self.renderer.render_post(&summary.title, &body_html);
                self.write_page(&name, &page)?;
                report.pages.push(name);
            }
            summaries.push(summary);
        }

        let posts_html = render_summaries(&summaries).into_string();
        let home_html = self
            .renderer
            .render_home(&home_title, &index_html, &posts_html);
        self.write_page(HOME_PAGE, &home_html)?;
        report.pages.push(HOME_PAGE.to_string());

        Ok(BuildOutput {
            home_html,
            summaries,
            report,
        })
    }

    /// Title and rendered body of the home document. A missing home document
    /// yields an empty intro under the site title.
    fn home_content(&self, report: &mut BuildReport) -> Result<(String, String), AssembleError> {
        let path = self.config.home_document_path();
        if !path.is_file() {
            warn!(path = %path.display(), "home document not found");
            return Ok((self.config.site_title.clone(), String::new()));
        }
        let processed = self.pipeline.process(&ContentDocument::read(&path)?);
        let title = processed
            .front_matter
            .title_or(&self.config.site_title)
            .to_string();
        let html = render_markdown(&processed.text);
        report.push(processed.report);
        Ok((title, html))
    }

    fn summarize(
        &self,
        document: &ContentDocument,
        processed: &ProcessedDocument,
        body_html: &str,
    ) -> PostSummary {
        let stem = document.stem().unwrap_or_default();
        PostSummary {
            title: processed
                .front_matter
                .title_or(&self.config.untitled_title)
                .to_string(),
            link: published_url(&self.config.site_url, stem),
            preview_image: processed
                .front_matter
                .preview_image
                .clone()
                .or_else(|| processed.first_image.clone()),
            excerpt: excerpt(body_html),
        }
    }

    fn write_page(&self, name: &str, html: &str) -> io::Result<()> {
        let path: PathBuf = self.config.output_folder.join(name);
        fs::write(&path, html)?;
        info!(page = %display_rel(&path, &self.config.output_folder), "wrote page");
        Ok(())
    }
}

fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
