//! # mdpress
//!
//! A small static site generator for Markdown blogs. A folder of Markdown
//! documents plus a handful of HTML templates becomes a folder of publishable
//! HTML; every image, video or file the documents reference is optimized or
//! copied into one flat asset store, and assets nobody references any more
//! can be collected later.
//!
//! # Architecture: One Pass per Document
//!
//! ```text
//! content/post.md
//!   └─ frontmatter ─ scan::tokenize ─┬─ Asset ─▶ assets::Materializer ─▶ public/assets/
//!                                    ├─ Link  ─▶ links
//!                                    ├─ Embed ─▶ embed
//!                                    └─ Text
//!        ─▶ pulldown-cmark ─▶ templates ─▶ public/post.html, public/index.html
//!
//! public/assets/  ◀── gc ── references in content/, public/, templates/
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, defaults, validation, stock config |
//! | [`frontmatter`] | Header block extraction and `key: value` parsing |
//! | [`scan`] | Single-pass span classifier; reference extractor for GC |
//! | [`assets`] | Reference classification, resolution and materialization into the store |
//! | [`imaging`] | Re-encoding raster images: orientation, color normalization, quality |
//! | [`naming`] | Store naming strategies (base name, content hash) |
//! | [`links`] | Cross-document link rewriting, site-rooted URLs |
//! | [`embed`] | Video and status URL embeds |
//! | [`pipeline`] | Per-document orchestration and reports |
//! | [`templates`] | Template loading and placeholder substitution |
//! | [`assemble`] | Post discovery, summaries, home page and post pages |
//! | [`gc`] | Unreferenced asset collection |
//! | [`types`] | Reports and summaries shared across stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Incremental by Modification Time
//!
//! An asset is written only when its store copy is missing or older than the
//! source. Rebuilding an unchanged site re-renders HTML but writes no assets,
//! so the expensive part of a build (image re-encoding) runs once per change.
//!
//! ## Failures Are Values
//!
//! A missing image or a failed copy does not abort a build. Each reference
//! yields an [`assets::AssetOutcome`], logged where it happens and collected
//! into a [`types::BuildReport`] that `build --report` writes as JSON. Only a
//! missing config file or template is fatal.
//!
//! ## Maud for Generated Markup
//!
//! Embeds, navigation and the post listing are generated with
//! [Maud](https://maud.lambda.xyz/), so interpolated titles and URLs are
//! escaped. Site chrome stays in user-editable template files.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate only. No system libraries,
//! no external processes.

pub mod assemble;
pub mod assets;
pub mod config;
pub mod embed;
pub mod frontmatter;
pub mod gc;
pub mod imaging;
pub mod links;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod templates;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
