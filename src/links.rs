//! Cross-document link rewriting and site-rooted URL building.
//!
//! A Markdown link whose target ends in `.md` points at another content
//! document. Published documents all live at the site root, so the target is
//! reduced to its base name, given the `.html` extension and rooted at
//! `site_url`:
//!
//! ```text
//! [Next](posts/other-post.md)   site_url = "/blog"   →   [Next](/blog/other-post.html)
//! ```
//!
//! External URLs, in-page anchors, `mailto:` and `tel:` targets are never
//! rewritten.

use crate::assets::is_external;
use crate::naming::base_name_of_reference;

/// Extension of source documents.
pub const SOURCE_EXTENSION: &str = ".md";
/// Extension of published documents.
pub const PUBLISHED_EXTENSION: &str = ".html";

/// Join `site_url` and a relative path with exactly one `/` between them.
///
/// ```
/// use mdpress::links::site_path;
/// assert_eq!(site_path("/blog", "assets/a.png"), "/blog/assets/a.png");
/// assert_eq!(site_path("/blog/", "assets/a.png"), "/blog/assets/a.png");
/// assert_eq!(site_path("/", "post.html"), "/post.html");
/// ```
pub fn site_path(site_url: &str, rel: &str) -> String {
    let base = site_url.replace('\\', "/");
    let base = base.trim_end_matches('/');
    let rel = rel.replace('\\', "/");
    format!("{}/{}", base, rel.trim_start_matches('/'))
}

/// Whether a link target names another content document.
pub fn is_document_link(target: &str) -> bool {
    !target.is_empty()
        && !target.starts_with('#')
        && !is_external(target)
        && target.ends_with(SOURCE_EXTENSION)
}

/// Published URL for a document link target, or `None` if the target is not a
/// document link.
pub fn rewrite_target(target: &str, site_url: &str) -> Option<String> {
    if !is_document_link(target) {
        return None;
    }
    let name = base_name_of_reference(target)?;
    let stem = name.strip_suffix(SOURCE_EXTENSION)?;
    if stem.is_empty() {
        return None;
    }
    Some(published_url(site_url, stem))
}

/// Published URL of the document with file stem `stem`.
pub fn published_url(site_url: &str, stem: &str) -> String {
    site_path(site_url, &format!("{stem}{PUBLISHED_EXTENSION}"))
}
