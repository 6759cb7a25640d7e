//! Single-pass span scanner.
//!
//! [`tokenize`] walks a document body once and classifies every structural
//! span:
//!
//! | Span | Syntax |
//! |---|---|
//! | [`Span::Asset`] | `![alt](path "title")`, `<img|video|audio|source ... src="path">` |
//! | [`Span::Link`] | `[text](target)`, `[![alt](path)](target)` |
//! | [`Span::Embed`] | bare video or status URL (see [`crate::embed`]) |
//! | [`Span::Text`] | everything between the above |
//!
//! Spans never overlap. A URL that sits inside link or image syntax belongs to
//! that span and is not an embed; text produced by rewriting one span is never
//! scanned again. A link that wraps an image is split into the opening text,
//! the image as an asset span and the rest (`](target)`) as the link span, so
//! both paths get rewritten. The pipeline dispatches each span to its
//! transformer.
//!
//! [`reference_paths`] is the looser extractor the garbage collector runs over
//! sources, rendered pages and templates. It also picks up `href` attributes
//! and CSS `url()` values.

use crate::embed::{EmbedMatch, STATUS_PATTERN, VIDEO_PATTERN};
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

const IMAGE_PATTERN: &str =
    r#"(?P<image>!\[[^\]]*\]\((?P<image_path>[^)\s]*)(?:\s+"[^"]*")?\))"#;

const MEDIA_TAG_PATTERN: &str = r#"(?P<tag><(?i:img|video|audio|source)\b[^>]*?\s(?i:src)\s*=\s*["'](?P<tag_path>[^"']*)["'][^>]*>)"#;

// Link text holds no brackets apart from at most one wrapped image, as in
// `[![alt](a.png)](b.md)`.
const LINK_PATTERN: &str = concat!(
    r#"(?P<link>\[[^\[\]]*"#,
    r#"(?:(?P<link_image>!\[[^\]]*\]\((?P<link_image_path>[^)\s]*)(?:\s+"[^"]*")?\))[^\[\]]*)?"#,
    r#"\]\((?P<link_target>[^)\s]*)(?:\s+"[^"]*")?\))"#,
);

static DOCUMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{IMAGE_PATTERN}|{MEDIA_TAG_PATTERN}|{LINK_PATTERN}|{VIDEO_PATTERN}|{STATUS_PATTERN}"
    ))
    .expect("document pattern must compile")
});

static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"!\[[^\]]*\]\((?P<md>[^)\s]*)(?:\s+"[^"]*")?\)"#,
        r#"|<\w[^>]*?\s(?i:src|href)\s*=\s*["'](?P<attr>[^"']*)["']"#,
        r#"|url\(\s*["']?(?P<css>[^"')\s]+)["']?\s*\)"#,
    ))
    .expect("reference pattern must compile")
});

/// How an asset reference was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSyntax {
    /// `![alt](path)`
    MarkdownImage,
    /// `<video src="path">` and friends
    MediaTag,
}

/// A span whose only rewritable part is a path or target inside `raw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpan<'a> {
    /// The whole matched text.
    pub raw: &'a str,
    /// Byte range of the path within `raw`.
    pub path_range: Range<usize>,
}

impl<'a> PathSpan<'a> {
    fn new(whole: regex::Match<'a>, path: regex::Match<'a>) -> Self {
        Self::within(whole.as_str(), whole.start(), path)
    }

    /// `raw` starts at byte `start` of the haystack `path` was matched in.
    fn within(raw: &'a str, start: usize, path: regex::Match<'a>) -> Self {
        Self {
            raw,
            path_range: path.start() - start..path.end() - start,
        }
    }

    pub fn path(&self) -> &'a str {
        &self.raw[self.path_range.clone()]
    }

    /// `raw` with the path replaced and everything around it untouched.
    pub fn with_path(&self, new_path: &str) -> String {
        format!(
            "{}{}{}",
            &self.raw[..self.path_range.start],
            new_path,
            &self.raw[self.path_range.end..]
        )
    }
}

/// One classified piece of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    Asset {
        syntax: AssetSyntax,
        span: PathSpan<'a>,
    },
    /// For a link wrapping an image, `raw` starts right after the image.
    Link(PathSpan<'a>),
    Embed {
        raw: &'a str,
        embed: EmbedMatch,
    },
}

impl Span<'_> {
    /// The original text of the span.
    pub fn raw(&self) -> &str {
        match self {
            Span::Text(text) => text,
            Span::Asset { span, .. } | Span::Link(span) => span.raw,
            Span::Embed { raw, .. } => raw,
        }
    }
}

/// Classify every span of `text`. Concatenating the `raw()` of the returned
/// spans reproduces `text` exactly.
pub fn tokenize(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in DOCUMENT_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(image) = caps.name("link_image") {
            let (Some(image_path), Some(target)) =
                (caps.name("link_image_path"), caps.name("link_target"))
            else {
                continue;
            };
            spans.push(Span::Text(&text[last..image.start()]));
            spans.push(Span::Asset {
                syntax: AssetSyntax::MarkdownImage,
                span: PathSpan::new(image, image_path),
            });
            spans.push(Span::Link(PathSpan::within(
                &text[image.end()..whole.end()],
                image.end(),
                target,
            )));
            last = whole.end();
            continue;
        }
        let Some(span) = classify(&caps, whole) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::Text(&text[last..whole.start()]));
        }
        spans.push(span);
        last = whole.end();
    }
    if last < text.len() {
        spans.push(Span::Text(&text[last..]));
    }
    spans
}

fn classify<'a>(caps: &Captures<'a>, whole: regex::Match<'a>) -> Option<Span<'a>> {
    if caps.name("image").is_some() {
        let path = caps.name("image_path")?;
        return Some(Span::Asset {
            syntax: AssetSyntax::MarkdownImage,
            span: PathSpan::new(whole, path),
        });
    }
    if caps.name("tag").is_some() {
        let path = caps.name("tag_path")?;
        return Some(Span::Asset {
            syntax: AssetSyntax::MediaTag,
            span: PathSpan::new(whole, path),
        });
    }
    if caps.name("link").is_some() {
        let target = caps.name("link_target")?;
        return Some(Span::Link(PathSpan::new(whole, target)));
    }
    EmbedMatch::from_captures(caps).map(|embed| Span::Embed {
        raw: whole.as_str(),
        embed,
    })
}

/// Every asset-like path referenced in `text`: image syntax, tag `src`/`href`
/// attributes and CSS `url()` values, in order of appearance. No filtering.
pub fn reference_paths(text: &str) -> Vec<&str> {
    REFERENCE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            caps.name("md")
                .or_else(|| caps.name("attr"))
                .or_else(|| caps.name("css"))
                .map(|m| m.as_str())
        })
        .filter(|path| !path.is_empty())
        .collect()
}
