//! Front matter extraction.
//!
//! A document carries metadata only when its very first line is the `---`
//! delimiter and a later line is the same delimiter. Lines in between are read
//! as `key: value` pairs, one per line. Keys are case-insensitive; a value
//! wrapped in matching single or double quotes is unquoted.
//!
//! ```text
//! ---
//! title: "Hello, world"
//! preview_image: images/cover.jpg
//! tags: ignored by the pipeline, kept in `extra`
//! ---
//! Body starts here.
//! ```
//!
//! Parsing never fails. A missing closing delimiter means there is no header
//! block, lines without a colon are skipped, and absent keys fall back to
//! defaults.

use std::collections::BTreeMap;

/// The delimiter line that opens and closes a header block.
const DELIMITER: &str = "---";

/// Metadata parsed from a document header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub preview_image: Option<String>,
    /// Every other key, lowercased, in sorted order.
    pub extra: BTreeMap<String, String>,
}

impl FrontMatter {
    /// The document title, or `placeholder` when the header has none.
    pub fn title_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(placeholder)
    }
}

/// A document split into its parsed header and remaining body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<'a> {
    pub front_matter: FrontMatter,
    /// The raw header block including both delimiter lines, if present.
    pub header: Option<&'a str>,
    /// Document text with the header block removed.
    pub body: &'a str,
}

/// Split `text` into front matter and body.
pub fn parse(text: &str) -> Parsed<'_> {
    match split_header(text) {
        Some((header, inner, body)) => Parsed {
            front_matter: parse_pairs(inner),
            header: Some(header),
            body,
        },
        None => Parsed {
            front_matter: FrontMatter::default(),
            header: None,
            body: text,
        },
    }
}

/// Locate the header block. Returns `(header, inner, body)` where `header`
/// spans both delimiter lines and `inner` is the text between them.
fn split_header(text: &str) -> Option<(&str, &str, &str)> {
    let first_end = line_end(text, 0);
    if trim_eol(&text[..first_end]) != DELIMITER {
        return None;
    }

    let inner_start = first_end;
    let mut pos = inner_start;
    while pos < text.len() {
        let end = line_end(text, pos);
        if trim_eol(&text[pos..end]) == DELIMITER {
            return Some((&text[..end], &text[inner_start..pos], &text[end..]));
        }
        pos = end;
    }
    None
}

/// Byte offset just past the line starting at `start` (including its `\n`).
fn line_end(text: &str, start: usize) -> usize {
    text[start..]
        .find('\n')
        .map(|i| start + i + 1)
        .unwrap_or(text.len())
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r']).trim_end()
}

fn parse_pairs(inner: &str) -> FrontMatter {
    let mut fm = FrontMatter::default();
    for line in inner.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() {
            continue;
        }
        let value = unquote(value.trim()).to_string();
        match key.as_str() {
            "title" => fm.title = Some(value).filter(|v| !v.is_empty()),
            "preview_image" => fm.preview_image = Some(value).filter(|v| !v.is_empty()),
            _ => {
                fm.extra.insert(key, value);
            }
        }
    }
    fm
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
