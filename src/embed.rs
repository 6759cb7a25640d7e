//! Rich embeds for bare media URLs.
//!
//! Two URL families are recognized in plain text:
//!
//! - **Video**: `youtube.com/watch?v=<id>` and `youtu.be/<id>` with an
//!   11-character id become a responsive container around an inline frame
//!   pointed at `https://www.youtube.com/embed/<id>`.
//! - **Status**: `twitter.com/<user>/status/<n>` and `x.com/<user>/status/<n>`
//!   become a quote block linking to the canonical status URL. A document with
//!   at least one status embed needs the widget script exactly once, appended
//!   at the end; see [`append_widget_script`].
//!
//! URLs are found by [`crate::scan::tokenize`], which turns each into an
//! [`EmbedMatch`]; [`EmbedMatch::render`] is a pure text rewrite. Nothing is
//! fetched or validated.

use maud::{Markup, html};

/// Video URL with the id in the `video_id` group.
pub(crate) const VIDEO_PATTERN: &str = r#"\b(?:https?://)?(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)(?P<video_id>[A-Za-z0-9_-]{11})[^\s<>"]*"#;

/// Status URL with the numeric id in the `status_id` group.
pub(crate) const STATUS_PATTERN: &str = r#"\b(?:https?://)?(?:www\.)?(?:twitter\.com|x\.com)/\w+/status/(?P<status_id>[0-9]+)[^\s<>"]*"#;

/// Permissions granted to the video frame.
const FRAME_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";

const WIDGET_SCRIPT_URL: &str = "https://platform.twitter.com/widgets.js";

/// A recognized media URL and its platform id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedMatch {
    Video { id: String },
    Status { id: String },
}

impl EmbedMatch {
    /// Build from a capture of [`VIDEO_PATTERN`] or [`STATUS_PATTERN`].
    pub(crate) fn from_captures(caps: &regex::Captures<'_>) -> Option<Self> {
        if let Some(id) = caps.name("video_id") {
            return Some(Self::Video {
                id: id.as_str().to_string(),
            });
        }
        caps.name("status_id").map(|id| Self::Status {
            id: id.as_str().to_string(),
        })
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Embed markup that replaces the URL.
    pub fn render(&self) -> Markup {
        match self {
            Self::Video { id } => html! {
                div.video-container {
                    iframe src=(format!("https://www.youtube.com/embed/{id}"))
                        frameborder="0" allow=(FRAME_ALLOW) allowfullscreen {}
                }
            },
            Self::Status { id } => html! {
                blockquote.twitter-tweet {
                    a href=(format!("https://twitter.com/user/status/{id}")) {}
                }
            },
        }
    }
}

/// The companion script status embeds need.
pub fn widget_script() -> Markup {
    html! {
        script async src=(WIDGET_SCRIPT_URL) charset="utf-8" {}
    }
}

/// Append the widget script once when `status_count > 0`.
pub fn append_widget_script(mut text: String, status_count: usize) -> String {
    if status_count > 0 {
        text.push('\n');
        text.push_str(&widget_script().into_string());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{Span, tokenize};

    /// Replace every embed span in `text` with its markup, counting
    /// `(videos, statuses)`.
    fn embed_all(text: &str) -> (String, usize, usize) {
        let (mut videos, mut statuses) = (0, 0);
        let mut out = String::new();
        for span in tokenize(text) {
            match span {
                Span::Embed { embed, .. } => {
                    if embed.is_status() {
                        statuses += 1;
                    } else {
                        videos += 1;
                    }
                    out.push_str(&embed.render().into_string());
                }
                other => out.push_str(other.raw()),
            }
        }
        (out, videos, statuses)
    }

    #[test]
    fn short_video_link_embeds() {
        let (text, videos, _) = embed_all("https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(videos, 1);
        assert!(text.starts_with("<div class=\"video-container\"><iframe"));
        assert!(text.contains("src=\"https://www.youtube.com/embed/dQw4w9WgXcQ\""));
        assert!(text.contains("allowfullscreen"));
        assert!(text.contains("encrypted-media"));
    }

    #[test]
    fn long_video_link_with_extra_params() {
        let (text, videos, _) =
            embed_all("Watch: https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s now");
        assert_eq!(videos, 1);
        assert!(text.starts_with("Watch: <div"));
        assert!(text.ends_with("</div> now"));
        assert!(!text.contains("t=42s"));
    }

    #[test]
    fn short_ids_are_not_videos() {
        let (text, videos, _) = embed_all("https://youtu.be/short");
        assert_eq!(videos, 0);
        assert_eq!(text, "https://youtu.be/short");
    }

    #[test]
    fn status_links_from_both_hosts() {
        let (text, _, statuses) = embed_all(
            "a https://twitter.com/rustlang/status/123\nb https://x.com/rustlang/status/456?s=20",
        );
        assert_eq!(statuses, 2);
        assert!(text.contains(
            "<blockquote class=\"twitter-tweet\"><a href=\"https://twitter.com/user/status/123\"></a></blockquote>"
        ));
        assert!(text.contains("status/456\""));
        // rendering never appends the script itself
        assert!(!text.contains("<script"));
    }

    #[test]
    fn host_suffix_inside_word_is_not_a_status() {
        let (text, _, statuses) = embed_all("dropbox.com/u/status/123");
        assert_eq!(statuses, 0);
        assert_eq!(text, "dropbox.com/u/status/123");
    }

    #[test]
    fn widget_script_appended_once() {
        let (text, _, statuses) = embed_all("x.com/a/status/1 and twitter.com/b/status/2");
        let text = append_widget_script(text, statuses);
        assert_eq!(text.matches("<script").count(), 1);
        assert!(text.ends_with(
            "<script async src=\"https://platform.twitter.com/widgets.js\" charset=\"utf-8\"></script>"
        ));
    }

    #[test]
    fn no_script_without_status() {
        let text = append_widget_script("plain".to_string(), 0);
        assert_eq!(text, "plain");
    }

    #[test]
    fn plain_text_untouched() {
        let (text, videos, statuses) =
            embed_all("nothing to see at https://example.com/watch?v=abc");
        assert_eq!(text, "nothing to see at https://example.com/watch?v=abc");
        assert_eq!((videos, statuses), (0, 0));
    }
}
