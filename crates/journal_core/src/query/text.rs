//! Markup stripping and preview text for entry bodies.

use once_cell::sync::Lazy;
use regex::Regex;

/// Preview length in characters, before the ellipsis.
pub const PREVIEW_MAX_CHARS: usize = 120;

static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Replaces every `<...>` span with a single space.
///
/// Entities such as `&amp;` are left as-is; the body is never parsed.
pub fn strip_markup(body: &str) -> String {
    MARKUP_TAG_RE.replace_all(body, " ").into_owned()
}

/// Markup-free body text with whitespace runs collapsed and trimmed.
///
/// Used for both search matching and previews.
pub fn plain_text(body: &str) -> String {
    collapse_whitespace(&strip_markup(body))
}

/// Trims and folds every whitespace run (newlines included) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Display preview: plain text cut to [`PREVIEW_MAX_CHARS`] characters with a
/// `...` suffix when longer.
pub fn body_preview(body: &str) -> String {
    let text = plain_text(body);
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text;
    }

    let mut preview: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    preview.push_str("...");
    preview
}

#[cfg(test)]
mod tests {
    use super::{body_preview, plain_text, strip_markup, PREVIEW_MAX_CHARS};

    #[test]
    fn strip_markup_removes_every_tag() {
        let stripped = strip_markup("<p>Durant</p><p class=\"x\">scores</p>");
        assert!(!stripped.contains('<'));
        assert!(stripped.contains("Durant"));
        assert!(stripped.contains("scores"));
    }

    #[test]
    fn plain_text_collapses_whitespace_between_paragraphs() {
        assert_eq!(plain_text("<p>Game 7</p>\n<p>recap</p>"), "Game 7 recap");
    }

    #[test]
    fn short_preview_is_not_truncated() {
        assert_eq!(body_preview("<p>hi</p>"), "hi");
    }

    #[test]
    fn long_preview_is_truncated_with_ellipsis() {
        let body = format!("<p>{}</p>", "é".repeat(200));
        let preview = body_preview(&body);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 3);
    }

    #[test]
    fn preview_at_exact_limit_keeps_full_text() {
        let body = "a".repeat(PREVIEW_MAX_CHARS);
        assert_eq!(body_preview(&body), body);
    }
}
