//! Map alert content rendering.

use regex::Regex;

/// Turns alert HTML into plain text.
///
/// Line-break tags become blank lines, then every remaining tag is removed.
#[derive(Debug, Clone)]
pub struct AlertFormatter {
    tag_pattern: Regex,
    line_break_tag: String,
}

impl AlertFormatter {
    /// Create a formatter from a compiled tag pattern and a line-break tag.
    #[must_use]
    pub fn new(tag_pattern: Regex, line_break_tag: impl Into<String>) -> Self {
        Self {
            tag_pattern,
            line_break_tag: line_break_tag.into(),
        }
    }

    /// Render `content` as plain text.
    #[must_use]
    pub fn render(&self, content: &str) -> String {
        let spaced = content.replace(&self.line_break_tag, "\n\n");
        self.tag_pattern.replace_all(&spaced, "").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peco_core::config::{DEFAULT_LINE_BREAK_TAG, DEFAULT_TAG_PATTERN};

    fn formatter() -> AlertFormatter {
        AlertFormatter::new(
            Regex::new(DEFAULT_TAG_PATTERN).unwrap(),
            DEFAULT_LINE_BREAK_TAG,
        )
    }

    #[test]
    fn test_line_break_becomes_blank_line() {
        assert_eq!(
            formatter().render("<p>Power out</p><br />Crews dispatched"),
            "Power out\n\nCrews dispatched"
        );
    }

    #[test]
    fn test_strips_nested_and_attributed_tags() {
        let html = r#"<div class="banner"><strong>Storm</strong> <a href="https://peco.com">update</a></div>"#;
        assert_eq!(formatter().render(html), "Storm update");
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(formatter().render("No tags here"), "No tags here");
        assert_eq!(formatter().render(""), "");
    }

    #[test]
    fn test_multiple_line_breaks() {
        assert_eq!(formatter().render("a<br />b<br />c"), "a\n\nb\n\nc");
    }
}
