use serde::{Deserialize, Serialize};

use crate::markup::to_plain_text;
use crate::placeholder;

/// One non-empty display line of the source document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub source_text: String,
    /// Tokens of `source_text`, space-joined; empty when there are none.
    #[serde(default)]
    pub placeholder_text: String,
}

impl LineRecord {
    pub fn new(source_text: impl Into<String>) -> Self {
        let source_text = source_text.into();
        let placeholder_text = placeholder::joined(&source_text);
        Self {
            source_text,
            placeholder_text,
        }
    }

    /// Width in characters, as the line would be shown in an editor row.
    pub fn display_width(&self) -> usize {
        self.source_text.chars().count()
    }
}

/// Strips `html` to display text and splits it into line records.
pub fn segment(html: &str) -> Vec<LineRecord> {
    segment_plain_text(&to_plain_text(html))
}

/// Splits already-plain text on `\r`, `\n` or `\r\n`, dropping blank lines.
pub fn segment_plain_text(text: &str) -> Vec<LineRecord> {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(LineRecord::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{segment, segment_plain_text, LineRecord};

    fn sources(records: &[LineRecord]) -> Vec<&str> {
        records.iter().map(|r| r.source_text.as_str()).collect()
    }

    #[test]
    fn blank_lines_are_dropped() {
        let records = segment_plain_text("line1\n\n  \nline2");
        assert_eq!(sources(&records), vec!["line1", "line2"]);
    }

    #[test]
    fn every_break_style_is_one_break() {
        let records = segment_plain_text("a\r\nb\rc\nd");
        assert_eq!(sources(&records), vec!["a", "b", "c", "d"]);
        assert_eq!(sources(&segment("a\r\nb\rc\nd")), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn lines_are_trimmed() {
        let records = segment_plain_text("   padded \t\n\tx");
        assert_eq!(sources(&records), vec!["padded", "x"]);
    }

    #[test]
    fn placeholder_text_is_collected_per_line() {
        let records = segment_plain_text("Hello {#first} {#last},\nNo tokens here");
        assert_eq!(records[0].placeholder_text, "{#first} {#last}");
        assert_eq!(records[1].placeholder_text, "");
    }

    #[test]
    fn token_only_line_maps_to_itself() {
        let records = segment_plain_text("{#a}{#b}");
        assert_eq!(records[0].source_text, "{#a}{#b}");
        assert_eq!(records[0].placeholder_text, "{#a} {#b}");
    }

    #[test]
    fn html_is_stripped_before_splitting() {
        let html = "<html><body>\n<p>Dear {#name},</p>\n<p>\n  Your code is <b>{#code}</b>.\n</p>\n<p>&nbsp;</p></body></html>";
        let records = segment(html);
        assert_eq!(sources(&records), vec!["Dear {#name},", "Your code is {#code}."]);
        assert_eq!(records[1].placeholder_text, "{#code}");
    }

    #[test]
    fn segmentation_is_repeatable() {
        let html = "<p>One</p><p>Two {#x}</p>";
        assert_eq!(segment(html), segment(html));
    }

    #[test]
    fn display_width_counts_chars() {
        assert_eq!(LineRecord::new("été").display_width(), 3);
    }
}
