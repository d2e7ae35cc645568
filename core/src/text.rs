//! Small text helpers shared by the analyzers.

use regex::Regex;
use std::sync::OnceLock;

/// Max characters kept in a source snippet.
pub const SNIPPET_MAX_CHARS: usize = 100;

/// Paragraphs shorter than this are ignored by the chunker.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

fn blank_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t\r]*\n").expect("blank line regex compiles"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex compiles"))
}

/// Split on blank lines, keeping trimmed paragraphs of at least
/// MIN_PARAGRAPH_CHARS characters.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let normalized_breaks = blank_line_regex();
    normalized_breaks
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
        .collect()
}

/// Collapse whitespace and cut to SNIPPET_MAX_CHARS on a char boundary.
pub fn snippet(raw: &str) -> String {
    let collapsed = whitespace_regex().replace_all(raw.trim(), " ");
    collapsed.chars().take(SNIPPET_MAX_CHARS).collect()
}

/// Parse "1,200.5" style numbers. Unparsable input is None, never an error.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Scale factor for a magnitude word (million/billion and short forms).
pub fn multiplier(word: Option<&str>) -> f64 {
    match word.map(|w| w.trim().to_ascii_lowercase()).as_deref() {
        Some("million") | Some("mn") | Some("m") => 1e6,
        Some("billion") | Some("bn") | Some("b") => 1e9,
        Some("thousand") | Some("k") => 1e3,
        _ => 1.0,
    }
}

/// Char-safe window of `radius` bytes (snapped to boundaries) around a byte range.
pub fn window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let mut lo = start.saturating_sub(radius);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + radius).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thousands_separators() {
        assert_eq!(parse_number("1,200"), Some(1200.0));
        assert_eq!(parse_number("12,345.5"), Some(12345.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn multiplier_words() {
        assert_eq!(multiplier(Some("Million")), 1e6);
        assert_eq!(multiplier(Some("B")), 1e9);
        assert_eq!(multiplier(None), 1.0);
    }

    #[test]
    fn snippet_is_bounded_and_collapsed() {
        let long = "word\n\n  ".repeat(60);
        let s = snippet(&long);
        assert!(s.chars().count() <= SNIPPET_MAX_CHARS);
        assert!(!s.contains('\n'));
    }

    #[test]
    fn short_paragraphs_dropped() {
        let text = "Too short.\n\nThis paragraph is comfortably longer than fifty characters in total.\n   \nTiny";
        let paragraphs = split_paragraphs(text);
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].starts_with("This paragraph"));
    }

    #[test]
    fn window_respects_char_boundaries() {
        let text = "é".repeat(20);
        let w = window(&text, 10, 12, 3);
        assert!(!w.is_empty());
    }
}
