use once_cell::sync::Lazy;
use regex::Regex;

pub const OPEN: &str = "{#";
pub const CLOSE: &str = "}";

// Non-greedy, so `{#a}{#b}` yields two tokens. `(?s)` lets a token span a line break.
pub static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{#.*?\}").expect("placeholder regex"));

/// All `{#...}` tokens in `line`, left to right.
pub fn extract(line: &str) -> Vec<String> {
    if line.is_empty() {
        return vec![];
    }
    PLACEHOLDER_RE
        .find_iter(line)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Space-joined tokens of `line`; empty when it has none.
pub fn joined(line: &str) -> String {
    extract(line).join(" ")
}

#[inline]
pub fn is_placeholder_token(s: &str) -> bool {
    s.len() >= OPEN.len() + CLOSE.len() && s.starts_with(OPEN) && s.ends_with(CLOSE)
}
