use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::placeholder::is_placeholder_token;
use crate::table::TranslationTable;

static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space run regex"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Replaced at this byte offset of the working text.
    Replaced { offset: usize },
    NotFound,
    /// Every occurrence was itself a `{#...}` token.
    SkippedPlaceholder,
    EmptyKey,
}

#[derive(Clone, Debug)]
pub struct Substitution {
    pub html: String,
    /// One per table entry, in table order.
    pub outcomes: Vec<(String, Outcome)>,
}

impl Substitution {
    pub fn replaced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Replaced { .. }))
            .count()
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &str> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| !matches!(o, Outcome::Replaced { .. }))
            .map(|(s, _)| s.as_str())
    }
}

/// Collapses every run of space characters to one. Tabs and newlines are untouched.
pub fn collapse_spaces(html: &str) -> String {
    SPACE_RUN_RE.replace_all(html, " ").into_owned()
}

pub fn substitute(original_html: &str, table: &TranslationTable) -> String {
    substitute_with_report(original_html, table).html
}

/// Replaces, entry by entry in table order, the first case-insensitive literal occurrence
/// of the source text in the progressively rewritten document.
pub fn substitute_with_report(original_html: &str, table: &TranslationTable) -> Substitution {
    let mut html = collapse_spaces(original_html);
    let mut outcomes = Vec::with_capacity(table.len());
    for (source, translation) in table.iter() {
        let outcome = replace_first(&mut html, source.trim(), translation);
        outcomes.push((source.to_string(), outcome));
    }
    Substitution { html, outcomes }
}

fn replace_first(html: &mut String, needle: &str, replacement: &str) -> Outcome {
    if needle.is_empty() {
        return Outcome::EmptyKey;
    }

    let found = match literal_regex(needle) {
        Some(re) => re.find(html.as_str()).map(|m| (m.start(), m.end())),
        None => find_folded(html.as_str(), needle),
    };
    let Some((start, end)) = found else {
        return Outcome::NotFound;
    };
    // `{`, `#` and `}` have no case variants, so every match of a placeholder-shaped key is
    // itself a placeholder.
    if is_placeholder_token(needle) {
        return Outcome::SkippedPlaceholder;
    }
    html.replace_range(start..end, replacement);
    Outcome::Replaced { offset: start }
}

fn literal_regex(needle: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .size_limit(needle.len().saturating_mul(1024).max(REGEX_SIZE_FLOOR))
        .build()
        .ok()
}

const REGEX_SIZE_FLOOR: usize = 10 * (1 << 20);

/// Case-insensitive literal search without a compiled pattern, char by char with simple
/// lowercase folding. Used only when the key will not compile.
fn find_folded(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let folded: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    for (start, _) in haystack.char_indices() {
        let mut want = folded.iter();
        let mut end = start;
        let mut matched = true;
        'outer: for (i, c) in haystack[start..].char_indices() {
            for lc in c.to_lowercase() {
                match want.next() {
                    Some(w) if *w == lc => {}
                    Some(_) => {
                        matched = false;
                        break 'outer;
                    }
                    None => break 'outer,
                }
            }
            end = start + i + c.len_utf8();
            if want.len() == 0 {
                break;
            }
        }
        if matched && want.len() == 0 {
            return Some((start, end));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{collapse_spaces, find_folded, substitute, substitute_with_report, Outcome};
    use crate::table::TranslationTable;

    fn table(pairs: &[(&str, &str)]) -> TranslationTable {
        TranslationTable::from_external(pairs.iter().copied()).0
    }

    #[test]
    fn placeholders_survive_replacement() {
        let html = "<p>Hello {#name}, welcome</p>";
        let t = table(&[("Hello {#name}, welcome", "Bonjour {#name}, bienvenue")]);
        assert_eq!(substitute(html, &t), "<p>Bonjour {#name}, bienvenue</p>");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let html = "<a>Click here</a> or <a>Click here</a>";
        let t = table(&[("Click here", "Cliquez ici")]);
        assert_eq!(substitute(html, &t), "<a>Cliquez ici</a> or <a>Click here</a>");
    }

    #[test]
    fn matching_ignores_case() {
        let t = table(&[("Submit", "Envoyer")]);
        assert_eq!(substitute("<button>SUBMIT</button>", &t), "<button>Envoyer</button>");
    }

    #[test]
    fn key_is_literal_not_a_pattern() {
        let html = "Total: 5.00 (net) or 5x00";
        let t = table(&[("5.00 (net)", "5,00 (netto)")]);
        assert_eq!(substitute(html, &t), "Total: 5,00 (netto) or 5x00");
        let t = table(&[("5.00", "X")]);
        assert_eq!(substitute("5x00 5.00", &t), "5x00 X");
    }

    #[test]
    fn space_runs_collapse_before_matching() {
        let html = "<p>Your   order\n\t has shipped</p>";
        assert_eq!(collapse_spaces(html), "<p>Your order\n\t has shipped</p>");
        let t = table(&[("Your order", "Votre commande")]);
        assert_eq!(substitute(html, &t), "<p>Votre commande\n\t has shipped</p>");
    }

    #[test]
    fn entries_consume_matches_top_to_bottom() {
        let html = "<p>Yes</p><p>Yes, please</p>";
        let t = table(&[("Yes", "Oui"), ("Yes, please", "Oui, merci")]);
        // "Yes" takes the first paragraph, so the second line is still intact for its own entry.
        assert_eq!(substitute(html, &t), "<p>Oui</p><p>Oui, merci</p>");
    }

    #[test]
    fn placeholder_shaped_match_is_skipped() {
        let html = "<p>{#code}</p>";
        let t = table(&[("{#code}", "{#code}")]);
        let sub = substitute_with_report(html, &t);
        assert_eq!(sub.html, html);
        assert_eq!(sub.outcomes[0].1, Outcome::SkippedPlaceholder);
    }

    #[test]
    fn placeholder_key_never_replaces_its_own_field() {
        let html = "<p>{#code}</p><p>{#CODE}</p>";
        let t = table(&[("{#code}", "X"), ("{#absent}", "Y")]);
        let sub = substitute_with_report(html, &t);
        assert_eq!(sub.html, html);
        assert_eq!(sub.outcomes[0].1, Outcome::SkippedPlaceholder);
        assert_eq!(sub.outcomes[1].1, Outcome::NotFound);
    }

    #[test]
    fn long_keys_still_match_case_insensitively() {
        let line = "Your subscription renews automatically. ".repeat(400);
        let html = format!("<p>{}</p>", line.trim_end().to_uppercase());
        let t = table(&[(line.trim_end(), "Renouvellement")]);
        assert_eq!(substitute(&html, &t), "<p>Renouvellement</p>");
    }

    #[test]
    fn folded_search_ignores_case() {
        assert_eq!(find_folded("<b>SUBMIT</b>", "submit"), Some((3, 9)));
        assert_eq!(find_folded("Été ÉTÉ", "été été"), Some((0, 11)));
        assert_eq!(find_folded("a.b", "a-b"), None);
        assert_eq!(find_folded("abc", "abcd"), None);
        assert_eq!(find_folded("x", ""), Some((0, 0)));
    }

    #[test]
    fn missing_and_empty_keys_are_not_errors() {
        let t = table(&[("absent", "x"), ("   ", "y"), ("Here", "Ici")]);
        let sub = substitute_with_report("<p>Here</p>", &t);
        assert_eq!(sub.html, "<p>Ici</p>");
        assert_eq!(sub.outcomes[0].1, Outcome::NotFound);
        assert_eq!(sub.outcomes[1].1, Outcome::EmptyKey);
        assert_eq!(sub.outcomes[2].1, Outcome::Replaced { offset: 3 });
        assert_eq!(sub.replaced(), 1);
        assert_eq!(sub.unmatched().collect::<Vec<_>>(), vec!["absent", "   "]);
    }

    #[test]
    fn empty_translation_blanks_the_line() {
        let t = table(&[("Remove me", "")]);
        assert_eq!(substitute("<p>Remove me</p>", &t), "<p></p>");
    }

    #[test]
    fn source_is_trimmed_before_search() {
        let t = table(&[("  Padded  ", "P")]);
        assert_eq!(substitute("<b>Padded</b>", &t), "<b>P</b>");
    }

    #[test]
    fn reapplying_is_not_guaranteed_stable() {
        let t = table(&[("Hi", "Hi there")]);
        let once = substitute("<p>Hi</p>", &t);
        let twice = substitute(&once, &t);
        assert_eq!(once, "<p>Hi there</p>");
        assert_eq!(twice, "<p>Hi there there</p>");
        assert_ne!(once, twice);
    }
}
