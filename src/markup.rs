use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::Regex;

// Elements whose content never reaches the display text.
static HIDDEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<!--.*?-->|<head\b.*?</head\s*>|<style\b.*?</style\s*>|<script\b.*?</script\s*>|<title\b.*?</title\s*>",
    )
    .expect("hidden regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*>|<![^>]*>|<\?[^>]*>").expect("tag regex")
});

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{0,31});")
        .expect("entity regex")
});

static WS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\n\x0C]+").expect("ws regex"));

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "center", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody",
    "td", "tfoot", "th", "thead", "tr", "ul",
];

#[inline]
fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// True when `text` carries at least one tag, comment or declaration.
pub fn has_markup(text: &str) -> bool {
    TAG_RE.is_match(text)
}

/// Display text of an HTML blob with one `\n` per visual line break.
///
/// Tags are dropped, entities resolved and source whitespace collapsed the way a rich-text
/// view renders it; `<br>` and block element boundaries become line breaks. A blob without
/// any markup is taken as plain text and keeps its own line breaks.
pub fn to_plain_text(html: &str) -> String {
    if !has_markup(html) {
        return decode_entities(html).into_owned();
    }

    let visible = HIDDEN_RE.replace_all(html, "");
    let mut out = String::with_capacity(visible.len());
    let mut pos = 0usize;
    for caps in TAG_RE.captures_iter(&visible) {
        let m = caps.get(0).expect("whole match");
        push_text(&mut out, &visible[pos..m.start()]);
        pos = m.end();

        let Some(name) = caps.get(2).map(|n| n.as_str()) else {
            continue;
        };
        if name.eq_ignore_ascii_case("br") {
            out.push('\n');
        } else if is_block_tag(name) {
            soft_break(&mut out);
        }
    }
    push_text(&mut out, &visible[pos..]);

    out.lines()
        .map(|l| l.trim_matches(' '))
        .collect::<Vec<_>>()
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

fn push_text(out: &mut String, raw: &str) {
    if raw.is_empty() {
        return;
    }
    let collapsed = WS_RUN_RE.replace_all(raw, " ");
    if collapsed == " " && (out.is_empty() || out.ends_with('\n') || out.ends_with(' ')) {
        return;
    }
    out.push_str(&decode_entities(&collapsed));
}

// Block boundaries never stack: `</p><p>` is one break, `<br><br>` stays two.
fn soft_break(out: &mut String) {
    let trimmed_len = out.trim_end_matches(' ').len();
    out.truncate(trimmed_len);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Resolves named (HTML5) and numeric character references. Unknown or malformed
/// references are left as written; `&nbsp;` turns into a plain space.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let decoded = ENTITY_RE.replace_all(text, |caps: &regex::Captures<'_>| {
        let raw = &caps[0];
        match unescape_with(raw, resolve_html5_entity) {
            Ok(s) => s.replace('\u{a0}', " "),
            Err(_) => raw.to_string(),
        }
    });
    Cow::Owned(decoded.into_owned())
}
