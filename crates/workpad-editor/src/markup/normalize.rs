use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());

/// Wrapper tags that carry no visible content on their own.
static STRUCTURAL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(?:p|div|span|br)\b[^>]*>").unwrap());

/// Embedded media keeps an otherwise blank document non-empty.
static MEDIA_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<img\b|data-anchor-id").unwrap());

/// Canonical form of a markup string, for equality checks only.
///
/// Non-breaking and zero-width spaces are folded, whitespace runs collapse to
/// one space, whitespace between tags is dropped and the ends are trimmed. A
/// value that is nothing but structural wrappers (`<p><br></p>`) normalizes
/// to the empty string unless it carries media.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(markup: &str) -> String {
    let folded = strip_zero_width(markup)
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace('\u{a0}', " ");
    let collapsed = WHITESPACE_RUN.replace_all(&folded, " ");
    let tight = BETWEEN_TAGS.replace_all(&collapsed, "><");
    let trimmed = tight.trim();

    if is_visually_empty(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Removing one zero-width form can splice together another, so repeat
/// until nothing changes.
fn strip_zero_width(markup: &str) -> String {
    let mut out = markup.replace('\u{200b}', "");
    while out.contains("&#8203;") {
        out = out.replace("&#8203;", "").replace('\u{200b}', "");
    }
    out
}

fn is_visually_empty(markup: &str) -> bool {
    if MEDIA_MARKER.is_match(markup) {
        return false;
    }
    STRUCTURAL_TAG.replace_all(markup, "").trim().is_empty()
}
