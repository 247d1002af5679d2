//! Whitespace and character normalization applied before splitting.

use regex::Regex;
use std::sync::LazyLock;

/// Every line-break variant, including Unicode line and paragraph separators.
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|[\r\x0B\x0C\x{85}\x{2028}\x{2029}]").unwrap());

/// Anything that is not a word character, whitespace or kept punctuation.
static UNPRINTABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^\w\s.,;:!?()\-'"/@#$%&*+=<>{}\[\]|\\~`]"#).unwrap()
});

/// Runs of whitespace other than `\n`.
static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

static LINE_EDGE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ +| +$").unwrap());

static BLANK_LINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize raw document text.
///
/// - Line breaks of every kind become `\n`
/// - Characters outside the printable set become spaces
/// - Horizontal whitespace collapses to one space and lines are trimmed
/// - Runs of blank lines collapse to a single blank line
///
/// Paragraph boundaries (`\n\n`) survive so the structural split can use them.
pub fn normalize_text(text: &str) -> String {
    let text = LINE_BREAK.replace_all(text, "\n");
    let text = UNPRINTABLE.replace_all(&text, " ");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = LINE_EDGE_SPACE.replace_all(&text, "");
    let text = BLANK_LINE_RUN.replace_all(&text, "\n\n");

    text.trim().to_string()
}
