//! Token normalization and numeric parsing for OCR word text.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum token length for prefix matching. Shorter tokens must match exactly.
const MIN_PREFIX_LEN: usize = 3;

/// First number in a fragment: comma-grouped thousands, or a plain run of digits.
/// Alternatives are tried in order at the leftmost position.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d{1,3}(?:,\d{3})*(?:\.\d+)?|-?\d+(?:\.\d+)?").unwrap());

/// Lowercase and keep only `[a-z0-9]`.
pub fn normalize_token(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Equal tokens match. Tokens of at least 3 chars also match when either is a
/// prefix of the other, which absorbs OCR truncation ("minera") and glued
/// suffixes ("proteinkg").
pub fn matches_token(word_token: &str, pattern_token: &str) -> bool {
    if word_token.is_empty() || pattern_token.is_empty() {
        return false;
    }
    if word_token == pattern_token {
        return true;
    }
    if word_token.len() >= MIN_PREFIX_LEN && pattern_token.len() >= MIN_PREFIX_LEN {
        return word_token.starts_with(pattern_token) || pattern_token.starts_with(word_token);
    }
    false
}

/// Whether the text, whitespace removed, is made only of digits and `.,+-`.
pub fn is_numeric_fragment(text: &str) -> bool {
    let mut any = false;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        if !(c.is_ascii_digit() || matches!(c, '.' | ',' | '+' | '-')) {
            return false;
        }
        any = true;
    }
    any
}

/// Parse the first number found in `text` after whitespace removal.
/// Thousands commas are stripped. Returns `None` when no finite number is present.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let found = NUMBER_PATTERN.find(&cleaned)?;
    let numeric = found.as_str().replace(',', "");
    numeric.parse::<f64>().ok().filter(|n| n.is_finite())
}
