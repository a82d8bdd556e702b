//! Character-level cleaning: accents, punctuation, short words.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([.",()!?;:])"#).expect("valid pattern"));
static NOT_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-ZñÑáéíóúÁÉÍÓÚ ]").expect("valid pattern"));
static NOT_LETTERS_OR_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-ZñÑáéíóúÁÉÍÓÚ0-9 ]").expect("valid pattern")
});
static MULTIPLE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("valid pattern"));

/// Remove accents and every other non-ASCII character.
///
/// The text is decomposed (NFD) and combining marks are dropped, so `ñ`
/// becomes `n` and `ü` becomes `u`. Characters with no ASCII base (`¿`,
/// `€`) disappear.
pub fn remove_accents(text: &str) -> String {
    text.nfd().filter(char::is_ascii).collect()
}

/// Collapse runs of spaces into one.
pub fn collapse_spaces(text: &str) -> String {
    MULTIPLE_SPACES.replace_all(text, " ").into_owned()
}

/// Lowercase, drop punctuation and symbols, collapse spaces.
///
/// Only Spanish letters, spaces and (unless `remove_numbers`) ASCII digits
/// survive.
pub fn basic_cleaning(text: &str, remove_numbers: bool) -> String {
    let text = text.to_lowercase();
    let text = PUNCTUATION.replace_all(&text, " $1 ");
    let text = if remove_numbers {
        NOT_LETTERS.replace_all(&text, " ")
    } else {
        NOT_LETTERS_OR_DIGITS.replace_all(&text, " ")
    };
    let text = collapse_spaces(&text);
    text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
        .to_string()
}

/// Keep only the words (split on single spaces) with at least `n_min` characters.
pub fn remove_short_words(text: &str, n_min: usize) -> String {
    text.split(' ')
        .filter(|word| word.chars().count() >= n_min)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip whitespace from both ends.
pub fn trim_ends(text: &str) -> String {
    text.trim().to_string()
}

/// Split on `sep`, drop duplicate fragments (first occurrence wins) and join
/// the rest with spaces.
pub fn remove_repeated(text: &str, sep: &str, trim: bool) -> String {
    let mut seen = std::collections::HashSet::new();
    text.split(sep)
        .map(|part| if trim { part.trim() } else { part })
        .filter(|part| seen.insert(*part))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip characters that are not allowed in XML 1.0 documents.
pub fn make_xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c,
                '\u{9}' | '\u{A}' | '\u{D}'
                | '\u{20}'..='\u{D7FF}'
                | '\u{E000}'..='\u{FFFD}'
                | '\u{10000}'..='\u{10FFFF}')
        })
        .collect()
}
