//! Tokenization for the embedding models.

use std::sync::LazyLock;

use regex::Regex;

use crate::cleaning::remove_accents;

// Runs of letters; digits and underscores split words
static ALPHABETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\W\d_]+").expect("valid pattern"));

/// Lowercase alphabetic tokens of `text` with `min_len..=max_len` characters.
///
/// With `deaccent`, accents are stripped before tokenizing.
pub fn simple_preprocess(text: &str, min_len: usize, max_len: usize, deaccent: bool) -> Vec<String> {
    let text = if deaccent {
        remove_accents(text)
    } else {
        text.to_string()
    };
    ALPHABETIC
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|token| (min_len..=max_len).contains(&token.chars().count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_preprocess() {
        let tokens = simple_preprocess("La Canción número1 de 2020: a_b", 2, 15, false);
        assert_eq!(tokens, vec!["la", "canción", "número", "de"]);

        let tokens = simple_preprocess("La Canción", 2, 15, true);
        assert_eq!(tokens, vec!["la", "cancion"]);

        let tokens = simple_preprocess("electroencefalografista es largo", 2, 15, false);
        assert_eq!(tokens, vec!["es", "largo"]);
    }
}
