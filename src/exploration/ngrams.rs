//! N-gram extraction and counting.

use ahash::AHashMap;

use crate::analysis::tokenizer::{Tokenizer, tokenize};
use crate::cleaning::basic_cleaning;
use crate::error::{ContextoError, Result};

/// Consecutive runs of `n` tokens, joined with single spaces.
///
/// With `clean`, the text goes through [`basic_cleaning`] first.
///
/// # Examples
///
/// ```
/// use contexto::exploration::ngrams;
///
/// let bigrams = ngrams("Hoy es un buen día", 2, false, None).unwrap();
/// assert_eq!(bigrams, vec!["Hoy es", "es un", "un buen", "buen día"]);
/// ```
pub fn ngrams(
    text: &str,
    n: usize,
    clean: bool,
    tokenizer: Option<&dyn Tokenizer>,
) -> Result<Vec<String>> {
    if n == 0 {
        return Err(ContextoError::invalid_argument(
            "The n-gram size must be at least 1",
        ));
    }
    let text = if clean {
        basic_cleaning(text, true)
    } else {
        text.to_string()
    };
    let tokens = tokenize(&text, tokenizer)?;
    Ok(tokens.windows(n).map(|window| window.join(" ")).collect())
}

/// Count occurrences, most frequent first. Ties keep first-seen order.
pub(crate) fn count_ordered<I: IntoIterator<Item = String>>(items: I) -> Vec<(String, usize)> {
    let mut positions: AHashMap<String, usize> = AHashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        match positions.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// N-grams of `text` with their frequencies, most frequent first (ties in
/// order of first appearance). `n_max` keeps only that many.
pub fn ngram_frequencies(text: &str, n: usize, n_max: Option<usize>) -> Result<Vec<(String, usize)>> {
    let mut counts = count_ordered(ngrams(text, n, false, None)?);
    if let Some(n_max) = n_max {
        counts.truncate(n_max);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;

    #[test]
    fn test_ngrams() {
        assert_eq!(
            ngrams("uno dos tres", 1, false, None).unwrap(),
            vec!["uno", "dos", "tres"]
        );
        assert_eq!(ngrams("uno dos tres", 3, false, None).unwrap(), vec!["uno dos tres"]);
        assert!(ngrams("uno dos", 3, false, None).unwrap().is_empty());
        assert!(ngrams("uno", 0, false, None).is_err());
    }

    #[test]
    fn test_ngrams_clean() {
        let grams = ngrams("¡Hola, Mundo 2024!", 2, true, None).unwrap();
        assert_eq!(grams, vec!["hola mundo"]);
    }

    #[test]
    fn test_ngrams_custom_tokenizer() {
        let tokenizer = WhitespaceTokenizer::new();
        let grams = ngrams("hola, mundo", 1, false, Some(&tokenizer)).unwrap();
        assert_eq!(grams, vec!["hola,", "mundo"]);
    }

    #[test]
    fn test_frequencies() {
        let text = "a b a c b a d";
        let counts = ngram_frequencies(text, 1, None).unwrap();
        assert_eq!(
            counts,
            vec![
                ("a".to_string(), 3),
                ("b".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );

        let top = ngram_frequencies(text, 2, Some(1)).unwrap();
        assert_eq!(top, vec![("b a".to_string(), 2)]);
    }
}
