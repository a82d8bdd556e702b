//! Stop filter implementation.
//!
//! Removes common words that carry little meaning. Built-in lists exist for
//! every [`Language`]; custom lists can be given as plain words.
//!
//! # Examples
//!
//! ```
//! use contexto::analysis::token_filter::Filter;
//! use contexto::analysis::token_filter::stop::StopFilter;
//! use contexto::analysis::token::Token;
//!
//! let filter = StopFilter::new(); // Spanish stop words
//! let tokens = vec![
//!     Token::new("el", 0),
//!     Token::new("perro", 1),
//!     Token::new("ladra", 2)
//! ];
//!
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(result.len(), 2);
//! assert_eq!(result[0].text, "perro");
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;
use crate::language::Language;

const SPANISH_STOP_WORDS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/stopwords/es.txt"));
const ENGLISH_STOP_WORDS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/stopwords/en.txt"));
const GERMAN_STOP_WORDS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/stopwords/de.txt"));
const FRENCH_STOP_WORDS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/stopwords/fr.txt"));

fn parse_list(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Default Spanish stop words.
pub static SPANISH_STOP_WORDS_SET: LazyLock<HashSet<String>> =
    LazyLock::new(|| parse_list(SPANISH_STOP_WORDS));

/// Default English stop words.
pub static ENGLISH_STOP_WORDS_SET: LazyLock<HashSet<String>> =
    LazyLock::new(|| parse_list(ENGLISH_STOP_WORDS));

/// Default German stop words.
pub static GERMAN_STOP_WORDS_SET: LazyLock<HashSet<String>> =
    LazyLock::new(|| parse_list(GERMAN_STOP_WORDS));

/// Default French stop words.
pub static FRENCH_STOP_WORDS_SET: LazyLock<HashSet<String>> =
    LazyLock::new(|| parse_list(FRENCH_STOP_WORDS));

/// Built-in stop words for a language.
pub fn stop_words(language: Language) -> &'static HashSet<String> {
    match language {
        Language::Spanish => &SPANISH_STOP_WORDS_SET,
        Language::English => &ENGLISH_STOP_WORDS_SET,
        Language::German => &GERMAN_STOP_WORDS_SET,
        Language::French => &FRENCH_STOP_WORDS_SET,
    }
}

/// A filter that removes stop words from the token stream.
///
/// Stopped tokens can either be dropped or kept with their `stopped` flag
/// set, see [`StopFilter::remove_stopped`].
///
/// ```
/// use contexto::analysis::token_filter::Filter;
/// use contexto::analysis::token_filter::stop::StopFilter;
/// use contexto::analysis::token::Token;
///
/// let filter = StopFilter::from_words(vec!["la"]).remove_stopped(false);
/// let tokens = vec![Token::new("la", 0), Token::new("casa", 1)];
///
/// let result: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
///     .unwrap()
///     .collect();
///
/// assert_eq!(result.len(), 2);
/// assert!(result[0].is_stopped());
/// assert!(!result[1].is_stopped());
/// ```
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
    /// Whether to remove stopped tokens entirely or just mark them as stopped
    remove_stopped: bool,
}

impl StopFilter {
    /// Create a new stop filter with the default Spanish stop words.
    pub fn new() -> Self {
        Self::for_language(Language::Spanish)
    }

    /// Create a stop filter with the built-in list of a language.
    pub fn for_language(language: Language) -> Self {
        Self::with_stop_words(stop_words(language).clone())
    }

    /// Create a new stop filter with custom stop words.
    pub fn with_stop_words(stop_words: HashSet<String>) -> Self {
        StopFilter {
            stop_words: Arc::new(stop_words),
            remove_stopped: true,
        }
    }

    /// Create a new stop filter from a list of stop words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stop_words = words.into_iter().map(|s| s.into()).collect();
        Self::with_stop_words(stop_words)
    }

    /// Set whether to remove stopped tokens entirely or just mark them as stopped.
    pub fn remove_stopped(mut self, remove: bool) -> Self {
        self.remove_stopped = remove;
        self
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.stop_words.len()
    }

    /// Check if the stop word set is empty.
    pub fn is_empty(&self) -> bool {
        self.stop_words.is_empty()
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter_map(|token| {
                if token.is_stopped() {
                    Some(token)
                } else if self.is_stop_word(&token.text) {
                    if self.remove_stopped {
                        None
                    } else {
                        Some(token.stop())
                    }
                } else {
                    Some(token)
                }
            })
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_filter() {
        let filter = StopFilter::from_words(vec!["de", "y", "o"]);
        let tokens = vec![
            Token::new("pan", 0),
            Token::new("de", 1),
            Token::new("queso", 2),
            Token::new("y", 3),
            Token::new("vino", 4),
        ];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        let texts: Vec<&str> = result.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["pan", "queso", "vino"]);
        assert_eq!(result[1].position, 2);
    }

    #[test]
    fn test_builtin_lists() {
        assert!(stop_words(Language::Spanish).contains("para"));
        assert!(stop_words(Language::English).contains("the"));
        assert!(stop_words(Language::German).contains("und"));
        assert!(stop_words(Language::French).contains("le"));

        let filter = StopFilter::for_language(Language::English);
        assert!(filter.is_stop_word("and"));
        assert!(!filter.is_stop_word("house"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_keep_stopped() {
        let filter = StopFilter::new().remove_stopped(false);
        let tokens = vec![Token::new("los", 0), Token::new("gatos", 1)];
        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
        assert_eq!(result.len(), 2);
        assert!(result[0].is_stopped());
        assert_eq!(filter.name(), "stop");
    }
}
