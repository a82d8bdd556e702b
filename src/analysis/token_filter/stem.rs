//! Stemming token filter and stemmer implementations.

use super::{Filter, map_words};
use crate::analysis::token::TokenStream;
use crate::error::Result;
use crate::language::Language;

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;
}

pub mod snowball;

pub use snowball::SnowballStemmer;

/// Filter that applies stemming to tokens.
pub struct StemFilter {
    stemmer: Box<dyn Stemmer>,
}

impl std::fmt::Debug for StemFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemFilter")
            .field("stemmer", &self.stemmer.name())
            .finish()
    }
}

impl StemFilter {
    /// Create a new stem filter with the Spanish Snowball stemmer.
    pub fn new() -> Self {
        Self::for_language(Language::Spanish)
    }

    /// Create a stem filter with the Snowball stemmer of a language.
    pub fn for_language(language: Language) -> Self {
        StemFilter {
            stemmer: Box::new(SnowballStemmer::new(language)),
        }
    }
}

impl Default for StemFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StemFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(map_words(tokens, |word| Some(self.stemmer.stem(word))))
    }

    fn name(&self) -> &'static str {
        "stem"
    }
}
