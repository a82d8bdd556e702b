//! Snowball stemmer backed by `rust-stemmers`.
//!
//! ```
//! use contexto::analysis::token_filter::stem::{SnowballStemmer, Stemmer};
//! use contexto::language::Language;
//!
//! let stemmer = SnowballStemmer::new(Language::Spanish);
//! assert_eq!(stemmer.stem("bibliotecas"), "bibliotec");
//! ```

use crate::analysis::token_filter::stem::Stemmer;
use crate::language::Language;

/// Snowball stemmer for one language.
pub struct SnowballStemmer {
    language: Language,
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    pub fn new(language: Language) -> Self {
        SnowballStemmer {
            language,
            inner: rust_stemmers::Stemmer::create(language.stemmer_algorithm()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl std::fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowballStemmer")
            .field("language", &self.language)
            .finish()
    }
}

impl Stemmer for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).into_owned()
    }

    fn name(&self) -> &'static str {
        "snowball"
    }
}
