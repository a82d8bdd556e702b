//! Stemming of whole texts with the Snowball algorithms.
//!
//! # Examples
//!
//! ```
//! use contexto::language::Language;
//! use contexto::stemming::Stemmer;
//!
//! let stemmer = Stemmer::new(Language::Spanish);
//! assert_eq!(stemmer.stem_text("¡Las casas!", true), "las cas");
//! ```

use crate::analysis::token_filter::stem::{SnowballStemmer, Stemmer as _};
use crate::cleaning::basic_cleaning;
use crate::error::Result;
use crate::language::{Language, detect_language};

/// Snowball stemmer for one language.
#[derive(Debug)]
pub struct Stemmer {
    inner: SnowballStemmer,
}

impl Stemmer {
    pub fn new(language: Language) -> Self {
        Stemmer {
            inner: SnowballStemmer::new(language),
        }
    }

    /// Build a stemmer from a loose language name.
    pub fn from_name(language: &str) -> Result<Self> {
        Ok(Self::new(Language::parse(language)?))
    }

    pub fn language(&self) -> Language {
        self.inner.language()
    }

    pub fn stem_word(&self, word: &str) -> String {
        self.inner.stem(word)
    }

    /// Stem every space-separated word of a text.
    ///
    /// With `clean`, the text first goes through [`basic_cleaning`].
    pub fn stem_text(&self, text: &str, clean: bool) -> String {
        let text = if clean {
            basic_cleaning(text, true)
        } else {
            text.to_string()
        };
        text.split(' ')
            .map(|word| self.stem_word(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Stem a text in `language`; `"auto"` detects the language first.
pub fn stem_text(text: &str, language: &str, clean: bool) -> Result<String> {
    let language = if language.trim().eq_ignore_ascii_case("auto") {
        detect_language(text)?.language
    } else {
        Language::parse(language)?
    };
    Ok(Stemmer::new(language).stem_text(text, clean))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_text() {
        let stemmer = Stemmer::new(Language::Spanish);
        assert_eq!(stemmer.stem_word("corriendo"), "corr");
        assert_eq!(stemmer.stem_text("casas bonitas", false), "cas bonit");
        assert_eq!(stemmer.language(), Language::Spanish);
    }

    #[test]
    fn test_stem_text_wrapper() {
        assert_eq!(stem_text("The running dogs", "en", true).unwrap(), "the run dog");
        assert_eq!(stem_text("the running dogs", "auto", false).unwrap(), "the run dog");
        assert!(stem_text("hola", "xx", false).is_err());
    }
}
