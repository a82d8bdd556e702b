//! Language names, codes and detection.
//!
//! Every component that depends on a language (stop words, stemming,
//! spelling, OCR) accepts loose names such as `"es"`, `"español"` or
//! `"Spanish"` and normalizes them through [`Language::parse`].
//!
//! # Examples
//!
//! ```
//! use contexto::language::{Language, define_language};
//!
//! assert_eq!(Language::parse("Español").unwrap(), Language::Spanish);
//! assert_eq!(Language::German.ocr_code(), "deu");
//! assert_eq!(define_language("ingles", false).unwrap(), "english");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token_filter::stop::stop_words;
use crate::cleaning::remove_accents;
use crate::error::{ContextoError, Result};

/// Supported languages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
    German,
    French,
}

impl Language {
    /// All supported languages, in detection tie-break order.
    pub const ALL: [Language; 4] = [
        Language::Spanish,
        Language::English,
        Language::German,
        Language::French,
    ];

    /// Parse a loose language name or code.
    pub fn parse(name: &str) -> Result<Self> {
        let key = remove_accents(&name.trim().to_lowercase());
        match key.as_str() {
            "es" | "espanol" | "esp" | "spanish" | "sp" | "spa" => Ok(Language::Spanish),
            "en" | "eng" | "english" | "ingles" | "ing" => Ok(Language::English),
            "ge" | "de" | "german" | "aleman" | "al" | "ale" => Ok(Language::German),
            "fr" | "fra" | "fre" | "french" | "frances" => Ok(Language::French),
            _ => Err(ContextoError::language(format!(
                "Unsupported language '{name}'. Supported: es, en, de, fr"
            ))),
        }
    }

    /// Two-letter ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
        }
    }

    /// Full English name in lowercase.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Spanish => "spanish",
            Language::English => "english",
            Language::German => "german",
            Language::French => "french",
        }
    }

    /// Three-letter code used by Tesseract language packs.
    pub fn ocr_code(&self) -> &'static str {
        isolang::Language::from_639_1(self.code())
            .map(|lang| lang.to_639_3())
            .unwrap_or("spa")
    }

    /// Snowball algorithm for this language.
    pub fn stemmer_algorithm(&self) -> rust_stemmers::Algorithm {
        match self {
            Language::Spanish => rust_stemmers::Algorithm::Spanish,
            Language::English => rust_stemmers::Algorithm::English,
            Language::German => rust_stemmers::Algorithm::German,
            Language::French => rust_stemmers::Algorithm::French,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = ContextoError;

    fn from_str(s: &str) -> Result<Self> {
        Language::parse(s)
    }
}

/// Normalize a language name to its code (`simplified`) or its full name.
pub fn define_language(name: &str, simplified: bool) -> Result<String> {
    let language = Language::parse(name)?;
    Ok(if simplified {
        language.code().to_string()
    } else {
        language.name().to_string()
    })
}

/// Convert a Tesseract language spec such as `"es+en"` to `"spa+eng"`.
///
/// Parts that are not recognized language names are passed through unchanged
/// so that Tesseract-specific packs (`osd`, `spa_old`) keep working.
pub fn tesseract_language(spec: &str) -> String {
    spec.split('+')
        .map(|part| match Language::parse(part) {
            Ok(language) => language.ocr_code().to_string(),
            Err(_) => part.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join("+")
}

/// A detected language with its confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuess {
    pub language: Language,
    pub probability: f64,
}

/// Detect the language of a text from its stop-word profile.
///
/// Each word of the text that appears in a language's stop-word list counts
/// as a vote for that language; the probability is the winner's share of
/// all votes.
pub fn detect_language(text: &str) -> Result<LanguageGuess> {
    let words: Vec<String> = text
        .unicode_words()
        .map(|word| word.to_lowercase())
        .collect();
    if words.is_empty() {
        return Err(ContextoError::language("Cannot detect the language of an empty text"));
    }

    let profiles: Vec<(Language, &HashSet<String>)> = Language::ALL
        .iter()
        .map(|&language| (language, stop_words(language)))
        .collect();

    let mut scores = [0usize; 4];
    for word in &words {
        for (i, (_, profile)) in profiles.iter().enumerate() {
            if profile.contains(word.as_str()) {
                scores[i] += 1;
            }
        }
    }

    let total: usize = scores.iter().sum();
    if total == 0 {
        return Err(ContextoError::language(
            "No known words found to detect the language",
        ));
    }

    // First maximum wins so ties follow `Language::ALL`
    let mut best = 0;
    for i in 1..scores.len() {
        if scores[i] > scores[best] {
            best = i;
        }
    }

    let guess = LanguageGuess {
        language: Language::ALL[best],
        probability: scores[best] as f64 / total as f64,
    };
    log::debug!(
        "Detected language {} with probability {:.3}",
        guess.language,
        guess.probability
    );
    Ok(guess)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        for name in ["es", "ESP", "español", "Spanish", "spa"] {
            assert_eq!(Language::parse(name).unwrap(), Language::Spanish);
        }
        assert_eq!(Language::parse("inglés").unwrap(), Language::English);
        assert_eq!(Language::parse("alemán").unwrap(), Language::German);
        assert_eq!(Language::parse("francés").unwrap(), Language::French);
        assert!(Language::parse("klingon").is_err());
    }

    #[test]
    fn test_codes() {
        assert_eq!(Language::Spanish.ocr_code(), "spa");
        assert_eq!(Language::English.ocr_code(), "eng");
        assert_eq!(Language::French.ocr_code(), "fra");
        assert_eq!(define_language("de", true).unwrap(), "de");
        assert_eq!(define_language("fre", false).unwrap(), "french");
        assert_eq!("en".parse::<Language>().unwrap().to_string(), "en");
    }

    #[test]
    fn test_tesseract_language() {
        assert_eq!(tesseract_language("es+en"), "spa+eng");
        assert_eq!(tesseract_language("spa+osd"), "spa+osd");
    }

    #[test]
    fn test_detect_language() {
        let guess = detect_language("El perro de mi vecino es muy grande y no para de ladrar").unwrap();
        assert_eq!(guess.language, Language::Spanish);
        assert!(guess.probability > 0.5);

        let guess = detect_language("The dog of my neighbour is very big and it will not stop").unwrap();
        assert_eq!(guess.language, Language::English);

        assert!(detect_language("").is_err());
        assert!(detect_language("12345").is_err());
    }
}
