//! Spelling corrector built on a word-frequency dictionary.
//!
//! Unknown words are replaced by the most probable dictionary word reachable
//! through single-character edits (deletions, transpositions, replacements,
//! insertions) over the alphabet of the corrector's language.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{detokenize, tokenize};
use crate::cleaning::basic_cleaning;
use crate::error::{ContextoError, Result};
use crate::language::{Language, detect_language};
use crate::spelling::dictionary::{BuiltinDictionary, SpellingDictionary};

const SPANISH_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzáéíóúüñ";
const ENGLISH_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
const GERMAN_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzäöüß";
const FRENCH_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzàâæçéèêëîïôœùûüÿ";

/// Configuration for the spelling corrector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorConfig {
    /// Maximum edit distance for candidates (1 or 2).
    pub max_distance: usize,
    /// Keep the built-in dictionary under a JSON dictionary file. Otherwise
    /// the file replaces it.
    pub keep_builtin: bool,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        CorrectorConfig {
            max_distance: 2,
            keep_builtin: false,
        }
    }
}

/// Where extra dictionary words come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DictionarySource {
    /// Each occurrence adds one to the frequency of the word.
    Words(Vec<String>),
    /// Words with the frequency they take, replacing the current one.
    Frequencies(HashMap<String, u32>),
    /// A JSON list of words or a word → frequency object.
    JsonFile(PathBuf),
}

impl DictionarySource {
    /// Read a JSON file as a `Words` or `Frequencies` source.
    fn from_json(path: &Path) -> Result<DictionarySource> {
        let reader = BufReader::new(File::open(path)?);
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        let source = match value {
            serde_json::Value::Array(items) => DictionarySource::Words(
                items
                    .iter()
                    .map(|item| {
                        item.as_str().map(String::from).ok_or_else(|| {
                            ContextoError::invalid_argument("dictionary lists must contain strings")
                        })
                    })
                    .collect::<Result<_>>()?,
            ),
            serde_json::Value::Object(map) => DictionarySource::Frequencies(
                map.iter()
                    .map(|(word, frequency)| {
                        let frequency = frequency.as_u64().ok_or_else(|| {
                            ContextoError::invalid_argument(format!(
                                "frequency of '{word}' must be a non-negative integer"
                            ))
                        })?;
                        Ok((word.clone(), frequency.min(u32::MAX as u64) as u32))
                    })
                    .collect::<Result<_>>()?,
            ),
            _ => {
                return Err(ContextoError::invalid_argument(
                    "a dictionary must be a JSON list or object",
                ));
            }
        };
        Ok(source)
    }

    fn apply(&self, dictionary: &mut SpellingDictionary) -> Result<()> {
        match self {
            DictionarySource::Words(words) => {
                for word in words {
                    dictionary.increment_word(word);
                }
            }
            DictionarySource::Frequencies(frequencies) => dictionary.set_frequencies(frequencies),
            DictionarySource::JsonFile(path) => DictionarySource::from_json(path)?.apply(dictionary)?,
        }
        Ok(())
    }
}

/// Spelling corrector for one language.
#[derive(Debug, Clone)]
pub struct Corrector {
    language: Language,
    dictionary: SpellingDictionary,
    config: CorrectorConfig,
    alphabet: Vec<char>,
}

impl Corrector {
    /// Create a corrector over the built-in dictionary of `language`, updated
    /// with `source` when given. A JSON file source replaces the built-in
    /// dictionary unless [`CorrectorConfig::keep_builtin`] is set.
    pub fn new(language: Language, source: Option<DictionarySource>, max_distance: usize) -> Result<Self> {
        let config = CorrectorConfig {
            max_distance,
            ..CorrectorConfig::default()
        };
        Self::with_config(language, source, config)
    }

    /// Create a corrector with a custom configuration.
    pub fn with_config(
        language: Language,
        source: Option<DictionarySource>,
        config: CorrectorConfig,
    ) -> Result<Self> {
        if !(1..=2).contains(&config.max_distance) {
            return Err(ContextoError::invalid_argument(format!(
                "max_distance must be 1 or 2, got {}",
                config.max_distance
            )));
        }

        let mut dictionary = match &source {
            Some(DictionarySource::JsonFile(_)) if !config.keep_builtin => SpellingDictionary::new(),
            _ => BuiltinDictionary::for_language(language),
        };
        if let Some(source) = &source {
            source.apply(&mut dictionary)?;
        }
        log::debug!(
            "Spelling corrector for {} with {} words",
            language.name(),
            dictionary.word_count()
        );

        let alphabet = match language {
            Language::Spanish => SPANISH_ALPHABET,
            Language::English => ENGLISH_ALPHABET,
            Language::German => GERMAN_ALPHABET,
            Language::French => FRENCH_ALPHABET,
        };

        Ok(Corrector {
            language,
            dictionary,
            config,
            alphabet: alphabet.chars().collect(),
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &SpellingDictionary {
        &self.dictionary
    }

    /// Update the dictionary with `source`: listed words add one each and
    /// given frequencies replace the current ones.
    pub fn update_dictionary(&mut self, source: DictionarySource) -> Result<()> {
        source.apply(&mut self.dictionary)
    }

    /// Add words to the dictionary, each counted once.
    pub fn add_words<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.dictionary.increment_word(word.as_ref());
        }
    }

    /// Remove words from the dictionary.
    pub fn remove_words<S: AsRef<str>>(&mut self, words: &[S]) {
        for word in words {
            self.dictionary.remove_word(word.as_ref());
        }
    }

    /// The words of `words` found in the dictionary.
    pub fn known_words<S: AsRef<str>>(&self, words: &[S]) -> HashSet<String> {
        words
            .iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| self.dictionary.contains(w))
            .collect()
    }

    /// The words of `words` missing from the dictionary.
    pub fn unknown_words<S: AsRef<str>>(&self, words: &[S]) -> HashSet<String> {
        words
            .iter()
            .map(|w| w.as_ref().to_lowercase())
            .filter(|w| !self.dictionary.contains(w))
            .collect()
    }

    pub fn word_frequency(&self, word: &str) -> u32 {
        self.dictionary.frequency(word)
    }

    pub fn word_probability(&self, word: &str) -> f64 {
        self.dictionary.probability(word)
    }

    /// Possible corrections of `word`, most probable first.
    ///
    /// A known word is its own only candidate. Otherwise dictionary words one
    /// edit away are preferred over words two edits away. Returns `None` when
    /// nothing in the dictionary is close enough.
    pub fn candidates(&self, word: &str) -> Option<Vec<String>> {
        let word = word.to_lowercase();
        if self.dictionary.contains(&word) {
            return Some(vec![word]);
        }

        let first_edits = self.generate_edits(&word);
        let mut found = self.keep_known(first_edits.iter());

        if found.is_empty() && self.config.max_distance >= 2 {
            let second_edits: HashSet<String> = first_edits
                .iter()
                .flat_map(|edit| self.generate_edits(edit))
                .collect();
            found = self.keep_known(second_edits.iter());
        }

        if found.is_empty() {
            return None;
        }

        found.sort_by(|a, b| {
            self.dictionary
                .frequency(b)
                .cmp(&self.dictionary.frequency(a))
                .then_with(|| a.cmp(b))
        });
        Some(found)
    }

    /// The most probable correction of `word`, keeping its capitalization.
    ///
    /// Words with non-alphabetic characters are returned unchanged, as are
    /// words with no candidate.
    pub fn correct_word(&self, word: &str) -> String {
        if word.is_empty() || !word.chars().all(char::is_alphabetic) {
            return word.to_string();
        }

        let Some(best) = self.candidates(word).and_then(|c| c.into_iter().next()) else {
            return word.to_string();
        };
        if best == word.to_lowercase() {
            return word.to_string();
        }
        log::trace!("Corrected '{word}' to '{best}'");
        match_case(word, &best)
    }

    /// Correct every word of a text.
    ///
    /// With `clean`, the text first goes through [`basic_cleaning`] keeping
    /// numbers.
    pub fn correct_text(&self, text: &str, clean: bool) -> Result<String> {
        let text = if clean {
            basic_cleaning(text, false)
        } else {
            text.to_string()
        };

        let corrected: Vec<String> = tokenize(&text, None)?
            .iter()
            .map(|token| self.correct_word(token))
            .collect();
        Ok(detokenize(&corrected, None))
    }

    fn keep_known<'a>(&self, edits: impl Iterator<Item = &'a String>) -> Vec<String> {
        edits
            .filter(|edit| self.dictionary.contains(edit))
            .cloned()
            .collect()
    }

    /// Generate all possible single edits of a word.
    fn generate_edits(&self, word: &str) -> HashSet<String> {
        let mut edits = HashSet::new();
        let chars: Vec<char> = word.chars().collect();
        let len = chars.len();

        // Deletions
        for i in 0..len {
            let mut new_word = chars.clone();
            new_word.remove(i);
            edits.insert(new_word.into_iter().collect());
        }

        // Transpositions
        for i in 0..len.saturating_sub(1) {
            let mut new_word = chars.clone();
            new_word.swap(i, i + 1);
            edits.insert(new_word.into_iter().collect());
        }

        // Replacements
        for i in 0..len {
            for &ch in &self.alphabet {
                if ch != chars[i] {
                    let mut new_word = chars.clone();
                    new_word[i] = ch;
                    edits.insert(new_word.into_iter().collect());
                }
            }
        }

        // Insertions
        for i in 0..=len {
            for &ch in &self.alphabet {
                let mut new_word = chars.clone();
                new_word.insert(i, ch);
                edits.insert(new_word.into_iter().collect());
            }
        }

        edits
    }
}

/// Apply the capitalization of `original` to `corrected`.
fn match_case(original: &str, corrected: &str) -> String {
    let letters: Vec<char> = original.chars().collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return corrected.to_uppercase();
    }
    if letters.first().is_some_and(|c| c.is_uppercase()) {
        let mut chars = corrected.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    corrected.to_string()
}

/// Correct a text in `language`; `"auto"` detects the language first.
pub fn correct_text(
    text: &str,
    language: &str,
    source: Option<DictionarySource>,
    max_distance: usize,
    clean: bool,
) -> Result<String> {
    let language = if language.trim().eq_ignore_ascii_case("auto") {
        detect_language(text)?.language
    } else {
        Language::parse(language)?
    };
    Corrector::new(language, source, max_distance)?.correct_text(text, clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn spanish() -> Corrector {
        Corrector::new(Language::Spanish, None, 2).unwrap()
    }

    #[test]
    fn test_known_and_unknown_words() {
        let corrector = spanish();
        let words = ["casa", "Mundo", "xqzw"];
        assert_eq!(
            corrector.known_words(&words),
            HashSet::from(["casa".to_string(), "mundo".to_string()])
        );
        assert_eq!(
            corrector.unknown_words(&words),
            HashSet::from(["xqzw".to_string()])
        );
        assert!(corrector.word_frequency("casa") > 0);
        assert!(corrector.word_probability("casa") > 0.0);
    }

    #[test]
    fn test_candidates() {
        let corrector = spanish();
        assert_eq!(corrector.candidates("casa"), Some(vec!["casa".to_string()]));
        assert_eq!(
            corrector.candidates("mumdo").unwrap().first().map(String::as_str),
            Some("mundo")
        );
        assert_eq!(corrector.candidates("qqqqqqqqqq"), None);
    }

    #[test]
    fn test_correct_word() {
        let corrector = spanish();
        assert_eq!(corrector.correct_word("ejenplo"), "ejemplo");
        assert_eq!(corrector.correct_word("Cassa"), "Casa");
        assert_eq!(corrector.correct_word("ortografia"), "ortografía");
        assert_eq!(corrector.correct_word("palabr"), "palabra");
        assert_eq!(corrector.correct_word("3.14"), "3.14");
    }

    #[test]
    fn test_correct_text() {
        let corrector = spanish();
        let corrected = corrector.correct_text("Un ejenplo de texto, en el mumdo.", false).unwrap();
        assert_eq!(corrected, "Un ejemplo de texto, en el mundo.");
    }

    #[test]
    fn test_dictionary_updates() {
        let mut corrector = spanish();
        assert!(!corrector.dictionary().contains("contexto"));
        corrector.add_words(&["contexto"]);
        assert_eq!(corrector.correct_word("contexta"), "contexto");

        corrector.remove_words(&["contexto"]);
        assert!(corrector.unknown_words(&["contexto"]).contains("contexto"));

        let frequencies = HashMap::from([("bogotá".to_string(), 50)]);
        corrector
            .update_dictionary(DictionarySource::Frequencies(frequencies))
            .unwrap();
        assert_eq!(corrector.correct_word("bogota"), "bogotá");
    }

    #[test]
    fn test_frequencies_replace_builtin_counts() {
        assert!(spanish().word_frequency("casa") > 5);

        let frequencies = HashMap::from([("casa".to_string(), 5)]);
        let corrector = Corrector::new(
            Language::Spanish,
            Some(DictionarySource::Frequencies(frequencies)),
            2,
        )
        .unwrap();
        assert_eq!(corrector.word_frequency("casa"), 5);
        assert!(corrector.word_frequency("mundo") > 0);
    }

    #[test]
    fn test_maximum_frequency_saturates() {
        let frequencies = HashMap::from([("de".to_string(), u32::MAX)]);
        let mut corrector = Corrector::new(
            Language::Spanish,
            Some(DictionarySource::Frequencies(frequencies)),
            2,
        )
        .unwrap();
        assert_eq!(corrector.word_frequency("de"), u32::MAX);

        corrector.add_words(&["de"]);
        corrector
            .update_dictionary(DictionarySource::Words(vec!["de".to_string()]))
            .unwrap();
        assert_eq!(corrector.word_frequency("de"), u32::MAX);
    }

    #[test]
    fn test_json_file_replaces_builtin_dictionary() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("palabras.json");
        fs::write(&path, r#"{"contexto": 50}"#).unwrap();

        let corrector =
            Corrector::new(Language::Spanish, Some(DictionarySource::JsonFile(path.clone())), 2)
                .unwrap();
        assert_eq!(corrector.dictionary().word_count(), 1);
        assert!(!corrector.dictionary().contains("casa"));

        let config = CorrectorConfig {
            keep_builtin: true,
            ..CorrectorConfig::default()
        };
        let kept =
            Corrector::with_config(Language::Spanish, Some(DictionarySource::JsonFile(path)), config)
                .unwrap();
        assert!(kept.dictionary().contains("casa"));
        assert_eq!(kept.word_frequency("contexto"), 50);
    }

    #[test]
    fn test_json_list_adds_to_frequencies() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lista.json");
        fs::write(&path, r#"["casa", "Casa"]"#).unwrap();

        let mut corrector = spanish();
        let before = corrector.word_frequency("casa");
        corrector
            .update_dictionary(DictionarySource::JsonFile(path))
            .unwrap();
        assert_eq!(corrector.word_frequency("casa"), before + 2);

        let bad = temp_dir.path().join("mala.json");
        fs::write(&bad, r#"{"casa": -1}"#).unwrap();
        assert!(corrector.update_dictionary(DictionarySource::JsonFile(bad)).is_err());
    }

    #[test]
    fn test_invalid_distance() {
        assert!(Corrector::new(Language::Spanish, None, 3).is_err());
        assert!(Corrector::new(Language::Spanish, None, 0).is_err());
    }

    #[test]
    fn test_correct_text_wrapper() {
        let corrected = correct_text("Hello, the hosue is", "en", None, 1, false).unwrap();
        assert_eq!(corrected, "Hello, the house is");
        assert!(correct_text("hola", "klingon", None, 2, false).is_err());
    }
}
