//! Word-frequency dictionaries for spelling correction.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::stop::stop_words;
use crate::error::{ContextoError, Result};
use crate::language::Language;

const SPANISH_FREQUENCIES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/spelling/es.txt"));
const ENGLISH_FREQUENCIES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/spelling/en.txt"));

/// A dictionary that stores lowercase words and their frequencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellingDictionary {
    words: HashMap<String, u32>,
    /// Sum of all frequencies, for probabilities
    total_count: u64,
}

impl SpellingDictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frequency of a word.
    pub fn add_word<S: AsRef<str>>(&mut self, word: S, frequency: u32) {
        let normalized = word.as_ref().to_lowercase();
        let old_freq = self.words.insert(normalized, frequency).unwrap_or(0);
        self.total_count = self.total_count - old_freq as u64 + frequency as u64;
    }

    /// Increment the frequency of a word by 1.
    pub fn increment_word(&mut self, word: &str) {
        let current = self.frequency(word);
        self.add_word(word, current.saturating_add(1));
    }

    /// Remove a word. Returns its previous frequency.
    pub fn remove_word(&mut self, word: &str) -> Option<u32> {
        let removed = self.words.remove(&word.to_lowercase());
        if let Some(freq) = removed {
            self.total_count -= freq as u64;
        }
        removed
    }

    /// Check if a word exists in the dictionary.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    /// Get the frequency of a word.
    pub fn frequency(&self, word: &str) -> u32 {
        self.words.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    /// Get the probability of a word (frequency / total_count).
    pub fn probability(&self, word: &str) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.frequency(word) as f64 / self.total_count as f64
    }

    /// Get all words in the dictionary.
    pub fn words(&self) -> &HashMap<String, u32> {
        &self.words
    }

    /// Get the total number of unique words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Get the total frequency count.
    pub fn total_frequency(&self) -> u64 {
        self.total_count
    }

    /// Load dictionary from a text file with one word per line.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut dictionary = SpellingDictionary::new();
        let reader = BufReader::new(File::open(path)?);

        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if !word.is_empty() && word.chars().all(char::is_alphabetic) {
                dictionary.increment_word(word);
            }
        }

        Ok(dictionary)
    }

    /// Load dictionary from a frequency file with format "word frequency" per line.
    pub fn load_from_frequency_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse_frequencies(&content))
    }

    /// Parse "word frequency" lines. Repeated words keep the larger frequency.
    pub fn parse_frequencies(content: &str) -> Self {
        let mut dictionary = SpellingDictionary::new();
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(word), Some(frequency)) = (parts.next(), parts.next())
                && let Ok(frequency) = frequency.parse::<u32>()
                && word.chars().all(char::is_alphabetic)
            {
                let current = dictionary.frequency(word);
                dictionary.add_word(word, current.max(frequency));
            }
        }
        dictionary
    }

    /// Load a JSON document: either a list of words (each counted once) or an
    /// object mapping words to frequencies.
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_json_value(&value)
    }

    /// Build a dictionary from a JSON list of words or a word → frequency object.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let mut dictionary = SpellingDictionary::new();
        match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    let word = item.as_str().ok_or_else(|| {
                        ContextoError::invalid_argument("dictionary lists must contain strings")
                    })?;
                    dictionary.increment_word(word);
                }
            }
            serde_json::Value::Object(map) => {
                for (word, frequency) in map {
                    let frequency = frequency.as_u64().ok_or_else(|| {
                        ContextoError::invalid_argument(format!(
                            "frequency of '{word}' must be a non-negative integer"
                        ))
                    })?;
                    dictionary.add_word(word, frequency.min(u32::MAX as u64) as u32);
                }
            }
            _ => {
                return Err(ContextoError::invalid_argument(
                    "a dictionary must be a JSON list or object",
                ));
            }
        }
        Ok(dictionary)
    }

    /// Create a dictionary from a corpus of text.
    pub fn from_corpus(text: &str) -> Self {
        let mut dictionary = SpellingDictionary::new();

        let words = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|word| word.chars().count() > 1);

        for word in words {
            dictionary.increment_word(word);
        }

        dictionary
    }

    /// Get the most frequent words in the dictionary.
    pub fn most_frequent_words(&self, limit: usize) -> Vec<(String, u32)> {
        let mut word_freq: Vec<(String, u32)> = self
            .words
            .iter()
            .map(|(word, freq)| (word.clone(), *freq))
            .collect();

        word_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        word_freq.truncate(limit);
        word_freq
    }

    /// Merge another dictionary into this one, adding frequencies.
    pub fn merge(&mut self, other: &SpellingDictionary) {
        for (word, frequency) in &other.words {
            let current = self.frequency(word);
            self.add_word(word, current.saturating_add(*frequency));
        }
    }

    /// Set the frequency of every word of `frequencies`, replacing the current
    /// one. A frequency of 0 removes the word.
    pub fn set_frequencies<'a, I>(&mut self, frequencies: I)
    where
        I: IntoIterator<Item = (&'a String, &'a u32)>,
    {
        for (word, &frequency) in frequencies {
            if frequency == 0 {
                self.remove_word(word);
            } else {
                self.add_word(word, frequency);
            }
        }
    }

    /// Remove words with frequency below the threshold.
    pub fn prune_low_frequency(&mut self, min_frequency: u32) {
        let words_to_remove: Vec<String> = self
            .words
            .iter()
            .filter(|&(_, &freq)| freq < min_frequency)
            .map(|(word, _)| word.clone())
            .collect();

        for word in words_to_remove {
            self.remove_word(&word);
        }
    }

    /// Save dictionary to a frequency file, most frequent words first.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        for (word, frequency) in self.most_frequent_words(self.words.len()) {
            writeln!(file, "{word} {frequency}")?;
        }
        file.flush()?;
        Ok(())
    }

    /// Save dictionary as a JSON word → frequency object.
    pub fn save_to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, &self.words)?;
        Ok(())
    }
}

/// Built-in dictionaries, one per supported language.
pub struct BuiltinDictionary;

impl BuiltinDictionary {
    /// Dictionary shipped with the crate for `language`.
    ///
    /// Spanish and English come from frequency lists; German and French only
    /// hold their stop words.
    pub fn for_language(language: Language) -> SpellingDictionary {
        match language {
            Language::Spanish => SpellingDictionary::parse_frequencies(SPANISH_FREQUENCIES),
            Language::English => SpellingDictionary::parse_frequencies(ENGLISH_FREQUENCIES),
            Language::German | Language::French => {
                let mut dictionary = SpellingDictionary::new();
                for word in stop_words(language) {
                    dictionary.increment_word(word);
                }
                dictionary
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_dictionary_basic_operations() {
        let mut dict = SpellingDictionary::new();

        assert!(!dict.contains("hola"));
        assert_eq!(dict.frequency("hola"), 0);

        dict.add_word("hola", 5);
        assert!(dict.contains("HOLA"));
        assert_eq!(dict.total_frequency(), 5);

        dict.increment_word("Hola");
        assert_eq!(dict.frequency("hola"), 6);

        dict.add_word("mundo", 3);
        assert_eq!(dict.word_count(), 2);
        assert_eq!(dict.total_frequency(), 9);

        assert_eq!(dict.remove_word("mundo"), Some(3));
        assert_eq!(dict.total_frequency(), 6);
        assert_eq!(dict.remove_word("mundo"), None);
    }

    #[test]
    fn test_dictionary_probability() {
        let mut dict = SpellingDictionary::new();
        dict.add_word("casa", 6);
        dict.add_word("perro", 4);

        assert!((dict.probability("casa") - 0.6).abs() < 1e-6);
        assert!((dict.probability("perro") - 0.4).abs() < 1e-6);
        assert_eq!(dict.probability("gato"), 0.0);
    }

    #[test]
    fn test_from_corpus() {
        let dict = SpellingDictionary::from_corpus("El perro y el gato. El perro duerme.");
        assert_eq!(dict.frequency("el"), 3);
        assert_eq!(dict.frequency("perro"), 2);
        assert!(!dict.contains("y"));
    }

    #[test]
    fn test_merge_and_prune() {
        let mut dict1 = SpellingDictionary::new();
        dict1.add_word("hola", 5);
        let mut dict2 = SpellingDictionary::new();
        dict2.add_word("hola", 2);
        dict2.add_word("raro", 1);

        dict1.merge(&dict2);
        assert_eq!(dict1.frequency("hola"), 7);
        assert_eq!(dict1.word_count(), 2);

        dict1.add_word("tope", u32::MAX - 1);
        let mut dict3 = SpellingDictionary::new();
        dict3.add_word("tope", 10);
        dict1.merge(&dict3);
        dict1.increment_word("tope");
        assert_eq!(dict1.frequency("tope"), u32::MAX);
        dict1.remove_word("tope");

        dict1.prune_low_frequency(2);
        assert!(!dict1.contains("raro"));
        assert_eq!(dict1.total_frequency(), 7);
        assert_eq!(dict1.most_frequent_words(5), vec![("hola".to_string(), 7)]);
    }

    #[test]
    fn test_set_frequencies_replaces() {
        let mut dict = SpellingDictionary::new();
        dict.add_word("casa", 40);
        dict.add_word("perro", 3);

        let frequencies = HashMap::from([
            ("Casa".to_string(), 5),
            ("perro".to_string(), 0),
            ("gato".to_string(), u32::MAX),
        ]);
        dict.set_frequencies(&frequencies);
        assert_eq!(dict.frequency("casa"), 5);
        assert!(!dict.contains("perro"));
        assert_eq!(dict.frequency("gato"), u32::MAX);
        assert_eq!(dict.total_frequency(), 5 + u32::MAX as u64);
    }

    #[test]
    fn test_file_round_trip() {
        let mut dict = SpellingDictionary::new();
        dict.add_word("canción", 5);
        dict.add_word("mundo", 3);

        let temp_file = NamedTempFile::new().unwrap();
        dict.save_to_file(temp_file.path()).unwrap();
        let loaded = SpellingDictionary::load_from_frequency_file(temp_file.path()).unwrap();
        assert_eq!(loaded, dict);

        let json_file = NamedTempFile::new().unwrap();
        dict.save_to_json(json_file.path()).unwrap();
        let loaded = SpellingDictionary::load_from_json(json_file.path()).unwrap();
        assert_eq!(loaded.frequency("canción"), 5);
    }

    #[test]
    fn test_load_from_simple_file_and_json_list() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "hola\nmundo\nhola\n123").unwrap();
        temp_file.flush().unwrap();
        let dict = SpellingDictionary::load_from_file(temp_file.path()).unwrap();
        assert_eq!(dict.frequency("hola"), 2);
        assert_eq!(dict.word_count(), 2);

        let value = serde_json::json!(["Uno", "dos", "uno"]);
        let dict = SpellingDictionary::from_json_value(&value).unwrap();
        assert_eq!(dict.frequency("uno"), 2);
        assert!(SpellingDictionary::from_json_value(&serde_json::json!(3)).is_err());
    }

    #[test]
    fn test_builtin_dictionaries() {
        let spanish = BuiltinDictionary::for_language(Language::Spanish);
        assert!(spanish.contains("casa"));
        assert!(spanish.frequency("información") > 700);
        assert!(spanish.word_count() > 300);

        assert!(BuiltinDictionary::for_language(Language::English).contains("house"));
        assert!(BuiltinDictionary::for_language(Language::German).contains("und"));
    }
}
