//! Pretrained word vectors and the averaging vectorizer built on them.
//!
//! Vectors are read from the plain-text format shared by word2vec, GloVe and
//! fastText exports: one `word v1 v2 ... vn` line per word, optionally
//! preceded by a `count dimension` header line.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::toktok::ToktokTokenizer;
use crate::error::{ContextoError, Result};
use crate::language::Language;
use crate::vectorization::{PARALLEL_THRESHOLD, Vectorizer, cosine_similarity};

/// Lookup table from words to dense vectors of one dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordVectors {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    /// Create an empty table of the given dimension.
    pub fn new(dim: usize) -> Self {
        WordVectors {
            dim,
            vectors: HashMap::new(),
        }
    }

    /// Load a text-format vector file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let vectors = Self::from_reader(reader)?;
        log::info!(
            "Loaded {} word vectors of dimension {} from {}",
            vectors.len(),
            vectors.dim,
            path.display()
        );
        Ok(vectors)
    }

    /// Parse text-format vectors from any reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table: Option<WordVectors> = None;

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values = parts
                .map(str::parse::<f32>)
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| {
                    ContextoError::vectorization(format!(
                        "Invalid number on line {}: {e}",
                        line_number + 1
                    ))
                })?;

            // "count dim" header
            if line_number == 0 && values.len() == 1 && word.parse::<usize>().is_ok() {
                continue;
            }

            let table = table.get_or_insert_with(|| WordVectors::new(values.len()));
            table.insert(word, values)?;
        }

        table.ok_or_else(|| ContextoError::vectorization("No word vectors found"))
    }

    /// Add or replace the vector of a word.
    pub fn insert<S: Into<String>>(&mut self, word: S, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dim {
            return Err(ContextoError::vectorization(format!(
                "Expected a vector of dimension {}, got {}",
                self.dim,
                vector.len()
            )));
        }
        self.vectors.insert(word.into(), vector);
        Ok(())
    }

    /// Vector of a word, trying its lowercase form when the exact form is missing.
    pub fn get(&self, word: &str) -> Option<&Vec<f32>> {
        self.vectors
            .get(word)
            .or_else(|| self.vectors.get(&word.to_lowercase()))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Vectorizer that averages the word vectors of a text's tokens.
pub struct Word2VecVectorizer {
    language: Language,
    vectors: WordVectors,
    max_length: Option<usize>,
    tokenizer: ToktokTokenizer,
}

impl std::fmt::Debug for Word2VecVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Word2VecVectorizer")
            .field("language", &self.language)
            .field("words", &self.vectors.len())
            .field("dim", &self.vectors.dim())
            .field("max_length", &self.max_length)
            .finish()
    }
}

impl Word2VecVectorizer {
    pub fn new(language: Language, vectors: WordVectors) -> Self {
        Word2VecVectorizer {
            language,
            vectors,
            max_length: None,
            tokenizer: ToktokTokenizer::new(),
        }
    }

    /// Load the vectors from a text-format file.
    pub fn from_file<P: AsRef<Path>>(language: Language, path: P) -> Result<Self> {
        Ok(Self::new(language, WordVectors::load(path)?))
    }

    /// Reject texts longer than `max_length` characters.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn vectors(&self) -> &WordVectors {
        &self.vectors
    }

    fn tokens(&self, text: &str) -> Result<Vec<String>> {
        if let Some(max_length) = self.max_length {
            let length = text.chars().count();
            if length > max_length {
                return Err(ContextoError::invalid_argument(format!(
                    "Text of {length} characters exceeds the maximum length of {max_length}"
                )));
            }
        }
        self.tokenizer.tokenize_words(text)
    }

    /// Average vector of the tokens of `text`.
    ///
    /// Unknown tokens count as zero vectors, unless `skip_unknown` is set, in
    /// which case only known tokens are averaged. A text without usable
    /// tokens maps to the zero vector.
    pub fn vectorize_text(&self, text: &str, skip_unknown: bool) -> Result<Vec<f32>> {
        let mut sum = vec![0.0; self.vectors.dim()];
        let mut count = 0usize;

        for token in self.tokens(text)? {
            match self.vectors.get(&token) {
                Some(vector) => {
                    sum.iter_mut().zip(vector).for_each(|(s, v)| *s += v);
                    count += 1;
                }
                None if !skip_unknown => count += 1,
                None => {}
            }
        }

        if count > 0 {
            sum.iter_mut().for_each(|s| *s /= count as f32);
        }
        Ok(sum)
    }

    /// Unique tokens of `text` with their vectors, in order of appearance.
    /// Unknown tokens get the zero vector.
    pub fn word_vectors(&self, text: &str) -> Result<Vec<(String, Vec<f32>)>> {
        let mut seen = HashSet::new();
        Ok(self
            .tokens(text)?
            .into_iter()
            .filter(|token| seen.insert(token.clone()))
            .map(|token| {
                let vector = self
                    .vectors
                    .get(&token)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0; self.vectors.dim()]);
                (token, vector)
            })
            .collect())
    }

    /// Cosine similarity between the average vectors of two texts.
    pub fn text_similarity(&self, text1: &str, text2: &str) -> Result<f32> {
        let v1 = self.vectorize_text(text1, false)?;
        let v2 = self.vectorize_text(text2, false)?;
        Ok(cosine_similarity(&v1, &v2))
    }
}

impl Vectorizer for Word2VecVectorizer {
    fn vectorize(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.len() >= PARALLEL_THRESHOLD {
            texts
                .par_iter()
                .map(|text| self.vectorize_text(text, false))
                .collect()
        } else {
            texts
                .iter()
                .map(|text| self.vectorize_text(text, false))
                .collect()
        }
    }

    fn name(&self) -> &'static str {
        "word2vec"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const VECTORS: &str = "3 2\nperro 1.0 0.0\ngato 0.8 0.2\nmesa 0.0 1.0\n";

    fn vectorizer() -> Word2VecVectorizer {
        let vectors = WordVectors::from_reader(Cursor::new(VECTORS)).unwrap();
        Word2VecVectorizer::new(Language::Spanish, vectors)
    }

    #[test]
    fn test_parse_vectors() {
        let vectors = WordVectors::from_reader(Cursor::new(VECTORS)).unwrap();
        assert_eq!(vectors.dim(), 2);
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors.get("Perro"), Some(&vec![1.0, 0.0]));

        let headerless = WordVectors::from_reader(Cursor::new("uno 1 2 3\n")).unwrap();
        assert_eq!(headerless.dim(), 3);

        assert!(WordVectors::from_reader(Cursor::new("uno 1 2\ndos 1\n")).is_err());
        assert!(WordVectors::from_reader(Cursor::new("uno 1 x\n")).is_err());
        assert!(WordVectors::from_reader(Cursor::new("")).is_err());
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{VECTORS}").unwrap();
        file.flush().unwrap();
        let vectorizer = Word2VecVectorizer::from_file(Language::Spanish, file.path()).unwrap();
        assert_eq!(vectorizer.vectors().len(), 3);
    }

    #[test]
    fn test_vectorize_text() {
        let vectorizer = vectorizer();
        assert_eq!(vectorizer.vectorize_text("perro mesa", false).unwrap(), vec![0.5, 0.5]);
        assert_eq!(vectorizer.vectorize_text("perro azul", false).unwrap(), vec![0.5, 0.0]);
        assert_eq!(vectorizer.vectorize_text("perro azul", true).unwrap(), vec![1.0, 0.0]);
        assert_eq!(vectorizer.vectorize_text("", true).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_word_vectors_and_similarity() {
        let vectorizer = vectorizer();
        let words = vectorizer.word_vectors("perro azul perro").unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1], ("azul".to_string(), vec![0.0, 0.0]));

        let close = vectorizer.text_similarity("perro", "gato").unwrap();
        let far = vectorizer.text_similarity("perro", "mesa").unwrap();
        assert!(close > far);
        assert!(far.abs() < 1e-6);
    }

    #[test]
    fn test_max_length() {
        let vectorizer = vectorizer().with_max_length(5);
        assert!(vectorizer.vectorize_text("perro", false).is_ok());
        assert!(vectorizer.vectorize_text("perro gato", false).is_err());
    }
}
