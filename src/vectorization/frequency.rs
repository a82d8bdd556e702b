//! Bag-of-words and TF-IDF vectorization over a fitted vocabulary.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::stop::stop_words;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::{ContextoError, Result};
use crate::language::Language;
use crate::util::persist::{load_object, save_object};
use crate::vectorization::{
    PARALLEL_THRESHOLD, Vectorizer, extract_terms, l2_normalize, validate_ngram_range,
};

/// Which weights a [`FrequencyVectorizer`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyKind {
    /// Raw term counts
    #[default]
    Bow,
    /// Term frequency times smoothed inverse document frequency
    TfIdf,
}

impl FrequencyKind {
    pub fn name(&self) -> &'static str {
        match self {
            FrequencyKind::Bow => "bow",
            FrequencyKind::TfIdf => "tfidf",
        }
    }
}

impl FromStr for FrequencyKind {
    type Err = ContextoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bow" => Ok(FrequencyKind::Bow),
            "tfidf" | "tf-idf" | "tf_idf" | "tf idf" => Ok(FrequencyKind::TfIdf),
            _ => Err(ContextoError::invalid_argument(format!(
                "Unknown vectorizer kind '{s}'. Use 'bow' or 'tfidf'"
            ))),
        }
    }
}

/// Configuration of a [`FrequencyVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyVectorizerConfig {
    pub kind: FrequencyKind,
    /// Smallest and largest n-gram size
    pub ngram_range: (usize, usize),
    /// Keep only the most frequent terms
    pub max_features: Option<usize>,
    /// Reweight TF-IDF terms by their inverse document frequency
    pub use_idf: bool,
    pub lowercase: bool,
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum share of documents a term may appear in
    pub max_df: f64,
    /// Drop the built-in stop words of a language before counting
    pub stop_words: Option<Language>,
}

impl Default for FrequencyVectorizerConfig {
    fn default() -> Self {
        FrequencyVectorizerConfig {
            kind: FrequencyKind::Bow,
            ngram_range: (1, 1),
            max_features: None,
            use_idf: true,
            lowercase: true,
            min_df: 1,
            max_df: 1.0,
            stop_words: None,
        }
    }
}

/// Non-zero entries of a vector as `(column, value)`, sorted by column.
pub type SparseRow = Vec<(usize, f32)>;

/// Fitted vocabulary: terms sorted alphabetically and their IDF weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f32>,
}

/// Bag-of-words / TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyVectorizer {
    config: FrequencyVectorizerConfig,
    vocabulary: Option<Vocabulary>,
    #[serde(skip)]
    tokenizer: RegexTokenizer,
}

impl FrequencyVectorizer {
    /// Create an unfitted vectorizer of the given kind with default options.
    pub fn new(kind: FrequencyKind) -> Self {
        Self::with_config(FrequencyVectorizerConfig {
            kind,
            ..FrequencyVectorizerConfig::default()
        })
    }

    pub fn with_config(config: FrequencyVectorizerConfig) -> Self {
        FrequencyVectorizer {
            config,
            vocabulary: None,
            tokenizer: RegexTokenizer::default(),
        }
    }

    /// Restore a vectorizer saved by [`FrequencyVectorizer::save`] or by
    /// [`FrequencyVectorizer::fit`] with an output path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_object(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_object(self, path)
    }

    pub fn config(&self) -> &FrequencyVectorizerConfig {
        &self.config
    }

    pub fn kind(&self) -> FrequencyKind {
        self.config.kind
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Learn the vocabulary (and IDF weights) of `texts`, optionally saving
    /// the fitted vectorizer to `output`.
    pub fn fit(&mut self, texts: &[&str], output: Option<&Path>) -> Result<()> {
        validate_ngram_range(self.config.ngram_range)?;
        if !(0.0..=1.0).contains(&self.config.max_df) {
            return Err(ContextoError::invalid_argument("max_df must be between 0 and 1"));
        }

        let mut term_counts: AHashMap<String, usize> = AHashMap::new();
        let mut doc_counts: AHashMap<String, usize> = AHashMap::new();

        for text in texts {
            let terms = self.terms(text)?;
            let mut doc_terms = HashSet::new();
            for term in terms {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
                doc_terms.insert(term);
            }
            for term in doc_terms {
                *doc_counts.entry(term).or_insert(0) += 1;
            }
        }

        let n_docs = texts.len();
        let max_doc_count = self.config.max_df * n_docs as f64;
        let mut kept: Vec<(String, usize)> = term_counts
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_counts.get(term).copied().unwrap_or(0);
                df >= self.config.min_df && df as f64 <= max_doc_count
            })
            .collect();

        if let Some(max_features) = self.config.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(max_features);
        }

        if kept.is_empty() {
            return Err(ContextoError::vectorization(
                "Empty vocabulary; the texts may only contain stop words or short tokens",
            ));
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        // Smooth IDF, as if one extra document contained every term
        let idf: Vec<f32> = terms
            .iter()
            .map(|term| {
                let df = doc_counts.get(term).copied().unwrap_or(0);
                (((1 + n_docs) as f32) / ((1 + df) as f32)).ln() + 1.0
            })
            .collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();

        log::debug!(
            "Fitted {} vectorizer with {} terms over {} documents",
            self.config.kind.name(),
            terms.len(),
            n_docs
        );
        self.vocabulary = Some(Vocabulary { terms, index, idf });

        if let Some(path) = output {
            self.save(path)?;
        }
        Ok(())
    }

    /// Fit on `texts` and return their vectors.
    pub fn fit_transform(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.fit(texts, None)?;
        self.transform(texts)
    }

    /// Dense document-term matrix of `texts`.
    pub fn transform(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let dim = self.vocabulary()?.len();
        let rows = self.transform_sparse(texts)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut dense = vec![0.0; dim];
                for (column, value) in row {
                    dense[column] = value;
                }
                dense
            })
            .collect())
    }

    /// Sparse document-term matrix of `texts`.
    pub fn transform_sparse(&self, texts: &[&str]) -> Result<Vec<SparseRow>> {
        let vocabulary = self.fitted()?;
        if texts.len() >= PARALLEL_THRESHOLD {
            texts
                .par_iter()
                .map(|text| self.transform_one(vocabulary, text))
                .collect()
        } else {
            texts
                .iter()
                .map(|text| self.transform_one(vocabulary, text))
                .collect()
        }
    }

    /// Vocabulary terms in column order.
    pub fn vocabulary(&self) -> Result<&[String]> {
        Ok(&self.fitted()?.terms)
    }

    /// Column of a term, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.as_ref()?.index.get(term).copied()
    }

    /// IDF weight of each column.
    pub fn idf(&self) -> Result<&[f32]> {
        Ok(&self.fitted()?.idf)
    }

    /// Terms with a non-zero weight in each vector.
    pub fn inverse(&self, vectors: &[Vec<f32>]) -> Result<Vec<Vec<String>>> {
        let terms = &self.fitted()?.terms;
        vectors
            .iter()
            .map(|vector| {
                if vector.len() != terms.len() {
                    return Err(ContextoError::vectorization(format!(
                        "Expected vectors of dimension {}, got {}",
                        terms.len(),
                        vector.len()
                    )));
                }
                Ok(vector
                    .iter()
                    .zip(terms)
                    .filter(|(value, _)| **value != 0.0)
                    .map(|(_, term)| term.clone())
                    .collect())
            })
            .collect()
    }

    fn fitted(&self) -> Result<&Vocabulary> {
        self.vocabulary
            .as_ref()
            .ok_or_else(|| ContextoError::not_fitted("FrequencyVectorizer"))
    }

    fn terms(&self, text: &str) -> Result<Vec<String>> {
        extract_terms(
            &self.tokenizer,
            text,
            self.config.lowercase,
            self.config.ngram_range,
            self.config.stop_words.map(stop_words),
        )
    }

    fn transform_one(&self, vocabulary: &Vocabulary, text: &str) -> Result<SparseRow> {
        let mut counts: AHashMap<usize, f32> = AHashMap::new();
        for term in self.terms(text)? {
            if let Some(&column) = vocabulary.index.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseRow = counts.into_iter().collect();
        row.sort_by_key(|&(column, _)| column);

        if self.config.kind == FrequencyKind::TfIdf {
            if self.config.use_idf {
                for (column, value) in row.iter_mut() {
                    *value *= vocabulary.idf[*column];
                }
            }
            let mut values: Vec<f32> = row.iter().map(|&(_, value)| value).collect();
            l2_normalize(&mut values);
            for ((_, value), normalized) in row.iter_mut().zip(values) {
                *value = normalized;
            }
        }
        Ok(row)
    }
}

impl Vectorizer for FrequencyVectorizer {
    fn vectorize(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.transform(texts)
    }

    fn name(&self) -> &'static str {
        self.config.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TEXTS: [&str; 3] = [
        "el perro come carne",
        "el gato come pescado",
        "el perro y el gato duermen",
    ];

    #[test]
    fn test_kind_parsing() {
        assert_eq!("BOW".parse::<FrequencyKind>().unwrap(), FrequencyKind::Bow);
        assert_eq!("tf idf".parse::<FrequencyKind>().unwrap(), FrequencyKind::TfIdf);
        assert_eq!("tf-idf".parse::<FrequencyKind>().unwrap(), FrequencyKind::TfIdf);
        assert!("lda".parse::<FrequencyKind>().is_err());
    }

    #[test]
    fn test_bow() {
        let mut vectorizer = FrequencyVectorizer::new(FrequencyKind::Bow);
        let vectors = vectorizer.fit_transform(&TEXTS).unwrap();
        let vocabulary = vectorizer.vocabulary().unwrap();
        assert_eq!(
            vocabulary,
            ["carne", "come", "duermen", "el", "gato", "perro", "pescado"]
        );
        assert_eq!(vectors[2], vec![0.0, 0.0, 1.0, 2.0, 1.0, 1.0, 0.0]);

        let inverse = vectorizer.inverse(&vectors[..1]).unwrap();
        assert_eq!(inverse[0], vec!["carne", "come", "el", "perro"]);
    }

    #[test]
    fn test_tfidf() {
        let mut vectorizer = FrequencyVectorizer::new(FrequencyKind::TfIdf);
        vectorizer.fit(&TEXTS, None).unwrap();

        let idf = vectorizer.idf().unwrap();
        // "el" appears in every document
        assert!((idf[3] - 1.0).abs() < 1e-6);
        // "carne" appears in one of three
        assert!((idf[0] - (2.0f32.ln() + 1.0)).abs() < 1e-6);

        let vectors = vectorizer.transform(&TEXTS).unwrap();
        for vector in &vectors {
            let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
        assert!(vectors[0][0] > vectors[0][3]);
    }

    #[test]
    fn test_max_features_and_ngrams() {
        let mut vectorizer = FrequencyVectorizer::with_config(FrequencyVectorizerConfig {
            max_features: Some(2),
            ..FrequencyVectorizerConfig::default()
        });
        vectorizer.fit(&TEXTS, None).unwrap();
        assert_eq!(vectorizer.vocabulary().unwrap(), ["come", "el"]);

        let mut bigrams = FrequencyVectorizer::with_config(FrequencyVectorizerConfig {
            ngram_range: (2, 2),
            min_df: 2,
            ..FrequencyVectorizerConfig::default()
        });
        bigrams.fit(&TEXTS, None).unwrap();
        assert_eq!(bigrams.vocabulary().unwrap(), ["el gato", "el perro"]);

        let mut content = FrequencyVectorizer::with_config(FrequencyVectorizerConfig {
            stop_words: Some(Language::Spanish),
            ..FrequencyVectorizerConfig::default()
        });
        content.fit(&TEXTS, None).unwrap();
        assert!(content.term_index("el").is_none());
        assert!(content.term_index("perro").is_some());
    }

    #[test]
    fn test_not_fitted_and_empty_vocabulary() {
        let vectorizer = FrequencyVectorizer::new(FrequencyKind::Bow);
        assert!(vectorizer.transform(&["hola"]).is_err());
        assert!(vectorizer.vocabulary().is_err());

        let mut vectorizer = FrequencyVectorizer::new(FrequencyKind::Bow);
        assert!(vectorizer.fit(&["a b c"], None).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tfidf.bin");

        let mut vectorizer = FrequencyVectorizer::new(FrequencyKind::TfIdf);
        vectorizer.fit(&TEXTS, Some(&path)).unwrap();

        let loaded = FrequencyVectorizer::load(&path).unwrap();
        assert_eq!(loaded.kind(), FrequencyKind::TfIdf);
        assert_eq!(
            loaded.transform(&["el gato"]).unwrap(),
            vectorizer.transform(&["el gato"]).unwrap()
        );
    }
}
