//! Feature hashing vectorizer.
//!
//! Terms are mapped straight to one of `n_features` columns by their xxh3
//! hash, so there is no vocabulary to fit or store. The top bit of the hash
//! picks the sign of the contribution, which keeps collisions from
//! accumulating in one direction.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::{ContextoError, Result};
use crate::util::persist::{load_object, save_object};
use crate::vectorization::{
    PARALLEL_THRESHOLD, Vectorizer, extract_terms, l2_normalize, validate_ngram_range,
};

/// Hashing vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingVectorizer {
    n_features: usize,
    ngram_range: (usize, usize),
    lowercase: bool,
    alternate_sign: bool,
    #[serde(skip)]
    tokenizer: RegexTokenizer,
}

impl Default for HashingVectorizer {
    fn default() -> Self {
        HashingVectorizer {
            n_features: 100,
            ngram_range: (1, 1),
            lowercase: true,
            alternate_sign: true,
            tokenizer: RegexTokenizer::default(),
        }
    }
}

impl HashingVectorizer {
    pub fn new(n_features: usize, ngram_range: (usize, usize)) -> Result<Self> {
        if n_features == 0 {
            return Err(ContextoError::invalid_argument("n_features must be positive"));
        }
        validate_ngram_range(ngram_range)?;
        Ok(HashingVectorizer {
            n_features,
            ngram_range,
            ..HashingVectorizer::default()
        })
    }

    /// Load a vectorizer saved with [`HashingVectorizer::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_object(path)
    }

    /// Save the settings, so vectors built later stay comparable.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_object(self, path)
    }

    /// Keep every contribution positive.
    pub fn without_alternate_sign(mut self) -> Self {
        self.alternate_sign = false;
        self
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Column and sign of a term.
    pub fn bucket(&self, term: &str) -> (usize, f32) {
        let hash = xxh3_64(term.as_bytes());
        let column = (hash % self.n_features as u64) as usize;
        let sign = if self.alternate_sign && hash >> 63 == 1 {
            -1.0
        } else {
            1.0
        };
        (column, sign)
    }

    /// Vector of a single text, L2-normalized.
    pub fn vectorize_text(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.n_features];
        for term in extract_terms(&self.tokenizer, text, self.lowercase, self.ngram_range, None)? {
            let (column, sign) = self.bucket(&term);
            vector[column] += sign;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

impl Vectorizer for HashingVectorizer {
    fn vectorize(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.len() >= PARALLEL_THRESHOLD {
            texts.par_iter().map(|text| self.vectorize_text(text)).collect()
        } else {
            texts.iter().map(|text| self.vectorize_text(text)).collect()
        }
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}
