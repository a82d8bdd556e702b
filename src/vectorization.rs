//! Turning texts into numeric vectors.
//!
//! Every vectorizer implements [`Vectorizer`], so the comparison layer can
//! work with any of them:
//!
//! - [`FrequencyVectorizer`] - Bag-of-words counts or TF-IDF weights over a
//!   fitted vocabulary
//! - [`HashingVectorizer`] - Signed feature hashing, nothing to fit
//! - [`Word2VecVectorizer`] - Averages of pretrained word vectors
//! - [`Doc2VecVectorizer`] - Paragraph vectors trained on a corpus
//!
//! # Examples
//!
//! ```
//! use contexto::vectorization::{FrequencyKind, FrequencyVectorizer, Vectorizer};
//!
//! let mut vectorizer = FrequencyVectorizer::new(FrequencyKind::Bow);
//! vectorizer.fit(&["el perro come", "el gato duerme"], None).unwrap();
//! assert_eq!(vectorizer.vocabulary().unwrap(), vec!["come", "duerme", "el", "gato", "perro"]);
//! assert_eq!(vectorizer.vectorize(&["el perro"]).unwrap()[0], vec![0.0, 0.0, 1.0, 0.0, 1.0]);
//! ```

use std::collections::HashSet;

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::{ContextoError, Result};

pub mod doc2vec;
pub mod frequency;
pub mod hashing;
pub mod preprocess;
pub mod word_vectors;

pub use doc2vec::{Doc2VecConfig, Doc2VecVectorizer, InferenceParams};
pub use frequency::{FrequencyKind, FrequencyVectorizer, FrequencyVectorizerConfig, SparseRow};
pub use hashing::HashingVectorizer;
pub use preprocess::simple_preprocess;
pub use word_vectors::{Word2VecVectorizer, WordVectors};

/// Batches at least this large are vectorized in parallel.
pub(crate) const PARALLEL_THRESHOLD: usize = 100;

/// Trait for models that map texts to dense vectors of a fixed dimension.
pub trait Vectorizer: Send + Sync {
    /// Vectorize each text, one row per text.
    fn vectorize(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get the name of this vectorizer.
    fn name(&self) -> &'static str;
}

/// Check an n-gram range: `1 <= min <= max`.
pub(crate) fn validate_ngram_range((min_n, max_n): (usize, usize)) -> Result<()> {
    if min_n == 0 || min_n > max_n {
        return Err(ContextoError::invalid_argument(format!(
            "Invalid n-gram range ({min_n}, {max_n})"
        )));
    }
    Ok(())
}

/// Words of `text` (two or more word characters) and their n-grams, joined
/// by single spaces. Stop words are dropped before building n-grams.
pub(crate) fn extract_terms(
    tokenizer: &RegexTokenizer,
    text: &str,
    lowercase: bool,
    (min_n, max_n): (usize, usize),
    stop_words: Option<&HashSet<String>>,
) -> Result<Vec<String>> {
    let mut words = if lowercase {
        tokenizer.tokenize_words(&text.to_lowercase())?
    } else {
        tokenizer.tokenize_words(text)?
    };
    if let Some(stop_words) = stop_words {
        words.retain(|word| !stop_words.contains(word));
    }

    if (min_n, max_n) == (1, 1) {
        return Ok(words);
    }

    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > words.len() {
            break;
        }
        terms.extend(words.windows(n).map(|window| window.join(" ")));
    }
    Ok(terms)
}

/// Scale a vector to unit L2 norm. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Cosine similarity of two vectors, 0.0 when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_terms() {
        let tokenizer = RegexTokenizer::default();
        let terms = extract_terms(&tokenizer, "El Perro y el gato", true, (1, 2), None).unwrap();
        assert_eq!(
            terms,
            vec!["el", "perro", "el", "gato", "el perro", "perro el", "el gato"]
        );
        assert!(extract_terms(&tokenizer, "a", true, (1, 1), None).unwrap().is_empty());

        let stop_words = HashSet::from(["el".to_string()]);
        let terms =
            extract_terms(&tokenizer, "El Perro y el gato", true, (2, 2), Some(&stop_words)).unwrap();
        assert_eq!(terms, vec!["perro gato"]);
    }

    #[test]
    fn test_ngram_range_validation() {
        assert!(validate_ngram_range((1, 2)).is_ok());
        assert!(validate_ngram_range((0, 1)).is_err());
        assert!(validate_ngram_range((3, 2)).is_err());
    }

    #[test]
    fn test_normalize_and_cosine() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);

        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
    }
}
