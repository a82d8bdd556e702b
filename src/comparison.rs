//! Pairwise comparison of texts, vectors and strings.
//!
//! [`Similarity`] and [`Distance`] vectorize texts (with the vectorizer they
//! were given, or a TF-IDF model fitted on the texts being compared) and
//! return square matrices. Comparing exactly two inputs yields a 1×1 matrix
//! holding the value for that pair.
//!
//! # Examples
//!
//! ```
//! use contexto::comparison::{Similarity, jaccard_texts};
//! use contexto::language::Language;
//!
//! let similarity = Similarity::new(Language::Spanish, None);
//! let matrix = similarity
//!     .cosine(&["el perro come carne", "el perro come pescado", "la mesa azul"])
//!     .unwrap();
//! assert_eq!(matrix.len(), 3);
//! assert!(matrix[0][1] > matrix[0][2]);
//!
//! assert_eq!(jaccard_texts("el perro come", "el gato come"), 0.5);
//! ```

use crate::error::{ContextoError, Result};
use crate::language::Language;
use crate::vectorization::{
    FrequencyKind, FrequencyVectorizer, FrequencyVectorizerConfig, Vectorizer,
};

pub mod distance;
pub mod similarity;
pub mod strings;

pub use distance::{Distance, DistanceMetric};
pub use similarity::{Similarity, jaccard_texts};
pub use strings::{StringDifference, StringMetric};

/// Square (or 1×1) matrix of pairwise values.
pub type Matrix = Vec<Vec<f32>>;

/// Pairs compared in parallel from this many rows on.
pub(crate) const PARALLEL_THRESHOLD: usize = 100;

pub(crate) fn check_inputs<T>(items: &[T]) -> Result<()> {
    if items.len() < 2 {
        return Err(ContextoError::invalid_argument(
            "At least two inputs are required for a comparison",
        ));
    }
    Ok(())
}

pub(crate) fn check_dimensions(vectors: &[Vec<f32>]) -> Result<()> {
    check_inputs(vectors)?;
    let dim = vectors[0].len();
    if vectors.iter().any(|v| v.len() != dim) {
        return Err(ContextoError::invalid_argument(
            "All vectors must have the same dimension",
        ));
    }
    Ok(())
}

/// Vectorizer shared by [`Similarity`] and [`Distance`].
pub(crate) struct TextVectors {
    language: Language,
    vectorizer: Option<Box<dyn Vectorizer>>,
}

impl TextVectors {
    pub(crate) fn new(language: Language, vectorizer: Option<Box<dyn Vectorizer>>) -> Self {
        TextVectors {
            language,
            vectorizer,
        }
    }

    pub(crate) fn language(&self) -> Language {
        self.language
    }

    /// Vectors of `texts`. Without a vectorizer, a TF-IDF model ignoring the
    /// stop words of the language is fitted on the texts themselves.
    pub(crate) fn vectorize(&self, texts: &[&str]) -> Result<Matrix> {
        check_inputs(texts)?;
        match &self.vectorizer {
            Some(vectorizer) => vectorizer.vectorize(texts),
            None => {
                let mut vectorizer = FrequencyVectorizer::with_config(FrequencyVectorizerConfig {
                    kind: FrequencyKind::TfIdf,
                    stop_words: Some(self.language),
                    ..FrequencyVectorizerConfig::default()
                });
                vectorizer.fit_transform(texts)
            }
        }
    }
}

/// Collapse a 2×2 matrix to the 1×1 value of the single pair.
pub(crate) fn shape(matrix: Matrix) -> Matrix {
    if matrix.len() == 2 {
        vec![vec![matrix[0][1]]]
    } else {
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks() {
        assert!(check_inputs(&["uno"]).is_err());
        assert!(check_inputs(&["uno", "dos"]).is_ok());
        assert!(check_dimensions(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_shape() {
        assert_eq!(shape(vec![vec![1.0, 0.5], vec![0.5, 1.0]]), vec![vec![0.5]]);
        let three = vec![vec![0.0; 3]; 3];
        assert_eq!(shape(three.clone()), three);
    }

    #[test]
    fn test_default_vectorizer() {
        let vectors = TextVectors::new(Language::Spanish, None);
        let matrix = vectors.vectorize(&["el perro", "el gato"]).unwrap();
        // "el" is a stop word, so only two terms remain
        assert_eq!(matrix[0].len(), 2);
        assert!(vectors.vectorize(&["solo"]).is_err());
    }
}
