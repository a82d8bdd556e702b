//! Cosine and Jaccard similarity between texts and vectors.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::comparison::distance::DistanceMetric;
use crate::comparison::{
    Matrix, PARALLEL_THRESHOLD, TextVectors, check_dimensions, check_inputs, shape,
};
use crate::error::Result;
use crate::language::Language;
use crate::vectorization::{Vectorizer, cosine_similarity};

/// Jaccard similarity of the whitespace-separated word sets of two texts.
/// Two texts without words have similarity 0.
pub fn jaccard_texts(text1: &str, text2: &str) -> f32 {
    let words1: HashSet<&str> = text1.split_whitespace().collect();
    let words2: HashSet<&str> = text2.split_whitespace().collect();
    let union = words1.union(&words2).count();
    if union == 0 {
        return 0.0;
    }
    words1.intersection(&words2).count() as f32 / union as f32
}

fn pairwise_matrix<T, F>(items: &[T], similarity: F) -> Matrix
where
    T: Sync,
    F: Fn(&T, &T) -> f32 + Sync,
{
    let row = |a: &T| items.iter().map(|b| similarity(a, b)).collect::<Vec<f32>>();
    if items.len() >= PARALLEL_THRESHOLD {
        items.par_iter().map(row).collect()
    } else {
        items.iter().map(row).collect()
    }
}

/// Pairwise similarity between texts.
pub struct Similarity {
    vectors: TextVectors,
}

impl Similarity {
    /// Create a similarity calculator. Without a vectorizer, each comparison
    /// fits a TF-IDF model on the texts being compared.
    pub fn new(language: Language, vectorizer: Option<Box<dyn Vectorizer>>) -> Self {
        Similarity {
            vectors: TextVectors::new(language, vectorizer),
        }
    }

    pub fn language(&self) -> Language {
        self.vectors.language()
    }

    /// Cosine similarity between every pair of texts.
    pub fn cosine(&self, texts: &[&str]) -> Result<Matrix> {
        let vectors = self.vectors.vectorize(texts)?;
        self.cosine_vectors(&vectors)
    }

    /// Cosine similarity between every pair of vectors.
    pub fn cosine_vectors(&self, vectors: &[Vec<f32>]) -> Result<Matrix> {
        check_dimensions(vectors)?;
        Ok(shape(pairwise_matrix(vectors, |a, b| cosine_similarity(a, b))))
    }

    /// Jaccard similarity between every pair of texts: over word sets, or over
    /// the non-zero components of their vectors when `vectorize` is set.
    pub fn jaccard(&self, texts: &[&str], vectorize: bool) -> Result<Matrix> {
        if vectorize {
            let vectors = self.vectors.vectorize(texts)?;
            return self.jaccard_vectors(&vectors);
        }
        check_inputs(texts)?;
        Ok(shape(pairwise_matrix(texts, |a, b| jaccard_texts(a, b))))
    }

    /// Jaccard similarity between every pair of vectors, treating non-zero
    /// components as set members.
    pub fn jaccard_vectors(&self, vectors: &[Vec<f32>]) -> Result<Matrix> {
        check_dimensions(vectors)?;
        let distances = DistanceMetric::Jaccard.pairwise(vectors)?;
        let similarities = distances
            .into_iter()
            .map(|row| row.into_iter().map(|d| 1.0 - d).collect())
            .collect();
        Ok(shape(similarities))
    }
}
