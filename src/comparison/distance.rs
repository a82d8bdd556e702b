//! Distance metrics and pairwise distance matrices.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::comparison::{
    Matrix, PARALLEL_THRESHOLD, TextVectors, check_dimensions, shape,
};
use crate::error::{ContextoError, Result};
use crate::language::Language;
use crate::vectorization::Vectorizer;

/// Distance metrics between vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine distance (1 - cosine similarity)
    #[default]
    Cosine,
    /// Euclidean (L2) distance
    Euclidean,
    /// Manhattan (L1) distance
    Manhattan,
    /// Largest absolute coordinate difference
    Chebyshev,
    /// Minkowski distance of order p (p >= 1)
    Minkowski(f32),
    /// Share of non-zero coordinates that are non-zero in only one vector
    Jaccard,
    /// Share of coordinates that differ
    Hamming,
    BrayCurtis,
    Canberra,
    /// 1 - Pearson correlation
    Correlation,
}

fn norm(a: &[f32]) -> f32 {
    a.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let (norm_a, norm_b) = (norm(a), norm(b));

    if norm_a == 0.0 || norm_b == 0.0 {
        1.0 // Maximum distance for zero vectors
    } else {
        1.0 - (dot_product / (norm_a * norm_b))
    }
}

impl DistanceMetric {
    /// Calculate the distance between two vectors using this metric.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(ContextoError::InvalidOperation(
                "Vector dimensions must match for distance calculation".to_string(),
            ));
        }

        let pairs = a.iter().zip(b.iter());
        let result = match *self {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Euclidean => pairs.map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt(),
            DistanceMetric::Manhattan => pairs.map(|(x, y)| (x - y).abs()).sum(),
            DistanceMetric::Chebyshev => pairs.map(|(x, y)| (x - y).abs()).fold(0.0, f32::max),
            DistanceMetric::Minkowski(p) => {
                if p < 1.0 {
                    return Err(ContextoError::invalid_argument(format!(
                        "Minkowski order must be at least 1, got {p}"
                    )));
                }
                pairs
                    .map(|(x, y)| (x - y).abs().powf(p))
                    .sum::<f32>()
                    .powf(1.0 / p)
            }
            DistanceMetric::Jaccard => {
                let (mut nonzero, mut unequal) = (0usize, 0usize);
                for (x, y) in pairs {
                    let (x, y) = (*x != 0.0, *y != 0.0);
                    nonzero += usize::from(x || y);
                    unequal += usize::from(x != y);
                }
                if nonzero == 0 {
                    0.0
                } else {
                    unequal as f32 / nonzero as f32
                }
            }
            DistanceMetric::Hamming => {
                if a.is_empty() {
                    0.0
                } else {
                    pairs.filter(|(x, y)| x != y).count() as f32 / a.len() as f32
                }
            }
            DistanceMetric::BrayCurtis => {
                let (diff, sum) = pairs.fold((0.0, 0.0), |(d, s), (x, y)| {
                    (d + (x - y).abs(), s + (x + y).abs())
                });
                if sum == 0.0 { 0.0 } else { diff / sum }
            }
            DistanceMetric::Canberra => pairs
                .map(|(x, y)| {
                    let denominator = x.abs() + y.abs();
                    if denominator == 0.0 {
                        0.0
                    } else {
                        (x - y).abs() / denominator
                    }
                })
                .sum(),
            DistanceMetric::Correlation => {
                let center = |v: &[f32]| -> Vec<f32> {
                    let mean = v.iter().sum::<f32>() / v.len().max(1) as f32;
                    v.iter().map(|x| x - mean).collect()
                };
                cosine_distance(&center(a), &center(b))
            }
        };

        Ok(result)
    }

    /// Get the name of this distance metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Chebyshev => "chebyshev",
            DistanceMetric::Minkowski(_) => "minkowski",
            DistanceMetric::Jaccard => "jaccard",
            DistanceMetric::Hamming => "hamming",
            DistanceMetric::BrayCurtis => "braycurtis",
            DistanceMetric::Canberra => "canberra",
            DistanceMetric::Correlation => "correlation",
        }
    }

    /// Calculate distance between a query vector and multiple vectors in parallel.
    pub fn batch_distance_parallel(&self, query: &[f32], vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
        if vectors.len() < PARALLEL_THRESHOLD {
            return vectors
                .iter()
                .map(|v| self.distance(query, v))
                .collect::<Result<Vec<_>>>();
        }

        vectors
            .par_iter()
            .map(|v| self.distance(query, v))
            .collect::<Result<Vec<_>>>()
    }

    /// Full matrix of distances between every pair of vectors.
    pub fn pairwise(&self, vectors: &[Vec<f32>]) -> Result<Matrix> {
        if vectors.len() < PARALLEL_THRESHOLD {
            return vectors
                .iter()
                .map(|row| self.batch_distance_parallel(row, vectors))
                .collect();
        }

        vectors
            .par_iter()
            .map(|row| {
                vectors
                    .iter()
                    .map(|v| self.distance(row, v))
                    .collect::<Result<Vec<f32>>>()
            })
            .collect()
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Minkowski(p) => write!(f, "minkowski:{p}"),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = ContextoError;

    /// Parse a metric name. Minkowski takes an optional order, as in
    /// `minkowski:3`; the default order is 2.
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let (name, param) = match lowered.split_once(':') {
            Some((name, param)) => (name.trim(), Some(param.trim())),
            None => (lowered.as_str(), None),
        };

        let metric = match name {
            "cosine" | "coseno" => DistanceMetric::Cosine,
            "euclidean" | "euclidea" | "l2" => DistanceMetric::Euclidean,
            "manhattan" | "cityblock" | "l1" => DistanceMetric::Manhattan,
            "chebyshev" => DistanceMetric::Chebyshev,
            "minkowski" => {
                let p = match param {
                    Some(p) => p.parse::<f32>().map_err(|_| {
                        ContextoError::invalid_argument(format!("Invalid Minkowski order '{p}'"))
                    })?,
                    None => 2.0,
                };
                DistanceMetric::Minkowski(p)
            }
            "jaccard" => DistanceMetric::Jaccard,
            "hamming" => DistanceMetric::Hamming,
            "braycurtis" | "bray_curtis" | "bray-curtis" => DistanceMetric::BrayCurtis,
            "canberra" => DistanceMetric::Canberra,
            "correlation" | "correlacion" => DistanceMetric::Correlation,
            _ => {
                return Err(ContextoError::invalid_argument(format!(
                    "Unknown distance metric: {s}"
                )));
            }
        };
        if param.is_some() && !matches!(metric, DistanceMetric::Minkowski(_)) {
            return Err(ContextoError::invalid_argument(format!(
                "Metric '{name}' takes no parameter"
            )));
        }
        Ok(metric)
    }
}

/// Pairwise distances between texts.
pub struct Distance {
    vectors: TextVectors,
}

impl Distance {
    /// Create a distance calculator. Without a vectorizer, each comparison
    /// fits a TF-IDF model on the texts being compared.
    pub fn new(language: Language, vectorizer: Option<Box<dyn Vectorizer>>) -> Self {
        Distance {
            vectors: TextVectors::new(language, vectorizer),
        }
    }

    pub fn language(&self) -> Language {
        self.vectors.language()
    }

    /// Distances between every pair of texts.
    pub fn pairwise(&self, texts: &[&str], metric: DistanceMetric) -> Result<Matrix> {
        let vectors = self.vectors.vectorize(texts)?;
        self.pairwise_vectors(&vectors, metric)
    }

    /// Distances between every pair of vectors.
    pub fn pairwise_vectors(&self, vectors: &[Vec<f32>], metric: DistanceMetric) -> Result<Matrix> {
        check_dimensions(vectors)?;
        Ok(shape(metric.pairwise(vectors)?))
    }

    /// Manhattan distances between texts.
    pub fn l1(&self, texts: &[&str]) -> Result<Matrix> {
        self.pairwise(texts, DistanceMetric::Manhattan)
    }

    /// Euclidean distances between texts.
    pub fn l2(&self, texts: &[&str]) -> Result<Matrix> {
        self.pairwise(texts, DistanceMetric::Euclidean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_metrics() {
        let a = [1.0, 0.0, 2.0];
        let b = [0.0, 1.0, 2.0];

        assert!(close(DistanceMetric::Euclidean.distance(&a, &b).unwrap(), 2f32.sqrt()));
        assert!(close(DistanceMetric::Manhattan.distance(&a, &b).unwrap(), 2.0));
        assert!(close(DistanceMetric::Chebyshev.distance(&a, &b).unwrap(), 1.0));
        assert!(close(DistanceMetric::Minkowski(1.0).distance(&a, &b).unwrap(), 2.0));
        assert!(close(DistanceMetric::Cosine.distance(&a, &b).unwrap(), 1.0 - 4.0 / 5.0));
        assert!(close(DistanceMetric::Jaccard.distance(&a, &b).unwrap(), 2.0 / 3.0));
        assert!(close(DistanceMetric::Hamming.distance(&a, &b).unwrap(), 2.0 / 3.0));
        assert!(close(DistanceMetric::BrayCurtis.distance(&a, &b).unwrap(), 2.0 / 6.0));
        assert!(close(DistanceMetric::Canberra.distance(&a, &b).unwrap(), 2.0));
        assert!(close(
            DistanceMetric::Correlation.distance(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap(),
            0.0
        ));
    }

    #[test]
    fn test_edge_cases() {
        assert!(DistanceMetric::Cosine.distance(&[1.0], &[1.0, 2.0]).is_err());
        assert!(DistanceMetric::Minkowski(0.5).distance(&[1.0], &[2.0]).is_err());
        assert_eq!(DistanceMetric::Cosine.distance(&[0.0], &[1.0]).unwrap(), 1.0);
        assert_eq!(DistanceMetric::Jaccard.distance(&[0.0], &[0.0]).unwrap(), 0.0);
        assert_eq!(DistanceMetric::Euclidean.distance(&[1.0], &[1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("L1".parse::<DistanceMetric>().unwrap(), DistanceMetric::Manhattan);
        assert_eq!("cityblock".parse::<DistanceMetric>().unwrap(), DistanceMetric::Manhattan);
        assert_eq!("l2".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
        assert_eq!(
            "minkowski:3".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Minkowski(3.0)
        );
        assert_eq!(
            "minkowski".parse::<DistanceMetric>().unwrap(),
            DistanceMetric::Minkowski(2.0)
        );
        assert!("cosine:2".parse::<DistanceMetric>().is_err());
        assert!("mahalanobis".parse::<DistanceMetric>().is_err());
        assert_eq!(DistanceMetric::Minkowski(3.0).to_string(), "minkowski:3");
    }

    #[test]
    fn test_pairwise_vectors() {
        let distance = Distance::new(Language::Spanish, None);
        let vectors = vec![vec![0.0, 0.0], vec![3.0, 4.0], vec![6.0, 8.0]];

        let matrix = distance.pairwise_vectors(&vectors, DistanceMetric::Euclidean).unwrap();
        assert_eq!(matrix.len(), 3);
        assert!(close(matrix[0][2], 10.0));
        assert!(close(matrix[2][1], 5.0));
        assert!(close(matrix[1][1], 0.0));

        let pair = distance.pairwise_vectors(&vectors[..2], DistanceMetric::Manhattan).unwrap();
        assert_eq!(pair, vec![vec![7.0]]);

        assert!(distance.pairwise_vectors(&vectors[..1], DistanceMetric::Cosine).is_err());
    }

    #[test]
    fn test_pairwise_texts() {
        let distance = Distance::new(Language::Spanish, None);
        let texts = ["el perro come carne", "el perro come carne", "la mesa es azul"];
        let matrix = distance.l2(&texts).unwrap();
        assert!(close(matrix[0][1], 0.0));
        assert!(matrix[0][2] > 1.0);

        let matrix = distance.pairwise(&texts, DistanceMetric::Cosine).unwrap();
        assert!(close(matrix[0][2], 1.0));
    }

    #[test]
    fn test_parallel_pairwise_matches_sequential() {
        let vectors: Vec<Vec<f32>> = (0..120).map(|i| vec![i as f32, 1.0]).collect();
        let matrix = DistanceMetric::Manhattan.pairwise(&vectors).unwrap();
        assert_eq!(matrix.len(), 120);
        assert!(close(matrix[10][110], 100.0));
    }
}
