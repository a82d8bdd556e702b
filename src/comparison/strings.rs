//! Edit distances and similarities between short strings.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::comparison::{Matrix, PARALLEL_THRESHOLD, check_inputs, shape};
use crate::error::{ContextoError, Result};
use crate::util::edit_distance::{
    damerau_levenshtein_distance, hamming_distance, jaro_similarity, jaro_winkler_similarity,
    levenshtein_distance,
};

/// String comparison functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StringMetric {
    #[default]
    Levenshtein,
    DamerauLevenshtein,
    Hamming,
    Jaro,
    JaroWinkler,
}

impl StringMetric {
    pub const ALL: [StringMetric; 5] = [
        StringMetric::Levenshtein,
        StringMetric::DamerauLevenshtein,
        StringMetric::Hamming,
        StringMetric::Jaro,
        StringMetric::JaroWinkler,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StringMetric::Levenshtein => "levenshtein",
            StringMetric::DamerauLevenshtein => "damerau_levenshtein",
            StringMetric::Hamming => "hamming",
            StringMetric::Jaro => "jaro",
            StringMetric::JaroWinkler => "jaro_winkler",
        }
    }

    /// Whether the metric counts edits (lower is closer) rather than scoring
    /// similarity in `[0, 1]`.
    pub fn is_distance(&self) -> bool {
        matches!(
            self,
            StringMetric::Levenshtein | StringMetric::DamerauLevenshtein | StringMetric::Hamming
        )
    }

    /// Raw value for one pair of strings.
    pub fn compute(&self, s1: &str, s2: &str) -> f32 {
        match self {
            StringMetric::Levenshtein => levenshtein_distance(s1, s2) as f32,
            StringMetric::DamerauLevenshtein => damerau_levenshtein_distance(s1, s2) as f32,
            StringMetric::Hamming => hamming_distance(s1, s2) as f32,
            StringMetric::Jaro => jaro_similarity(s1, s2) as f32,
            StringMetric::JaroWinkler => jaro_winkler_similarity(s1, s2) as f32,
        }
    }

    /// Similarity in `[0, 1]`. Edit counts become `1 - d / max_len`.
    pub fn similarity(&self, s1: &str, s2: &str) -> f32 {
        let value = self.compute(s1, s2);
        if !self.is_distance() {
            return value;
        }
        let max_len = s1.chars().count().max(s2.chars().count());
        if max_len == 0 {
            1.0
        } else {
            1.0 - value / max_len as f32
        }
    }
}

impl fmt::Display for StringMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StringMetric {
    type Err = ContextoError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "levenshtein" | "lev" => Ok(StringMetric::Levenshtein),
            "damerau_levenshtein" | "damerau" => Ok(StringMetric::DamerauLevenshtein),
            "hamming" => Ok(StringMetric::Hamming),
            "jaro" => Ok(StringMetric::Jaro),
            "jaro_winkler" | "winkler" => Ok(StringMetric::JaroWinkler),
            _ => Err(ContextoError::invalid_argument(format!(
                "Unknown string metric: {s}"
            ))),
        }
    }
}

/// Pairwise differences between a list of strings.
///
/// # Examples
///
/// ```
/// use contexto::comparison::StringDifference;
///
/// let differences = StringDifference::new();
/// let matrix = differences.levenshtein(&["casa", "cosa"]).unwrap();
/// assert_eq!(matrix, vec![vec![1.0]]);
///
/// let normalized = StringDifference::new().normalized(true);
/// assert_eq!(normalized.levenshtein(&["casa", "cosa"]).unwrap(), vec![vec![0.75]]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StringDifference {
    normalized: bool,
}

impl StringDifference {
    pub fn new() -> Self {
        StringDifference::default()
    }

    /// Return similarities in `[0, 1]` instead of raw edit counts.
    pub fn normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Matrix of `metric` between every pair of strings. Two strings yield a
    /// 1×1 matrix.
    pub fn matrix(&self, strings: &[&str], metric: StringMetric) -> Result<Matrix> {
        check_inputs(strings)?;
        let row = |a: &&str| -> Vec<f32> {
            strings
                .iter()
                .map(|b| {
                    if self.normalized {
                        metric.similarity(a, b)
                    } else {
                        metric.compute(a, b)
                    }
                })
                .collect()
        };
        let matrix = if strings.len() >= PARALLEL_THRESHOLD {
            strings.par_iter().map(row).collect()
        } else {
            strings.iter().map(row).collect()
        };
        Ok(shape(matrix))
    }

    pub fn levenshtein(&self, strings: &[&str]) -> Result<Matrix> {
        self.matrix(strings, StringMetric::Levenshtein)
    }

    pub fn damerau_levenshtein(&self, strings: &[&str]) -> Result<Matrix> {
        self.matrix(strings, StringMetric::DamerauLevenshtein)
    }

    pub fn hamming(&self, strings: &[&str]) -> Result<Matrix> {
        self.matrix(strings, StringMetric::Hamming)
    }

    pub fn jaro(&self, strings: &[&str]) -> Result<Matrix> {
        self.matrix(strings, StringMetric::Jaro)
    }

    pub fn jaro_winkler(&self, strings: &[&str]) -> Result<Matrix> {
        self.matrix(strings, StringMetric::JaroWinkler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parsing() {
        assert_eq!("Jaro-Winkler".parse::<StringMetric>().unwrap(), StringMetric::JaroWinkler);
        assert_eq!(
            "damerau levenshtein".parse::<StringMetric>().unwrap(),
            StringMetric::DamerauLevenshtein
        );
        assert!("soundex".parse::<StringMetric>().is_err());
        for metric in StringMetric::ALL {
            assert_eq!(metric.name().parse::<StringMetric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_matrices() {
        let differences = StringDifference::new();
        let strings = ["casa", "caas", "cosas"];

        let levenshtein = differences.levenshtein(&strings).unwrap();
        assert_eq!(levenshtein[0][1], 2.0);
        assert_eq!(levenshtein[0][2], 2.0);
        assert_eq!(levenshtein[1][1], 0.0);

        let damerau = differences.damerau_levenshtein(&strings).unwrap();
        assert_eq!(damerau[0][1], 1.0);

        let hamming = differences.hamming(&strings).unwrap();
        assert_eq!(hamming[0][2], 2.0);

        let jaro = differences.jaro(&strings).unwrap();
        assert_eq!(jaro[2][2], 1.0);
        let jaro_winkler = differences.jaro_winkler(&strings).unwrap();
        assert!(jaro_winkler[0][1] >= jaro[0][1]);
    }

    #[test]
    fn test_normalized() {
        let differences = StringDifference::new().normalized(true);
        let matrix = differences.hamming(&["abcd", "abxy", ""]).unwrap();
        assert_eq!(matrix[0][1], 0.5);
        assert_eq!(matrix[0][2], 0.0);
        assert_eq!(matrix[2][2], 1.0);
        assert!(differences.jaro(&["solo"]).is_err());
    }
}
