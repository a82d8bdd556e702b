//! Term co-occurrence matrices.

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{Tokenizer, tokenize};
use crate::cleaning::basic_cleaning;
use crate::error::{ContextoError, Result};
use crate::exploration::ngrams::count_ordered;

/// How two terms are considered to occur together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CooccurrenceMode {
    /// Anywhere in the same document, weighted by both counts.
    #[default]
    Document,
    /// Within a fixed number of tokens of each other.
    Window,
}

impl fmt::Display for CooccurrenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CooccurrenceMode::Document => f.write_str("document"),
            CooccurrenceMode::Window => f.write_str("window"),
        }
    }
}

impl FromStr for CooccurrenceMode {
    type Err = ContextoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "document" | "documento" => Ok(CooccurrenceMode::Document),
            "window" | "ventana" => Ok(CooccurrenceMode::Window),
            other => Err(ContextoError::invalid_argument(format!(
                "Unknown co-occurrence mode '{other}'. Use 'document' or 'window'"
            ))),
        }
    }
}

/// Options of [`cooccurrence_matrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooccurrenceConfig {
    /// Minimum total frequency of a term.
    pub min_freq: usize,
    /// Number of most frequent terms kept.
    pub max_num: usize,
    pub mode: CooccurrenceMode,
    /// Tokens on each side counted in window mode.
    pub window: usize,
    /// Zero the values below the diagonal.
    pub upper_triangle: bool,
    /// Apply basic cleaning to every text first.
    pub clean: bool,
}

impl Default for CooccurrenceConfig {
    fn default() -> Self {
        CooccurrenceConfig {
            min_freq: 1,
            max_num: 200,
            mode: CooccurrenceMode::Document,
            window: 3,
            upper_triangle: true,
            clean: false,
        }
    }
}

/// Square matrix of co-occurrence counts, rows and columns in the
/// alphabetical order of `terms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooccurrenceMatrix {
    pub terms: Vec<String>,
    pub values: Vec<Vec<u64>>,
}

impl CooccurrenceMatrix {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn index(&self, term: &str) -> Option<usize> {
        self.terms.binary_search_by(|t| t.as_str().cmp(term)).ok()
    }

    /// Value at row `row` and column `column`, if both are terms of the matrix.
    pub fn get(&self, row: &str, column: &str) -> Option<u64> {
        Some(self.values[self.index(row)?][self.index(column)?])
    }

    /// Largest value in the matrix.
    pub fn max_value(&self) -> u64 {
        self.values
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Comma-separated table with a header row of terms and one row per term.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        for term in &self.terms {
            csv.push(',');
            csv.push_str(&csv_field(term));
        }
        csv.push('\n');
        for (term, row) in self.terms.iter().zip(&self.values) {
            csv.push_str(&csv_field(term));
            for value in row {
                csv.push(',');
                csv.push_str(&value.to_string());
            }
            csv.push('\n');
        }
        csv
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Co-occurrence counts of the most frequent terms across `texts`.
///
/// The vocabulary is the `max_num` most frequent tokens over all texts with
/// at least `min_freq` occurrences. In [`CooccurrenceMode::Document`] each
/// text adds `count(a) * count(b)` to the pair `(a, b)` and `count(a)` to the
/// diagonal. In [`CooccurrenceMode::Window`] every pair of tokens at most
/// `window` positions apart adds one, including a term paired with another
/// occurrence of itself.
///
/// # Examples
///
/// ```
/// use contexto::exploration::{CooccurrenceConfig, cooccurrence_matrix};
///
/// let matrix = cooccurrence_matrix(
///     &["el perro come", "el gato come carne"],
///     &CooccurrenceConfig::default(),
///     None,
/// )
/// .unwrap();
/// assert_eq!(matrix.terms, vec!["carne", "come", "el", "gato", "perro"]);
/// assert_eq!(matrix.get("come", "el"), Some(2));
/// assert_eq!(matrix.get("el", "come"), Some(0));
/// ```
pub fn cooccurrence_matrix(
    texts: &[&str],
    config: &CooccurrenceConfig,
    tokenizer: Option<&dyn Tokenizer>,
) -> Result<CooccurrenceMatrix> {
    let documents: Vec<Vec<String>> = texts
        .iter()
        .map(|text| {
            if config.clean {
                tokenize(&basic_cleaning(text, true), tokenizer)
            } else {
                tokenize(text, tokenizer)
            }
        })
        .collect::<Result<_>>()?;

    let mut counts = count_ordered(documents.iter().flatten().cloned());
    counts.truncate(config.max_num);
    let mut terms: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count >= config.min_freq)
        .map(|(term, _)| term)
        .collect();
    terms.sort();

    let index: AHashMap<&str, usize> = terms
        .iter()
        .enumerate()
        .map(|(i, term)| (term.as_str(), i))
        .collect();
    let mut values = vec![vec![0u64; terms.len()]; terms.len()];

    match config.mode {
        CooccurrenceMode::Window => {
            for tokens in &documents {
                let ids: Vec<Option<usize>> =
                    tokens.iter().map(|t| index.get(t.as_str()).copied()).collect();
                for (i, id) in ids.iter().enumerate() {
                    let Some(a) = *id else { continue };
                    let start = i.saturating_sub(config.window);
                    let end = (i + config.window + 1).min(ids.len());
                    for (j, other) in ids.iter().enumerate().take(end).skip(start) {
                        if j != i
                            && let Some(b) = *other
                        {
                            values[a][b] += 1;
                        }
                    }
                }
            }
        }
        CooccurrenceMode::Document => {
            for tokens in &documents {
                let mut doc_counts: AHashMap<usize, u64> = AHashMap::new();
                for token in tokens {
                    if let Some(&id) = index.get(token.as_str()) {
                        *doc_counts.entry(id).or_insert(0) += 1;
                    }
                }
                for (&a, &count_a) in &doc_counts {
                    for (&b, &count_b) in &doc_counts {
                        values[a][b] += if a == b { count_a } else { count_a * count_b };
                    }
                }
            }
        }
    }

    if config.upper_triangle {
        for (i, row) in values.iter_mut().enumerate() {
            row[..i].fill(0);
        }
    }

    log::debug!(
        "Co-occurrence matrix of {} terms over {} texts ({} mode)",
        terms.len(),
        texts.len(),
        config.mode
    );
    Ok(CooccurrenceMatrix { terms, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_mode() {
        let config = CooccurrenceConfig {
            mode: CooccurrenceMode::Window,
            window: 1,
            upper_triangle: false,
            ..CooccurrenceConfig::default()
        };
        let matrix = cooccurrence_matrix(&["a b c a"], &config, None).unwrap();
        assert_eq!(matrix.terms, vec!["a", "b", "c"]);
        assert_eq!(matrix.values, vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]);

        let wide = CooccurrenceConfig { window: 3, ..config };
        let matrix = cooccurrence_matrix(&["a b c a"], &wide, None).unwrap();
        assert_eq!(matrix.get("a", "a"), Some(2));
        assert_eq!(matrix.get("b", "b"), Some(0));
    }

    #[test]
    fn test_window_does_not_cross_documents() {
        let config = CooccurrenceConfig {
            mode: CooccurrenceMode::Window,
            upper_triangle: false,
            ..CooccurrenceConfig::default()
        };
        let matrix = cooccurrence_matrix(&["x", "y"], &config, None).unwrap();
        assert_eq!(matrix.get("x", "y"), Some(0));
    }

    #[test]
    fn test_document_mode() {
        let config = CooccurrenceConfig {
            upper_triangle: false,
            ..CooccurrenceConfig::default()
        };
        let matrix = cooccurrence_matrix(&["sol sol luna", "sol mar"], &config, None).unwrap();
        assert_eq!(matrix.terms, vec!["luna", "mar", "sol"]);
        assert_eq!(matrix.get("sol", "sol"), Some(3));
        assert_eq!(matrix.get("sol", "luna"), Some(2));
        assert_eq!(matrix.get("luna", "sol"), Some(2));
        assert_eq!(matrix.get("mar", "luna"), Some(0));
        assert_eq!(matrix.get("sol", "nube"), None);
        assert_eq!(matrix.max_value(), 3);
    }

    #[test]
    fn test_vocabulary_limits() {
        let config = CooccurrenceConfig {
            min_freq: 2,
            max_num: 2,
            ..CooccurrenceConfig::default()
        };
        let matrix = cooccurrence_matrix(&["a a b b b c c d"], &config, None).unwrap();
        assert_eq!(matrix.terms, vec!["a", "b"]);

        let config = CooccurrenceConfig {
            min_freq: 3,
            ..CooccurrenceConfig::default()
        };
        let matrix = cooccurrence_matrix(&["a a b b b c c d"], &config, None).unwrap();
        assert_eq!(matrix.terms, vec!["b"]);
    }

    #[test]
    fn test_clean_and_csv() {
        let config = CooccurrenceConfig {
            clean: true,
            ..CooccurrenceConfig::default()
        };
        let matrix = cooccurrence_matrix(&["Río, río."], &config, None).unwrap();
        assert_eq!(matrix.terms, vec!["río"]);
        assert_eq!(matrix.to_csv(), ",río\nrío,2\n");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("ventana".parse::<CooccurrenceMode>().unwrap(), CooccurrenceMode::Window);
        assert_eq!("Documento".parse::<CooccurrenceMode>().unwrap(), CooccurrenceMode::Document);
        assert!("frase".parse::<CooccurrenceMode>().is_err());
    }
}
