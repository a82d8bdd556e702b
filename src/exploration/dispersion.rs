//! Lexical dispersion plots: where each keyword occurs along a sequence of
//! documents.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};
use crate::exploration::finish_chart;
use crate::exploration::svg::{Anchor, SPECTRAL, SvgCanvas, TextStyle, color_at, text_width};

/// Options of [`dispersion_plot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispersionConfig {
    pub ignore_case: bool,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// One label per document.
    pub labels: Option<Vec<String>>,
    /// Label documents `Doc 1`, `Doc 2`, ... when no labels are given.
    pub auto_labels: bool,
    pub legend: bool,
    /// Rotation of the document labels, in degrees.
    pub rotation: f32,
    pub width: u32,
    pub height: u32,
    pub marker_size: f32,
    pub marker_width: f32,
    /// One color per document.
    pub colors: Option<Vec<String>>,
    pub output: Option<PathBuf>,
}

impl Default for DispersionConfig {
    fn default() -> Self {
        DispersionConfig {
            ignore_case: true,
            title: "Gráfico de dispersión de términos".to_string(),
            x_label: "Distribución de términos".to_string(),
            y_label: "Palabras clave".to_string(),
            labels: None,
            auto_labels: true,
            legend: true,
            rotation: 30.0,
            width: 1200,
            height: 700,
            marker_size: 20.0,
            marker_width: 3.0,
            colors: None,
            output: None,
        }
    }
}

/// Keyword occurrences over the words of several documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispersion {
    /// Keywords found, in the order given.
    pub keywords: Vec<String>,
    /// `(word offset, keyword index)` of every occurrence.
    pub points: Vec<(usize, usize)>,
    /// Offset of the last word of each document.
    pub boundaries: Vec<usize>,
    pub total_words: usize,
}

impl Dispersion {
    /// Locate `keywords` in `documents`, split on whitespace.
    ///
    /// Repeated keywords are kept once and keywords that never occur are
    /// dropped with a warning. It is an error when none of them occurs.
    pub fn compute(documents: &[&str], keywords: &[&str], ignore_case: bool) -> Result<Self> {
        let normalize = |word: &str| {
            if ignore_case {
                word.to_lowercase()
            } else {
                word.to_string()
            }
        };

        let mut words = Vec::new();
        let mut boundaries = Vec::with_capacity(documents.len());
        for document in documents {
            words.extend(document.split_whitespace().map(normalize));
            boundaries.push(words.len().wrapping_sub(1));
        }

        let mut unique: Vec<String> = Vec::new();
        for keyword in keywords.iter().map(|k| normalize(*k)) {
            if unique.contains(&keyword) {
                log::warn!("Repeated keyword '{keyword}' removed");
            } else {
                unique.push(keyword);
            }
        }
        let (found, missing): (Vec<String>, Vec<String>) =
            unique.into_iter().partition(|k| words.contains(k));
        if found.is_empty() {
            return Err(ContextoError::invalid_argument(
                "None of the keywords occurs in the documents",
            ));
        }
        if !missing.is_empty() {
            log::warn!("Keywords not found in the documents: {}", missing.join(", "));
        }

        let points = words
            .iter()
            .enumerate()
            .filter_map(|(x, word)| found.iter().position(|k| k == word).map(|y| (x, y)))
            .collect();

        Ok(Dispersion {
            keywords: found,
            points,
            boundaries,
            total_words: words.len(),
        })
    }

    /// Index of the document holding word `offset`.
    fn document_of(&self, offset: usize) -> usize {
        self.boundaries
            .iter()
            .position(|&end| end != usize::MAX && offset <= end)
            .unwrap_or(self.boundaries.len().saturating_sub(1))
    }
}

/// Default colors: alternating halves of a spectral palette so neighbouring
/// documents contrast.
fn palette(n: usize) -> Vec<String> {
    (0..n)
        .map(|c| {
            let t = c as f32 / (2 * n) as f32;
            if c % 2 == 1 {
                color_at(SPECTRAL, t)
            } else {
                color_at(SPECTRAL, 0.5 + t)
            }
        })
        .collect()
}

fn per_document(values: &Option<Vec<String>>, n: usize, what: &str) -> Result<Option<Vec<String>>> {
    match values {
        Some(values) if values.len() != n => Err(ContextoError::invalid_argument(format!(
            "Got {} {what} for {n} documents",
            values.len()
        ))),
        other => Ok(other.clone()),
    }
}

/// Dispersion plot of `keywords` along `documents`, as SVG.
///
/// # Examples
///
/// ```
/// use contexto::exploration::{DispersionConfig, dispersion_plot};
///
/// let svg = dispersion_plot(
///     &["El río crece", "El río baja y el mar sube"],
///     &["río", "mar"],
///     &DispersionConfig::default(),
/// )
/// .unwrap();
/// assert!(svg.contains(">Doc 2</text>"));
/// ```
pub fn dispersion_plot(documents: &[&str], keywords: &[&str], config: &DispersionConfig) -> Result<String> {
    let dispersion = Dispersion::compute(documents, keywords, config.ignore_case)?;
    let labels = match per_document(&config.labels, documents.len(), "labels")? {
        Some(labels) => Some(labels),
        None if config.auto_labels => Some((1..=documents.len()).map(|i| format!("Doc {i}")).collect()),
        None => None,
    };
    let colors = per_document(&config.colors, documents.len(), "colors")?
        .unwrap_or_else(|| palette(documents.len()));

    let width = config.width as f32;
    let height = config.height as f32;
    let keyword_width = dispersion
        .keywords
        .iter()
        .map(|k| text_width(k, 10.0))
        .fold(0.0f32, f32::max);
    let legend_width = match (&labels, config.legend) {
        (Some(labels), true) => {
            labels.iter().map(|l| text_width(l, 10.0)).fold(0.0f32, f32::max) + 40.0
        }
        _ => 0.0,
    };
    let left = keyword_width + 50.0;
    let right = legend_width + 20.0;
    let (top, bottom) = (50.0, 90.0);
    let plot_width = (width - left - right).max(1.0);
    let plot_height = (height - top - bottom).max(1.0);

    let x_min = 0.2f32;
    let x_max = dispersion.points.last().map_or(1.0, |&(x, _)| x as f32) + 0.2;
    let span = (x_max - x_min).max(1.0);
    let x_of = |x: f32| left + (x - x_min) / span * plot_width;
    let band = plot_height / dispersion.keywords.len() as f32;
    let y_of = |k: usize| top + plot_height - (k as f32 + 0.5) * band;

    let mut canvas = SvgCanvas::new(width, height, "white");
    canvas.text(
        left + plot_width / 2.0,
        30.0,
        &config.title,
        &TextStyle::new(15.0).anchor(Anchor::Middle).bold(),
    );

    for &end in dispersion.boundaries.iter().filter(|&&end| end != usize::MAX) {
        let x = x_of(end as f32 + 0.5);
        if x <= left + plot_width {
            canvas.line((x, top), (x, top + plot_height), "lightgray", 1.0, true);
        }
    }

    let half = config.marker_size / 2.0;
    for &(x, k) in &dispersion.points {
        let color = &colors[dispersion.document_of(x)];
        let (px, py) = (x_of(x as f32), y_of(k));
        canvas.line((px, py - half), (px, py + half), color, config.marker_width, false);
    }

    let keyword_style = TextStyle::new(10.0).anchor(Anchor::End);
    for (k, keyword) in dispersion.keywords.iter().enumerate() {
        canvas.text(left - 6.0, y_of(k) + 3.5, keyword, &keyword_style);
    }

    if let Some(labels) = &labels {
        let mut start = 0usize;
        let label_style = TextStyle::new(10.0)
            .anchor(Anchor::End)
            .rotation(config.rotation);
        for (label, &end) in labels.iter().zip(&dispersion.boundaries) {
            let end = if end == usize::MAX { start } else { end };
            let x = x_of(start as f32 + (end as f32 - start as f32) / 2.0);
            canvas.text(x, top + plot_height + 16.0, label, &label_style);
            start = end;
        }
        if config.legend {
            let x = left + plot_width + 15.0;
            for (i, (label, color)) in labels.iter().zip(&colors).enumerate() {
                let y = top + 10.0 + i as f32 * 18.0;
                canvas.line((x, y - 6.0), (x, y + 4.0), color, config.marker_width, false);
                canvas.text(x + 10.0, y + 3.0, label, &TextStyle::new(10.0));
            }
        }
    }

    canvas.line((left, top), (left, top + plot_height), "#000000", 1.0, false);
    canvas.line(
        (left, top + plot_height),
        (left + plot_width, top + plot_height),
        "#000000",
        1.0,
        false,
    );
    canvas.text(
        left + plot_width / 2.0,
        height - 15.0,
        &config.x_label,
        &TextStyle::new(11.0).anchor(Anchor::Middle),
    );
    canvas.text(
        16.0,
        top + plot_height / 2.0,
        &config.y_label,
        &TextStyle::new(11.0).anchor(Anchor::Middle).rotation(90.0),
    );

    finish_chart(canvas.finish(), config.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute() {
        let dispersion = Dispersion::compute(
            &["El gato y el perro", "el ratón"],
            &["el", "perro", "pez", "EL"],
            true,
        )
        .unwrap();
        assert_eq!(dispersion.keywords, vec!["el", "perro"]);
        assert_eq!(dispersion.points, vec![(0, 0), (3, 0), (4, 1), (5, 0)]);
        assert_eq!(dispersion.boundaries, vec![4, 6]);
        assert_eq!(dispersion.total_words, 7);
        assert_eq!(dispersion.document_of(4), 0);
        assert_eq!(dispersion.document_of(5), 1);
    }

    #[test]
    fn test_case_sensitive() {
        let dispersion = Dispersion::compute(&["Casa casa"], &["Casa"], false).unwrap();
        assert_eq!(dispersion.points, vec![(0, 0)]);
    }

    #[test]
    fn test_no_keyword_found() {
        let err = Dispersion::compute(&["uno dos"], &["tres"], true).unwrap_err();
        assert!(matches!(err, ContextoError::InvalidOperation(_)));
    }

    #[test]
    fn test_labels_must_match_documents() {
        let config = DispersionConfig {
            labels: Some(vec!["solo".to_string()]),
            ..DispersionConfig::default()
        };
        assert!(dispersion_plot(&["a b", "b c"], &["b"], &config).is_err());

        let config = DispersionConfig {
            labels: Some(vec!["Enero".to_string(), "Febrero".to_string()]),
            colors: Some(vec!["red".to_string(), "blue".to_string()]),
            ..DispersionConfig::default()
        };
        let svg = dispersion_plot(&["a b", "b c"], &["b"], &config).unwrap();
        assert!(svg.contains(">Febrero</text>"));
        assert!(svg.contains("stroke=\"blue\""));
    }

    #[test]
    fn test_palette() {
        let colors = palette(3);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], color_at(SPECTRAL, 0.5));
        assert_ne!(colors[0], colors[1]);
    }
}
