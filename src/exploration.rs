//! Exploratory analysis of texts.
//!
//! N-gram extraction and counting, co-occurrence matrices, and charts
//! (word clouds, bar charts, co-occurrence graphs and dispersion plots).
//! Charts are rendered as SVG documents: every chart function returns the
//! SVG text and, when its configuration names an output path, also writes it
//! there.
//!
//! # Examples
//!
//! ```
//! use contexto::exploration::{BarChartConfig, bar_chart, ngram_frequencies};
//!
//! let text = "el sol sale y el sol se pone";
//! let frequencies = ngram_frequencies(text, 1, Some(2)).unwrap();
//! assert_eq!(frequencies[0], ("el".to_string(), 2));
//! assert_eq!(frequencies[1], ("sol".to_string(), 2));
//!
//! let svg = bar_chart(text, &BarChartConfig::default()).unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::util::fs::ensure_parent_dir;

pub mod bar;
pub mod cooccurrence;
pub mod dispersion;
pub mod graph;
pub mod ngrams;
pub(crate) mod svg;
pub mod wordcloud;

pub use bar::{BarChartConfig, bar_chart};
pub use cooccurrence::{CooccurrenceConfig, CooccurrenceMatrix, CooccurrenceMode, cooccurrence_matrix};
pub use dispersion::{Dispersion, DispersionConfig, dispersion_plot};
pub use graph::{CooccurrenceGraph, GraphConfig, cooccurrence_graph};
pub use ngrams::{ngram_frequencies, ngrams};
pub use wordcloud::{Mask, PlacedWord, WordCloudConfig, WordCloudLayout, word_cloud, word_cloud_pair};

/// Write an SVG document to `path`, creating parent directories.
pub fn save_svg<P: AsRef<Path>>(svg: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, svg)?;
    log::info!("Chart saved to {}", path.display());
    Ok(())
}

/// Save `svg` when a path is configured, then hand it back.
pub(crate) fn finish_chart(svg: String, output: Option<&Path>) -> Result<String> {
    if let Some(path) = output {
        save_svg(&svg, path)?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finish_chart_saves_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graficos").join("barras.svg");

        let svg = finish_chart("<svg/>".to_string(), Some(&path)).unwrap();
        assert_eq!(svg, "<svg/>");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<svg/>");

        assert_eq!(finish_chart("<svg/>".to_string(), None).unwrap(), "<svg/>");
    }
}
