//! Horizontal bar charts of n-gram frequencies.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};
use crate::exploration::finish_chart;
use crate::exploration::ngrams::ngram_frequencies;
use crate::exploration::svg::{Anchor, SvgCanvas, TextStyle, text_width};

const BAR_COLOR: &str = "#1f77b4";
const FONT_SIZE: f32 = 10.0;

/// Options of [`bar_chart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    pub ngram: usize,
    pub n_terms: usize,
    /// Sort bars by ascending frequency from the bottom up, leaving the most
    /// frequent term at the top.
    pub ascending: bool,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub output: Option<PathBuf>,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        BarChartConfig {
            ngram: 1,
            n_terms: 15,
            ascending: true,
            title: "Términos más frecuentes".to_string(),
            width: 800,
            height: 500,
            output: None,
        }
    }
}

/// Round tick spacing for an axis running from zero to `max`.
fn tick_step(max: usize) -> usize {
    let rough = (max as f64 / 5.0).max(1.0);
    let magnitude = 10f64.powf(rough.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|f| f * magnitude)
        .find(|&s| s >= rough)
        .unwrap_or(10.0 * magnitude);
    step.max(1.0) as usize
}

/// Bar chart of the `n_terms` most frequent n-grams of `text`, as SVG.
pub fn bar_chart(text: &str, config: &BarChartConfig) -> Result<String> {
    let mut frequencies = ngram_frequencies(text, config.ngram, Some(config.n_terms))?;
    if frequencies.is_empty() {
        return Err(ContextoError::invalid_argument(
            "There are no terms to draw in the bar chart",
        ));
    }
    if config.ascending {
        frequencies.sort_by_key(|(_, count)| *count);
    } else {
        frequencies.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    }

    let width = config.width as f32;
    let height = config.height as f32;
    let label_width = frequencies
        .iter()
        .map(|(term, _)| text_width(term, FONT_SIZE))
        .fold(0.0f32, f32::max);
    let left = label_width + 45.0;
    let right = 30.0;
    let top = if config.title.is_empty() { 20.0 } else { 45.0 };
    let bottom = 50.0;
    let plot_width = (width - left - right).max(1.0);
    let plot_height = (height - top - bottom).max(1.0);

    let max = frequencies.iter().map(|(_, c)| *c).max().unwrap_or(1);
    // Headroom for the value labels.
    let x_max = max as f32 * 1.08;
    let x_of = |value: f32| left + value / x_max * plot_width;

    let mut canvas = SvgCanvas::new(width, height, "white");
    if !config.title.is_empty() {
        canvas.text(
            left + plot_width / 2.0,
            28.0,
            &config.title,
            &TextStyle::new(14.0).anchor(Anchor::Middle),
        );
    }

    let step = tick_step(max);
    let tick_style = TextStyle::new(FONT_SIZE).anchor(Anchor::Middle);
    for tick in (0..=max).step_by(step) {
        let x = x_of(tick as f32);
        canvas.line((x, top + plot_height), (x, top + plot_height + 4.0), "#000000", 1.0, false);
        canvas.text(x, top + plot_height + 16.0, &tick.to_string(), &tick_style);
    }

    // Drawn from the top row down: the last term of the sorted list.
    let band = plot_height / frequencies.len() as f32;
    let label_style = TextStyle::new(FONT_SIZE).anchor(Anchor::End);
    let value_style = TextStyle::new(FONT_SIZE);
    for (row, (term, count)) in frequencies.iter().rev().enumerate() {
        let y = top + row as f32 * band + band * 0.1;
        let bar_height = band * 0.8;
        let middle = y + bar_height / 2.0 + FONT_SIZE * 0.35;
        canvas.rect(left, y, x_of(*count as f32) - left, bar_height, BAR_COLOR);
        canvas.text(left - 6.0, middle, term, &label_style);
        canvas.text(x_of(*count as f32) + 3.0, middle, &count.to_string(), &value_style);
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
        height - 12.0,
        "Frecuencia",
        &TextStyle::new(11.0).anchor(Anchor::Middle),
    );
    canvas.text(
        14.0,
        top + plot_height / 2.0,
        "Término",
        &TextStyle::new(11.0).anchor(Anchor::Middle).rotation(90.0),
    );

    finish_chart(canvas.finish(), config.output.as_deref())
}
