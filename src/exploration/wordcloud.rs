//! Word clouds.
//!
//! Terms are placed from the most to the least frequent. Each one gets a
//! font size relative to the previous term, an orientation drawn at random,
//! and the first free spot along an archimedean spiral around the middle of
//! the canvas. Free space is tracked on a grid of small cells, so a term
//! that does not fit is retried rotated and then smaller, and the layout
//! stops at the first term that does not fit at the minimum size.

use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageReader};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};
use crate::exploration::finish_chart;
use crate::exploration::ngrams::ngram_frequencies;
use crate::exploration::svg::{Anchor, SvgCanvas, TextStyle, VIRIDIS, color_at, text_width};
use crate::ocr::preprocess::otsu_binarize;

/// Side of a layout cell, in pixels.
const CELL: u32 = 4;
/// Radius of the default circular mask for a 600-pixel canvas.
const CIRCLE_RADIUS: f32 = 260.0 / 600.0;
/// Side of the closing kernel applied to image masks.
const CLOSING: i64 = 5;
const TITLE_HEIGHT: f32 = 40.0;

/// Options of [`word_cloud`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCloudConfig {
    /// Size of the n-grams shown.
    pub ngram: usize,
    /// Number of most frequent n-grams shown.
    pub n_terms: usize,
    /// Share of terms written horizontally, from 0 to 1.
    pub horizontal: f32,
    pub width: u32,
    pub height: u32,
    pub background: String,
    pub seed: u64,
    /// Image whose dark region shapes the cloud. The canvas takes the size
    /// of the image.
    pub mask: Option<PathBuf>,
    /// Font size of the most frequent term; a quarter of the height when unset.
    pub max_font_size: Option<f32>,
    pub min_font_size: f32,
    /// Influence of relative frequency on font size, from 0 to 1.
    pub relative_scaling: f32,
    pub title: String,
    pub output: Option<PathBuf>,
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        WordCloudConfig {
            ngram: 1,
            n_terms: 100,
            horizontal: 0.6,
            width: 600,
            height: 600,
            background: "white".to_string(),
            seed: 1234,
            mask: None,
            max_font_size: None,
            min_font_size: 4.0,
            relative_scaling: 0.5,
            title: "Términos más frecuentes".to_string(),
            output: None,
        }
    }
}

/// Region of the canvas where terms may be placed.
#[derive(Debug, Clone)]
pub struct Mask {
    width: u32,
    height: u32,
    free: Vec<bool>,
}

impl Mask {
    /// Disc centered on the canvas, as wide as 26/30 of its shorter side.
    pub fn circle(width: u32, height: u32) -> Self {
        let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
        let radius = CIRCLE_RADIUS * width.min(height) as f32;
        let mut free = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                free.push(dx * dx + dy * dy <= radius * radius);
            }
        }
        Mask { width, height, free }
    }

    /// Shape of an image: the pixels below its Otsu threshold, or above it
    /// when most of the image is dark. Small holes in the shape are closed.
    pub fn from_image(image: &GrayImage) -> Self {
        let binary = otsu_binarize(image);
        let (width, height) = binary.dimensions();
        let pixels = binary.as_raw();
        let mean = pixels.iter().map(|&p| p as f64).sum::<f64>() / pixels.len().max(1) as f64;
        let free: Vec<bool> = if mean < 100.0 {
            pixels.iter().map(|&p| p > 0).collect()
        } else {
            pixels.iter().map(|&p| p == 0).collect()
        };

        let closed = morph(&morph(&free, width, height, true), width, height, false);
        Mask {
            width,
            height,
            free: closed,
        }
    }

    /// Load the shape of an image file.
    pub fn load(path: &Path) -> Result<Self> {
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| ContextoError::document(format!("Failed to decode mask {}: {e}", path.display())))?;
        Ok(Mask::from_image(&image.to_luma8()))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_free(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.free[(y * self.width + x) as usize]
    }
}

/// Dilation (`grow`) or erosion with a square kernel.
fn morph(cells: &[bool], width: u32, height: u32, grow: bool) -> Vec<bool> {
    let (w, h) = (width as i64, height as i64);
    let reach = CLOSING / 2;
    let mut out = vec![false; cells.len()];
    for y in 0..h {
        for x in 0..w {
            let mut hit = !grow;
            'kernel: for ky in (y - reach).max(0)..=(y + reach).min(h - 1) {
                for kx in (x - reach).max(0)..=(x + reach).min(w - 1) {
                    let value = cells[(ky * w + kx) as usize];
                    if grow && value {
                        hit = true;
                        break 'kernel;
                    }
                    if !grow && !value {
                        hit = false;
                        break 'kernel;
                    }
                }
            }
            out[(y * w + x) as usize] = hit;
        }
    }
    out
}

/// Taken cells with a summed-area table for constant-time box queries.
struct Occupancy {
    width: usize,
    height: usize,
    taken: Vec<bool>,
    integral: Vec<u32>,
}

impl Occupancy {
    fn from_mask(mask: &Mask) -> Self {
        let width = mask.width.div_ceil(CELL) as usize;
        let height = mask.height.div_ceil(CELL) as usize;
        let mut taken = Vec::with_capacity(width * height);
        for cy in 0..height as u32 {
            for cx in 0..width as u32 {
                let x = (cx * CELL + CELL / 2).min(mask.width.saturating_sub(1));
                let y = (cy * CELL + CELL / 2).min(mask.height.saturating_sub(1));
                taken.push(!mask.is_free(x, y));
            }
        }
        let mut occupancy = Occupancy {
            width,
            height,
            taken,
            integral: Vec::new(),
        };
        occupancy.rebuild();
        occupancy
    }

    fn rebuild(&mut self) {
        let stride = self.width + 1;
        self.integral = vec![0; stride * (self.height + 1)];
        for y in 0..self.height {
            for x in 0..self.width {
                self.integral[(y + 1) * stride + x + 1] = self.taken[y * self.width + x] as u32
                    + self.integral[y * stride + x + 1]
                    + self.integral[(y + 1) * stride + x]
                    - self.integral[y * stride + x];
            }
        }
    }

    fn is_free(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        let stride = self.width + 1;
        let sum = self.integral[(y + h) * stride + x + w] + self.integral[y * stride + x]
            - self.integral[y * stride + x + w]
            - self.integral[(y + h) * stride + x];
        sum == 0
    }

    fn take(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for row in y..y + h {
            self.taken[row * self.width + x..row * self.width + x + w].fill(true);
        }
        self.rebuild();
    }

    /// First free spot for a `w`×`h` box along a spiral from `start`.
    fn find_spot(&self, w: usize, h: usize, start: (f32, f32)) -> Option<(usize, usize)> {
        if w > self.width || h > self.height {
            return None;
        }
        let max_radius = self.width.max(self.height) as f32;
        let mut t = 0.0f32;
        loop {
            let radius = t / TAU;
            if radius > max_radius {
                return None;
            }
            let x = (start.0 + radius * t.cos() - w as f32 / 2.0).round();
            let y = (start.1 + radius * t.sin() - h as f32 / 2.0).round();
            if x >= 0.0 && y >= 0.0 {
                let (x, y) = (x as usize, y as usize);
                if x + w <= self.width && y + h <= self.height && self.is_free(x, y, w, h) {
                    return Some((x, y));
                }
            }
            t += 1.0 / radius.max(1.0);
        }
    }
}

/// A term placed in the cloud. `x`, `y`, `width` and `height` give its box
/// in pixels; vertical terms read from bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vertical: bool,
    pub color: String,
}

impl PlacedWord {
    fn draw(&self, canvas: &mut SvgCanvas) {
        let style = TextStyle::new(self.font_size).fill(&self.color);
        if self.vertical {
            let style = style.rotation(90.0);
            canvas.text(self.x + self.font_size * 0.9, self.y + self.height, &self.text, &style);
        } else {
            canvas.text(self.x, self.y + self.font_size * 0.9, &self.text, &style);
        }
    }
}

/// Positions of the terms of a word cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCloudLayout {
    pub width: u32,
    pub height: u32,
    pub words: Vec<PlacedWord>,
}

impl WordCloudLayout {
    /// Place `frequencies` (most frequent first) on the canvas.
    pub fn compute(frequencies: &[(String, usize)], config: &WordCloudConfig) -> Result<Self> {
        let Some((first, max_freq)) = frequencies.first() else {
            return Err(ContextoError::invalid_argument(
                "There are no terms to draw in the word cloud",
            ));
        };
        let mask = match &config.mask {
            Some(path) => Mask::load(path)?,
            None => Mask::circle(config.width, config.height),
        };
        let (width, height) = mask.dimensions();
        let mut occupancy = Occupancy::from_mask(&mask);
        let mut rng = StdRng::seed_from_u64(config.seed);

        let fitting = 0.9 * width as f32 / text_width(first, 1.0).max(f32::EPSILON);
        let mut font_size = config
            .max_font_size
            .unwrap_or(height as f32 / 4.0)
            .min(fitting)
            .floor();
        let rotate = config.horizontal > 0.0 && config.horizontal < 1.0;
        let mut last_freq = 1.0f32;
        let mut words = Vec::new();

        'terms: for (i, (text, freq)) in frequencies.iter().enumerate() {
            let freq = *freq as f32 / *max_freq as f32;
            if i > 0 && config.relative_scaling > 0.0 {
                let scale = config.relative_scaling * freq / last_freq + (1.0 - config.relative_scaling);
                font_size = (scale * font_size).round();
            }
            let mut vertical = rng.random::<f32>() >= config.horizontal;
            let mut flipped = false;
            let start = (
                occupancy.width as f32 / 2.0 + rng.random_range(-1.0f32..=1.0) * occupancy.width as f32 / 8.0,
                occupancy.height as f32 / 2.0 + rng.random_range(-1.0f32..=1.0) * occupancy.height as f32 / 8.0,
            );

            loop {
                if font_size < config.min_font_size {
                    log::debug!("No room left for '{text}'; placed {} terms", words.len());
                    break 'terms;
                }
                let (mut box_w, mut box_h) = (text_width(text, font_size), font_size * 1.1);
                if vertical {
                    std::mem::swap(&mut box_w, &mut box_h);
                }
                let cells_w = (box_w / CELL as f32).ceil() as usize;
                let cells_h = (box_h / CELL as f32).ceil() as usize;
                if let Some((cx, cy)) = occupancy.find_spot(cells_w, cells_h, start) {
                    occupancy.take(cx, cy, cells_w, cells_h);
                    words.push(PlacedWord {
                        text: text.clone(),
                        font_size,
                        x: (cx as u32 * CELL) as f32,
                        y: (cy as u32 * CELL) as f32,
                        width: box_w,
                        height: box_h,
                        vertical,
                        color: color_at(VIRIDIS, rng.random()),
                    });
                    break;
                }
                if rotate && !flipped {
                    vertical = !vertical;
                    flipped = true;
                } else {
                    font_size = (font_size * 0.9).floor();
                }
            }
            last_freq = freq;
        }

        Ok(WordCloudLayout {
            width,
            height,
            words,
        })
    }

    fn draw(&self, canvas: &mut SvgCanvas) {
        for word in &self.words {
            word.draw(canvas);
        }
    }

    /// Render as SVG, with `title` above the cloud unless empty.
    pub fn to_svg(&self, background: &str, title: &str) -> String {
        let top = if title.is_empty() { 0.0 } else { TITLE_HEIGHT };
        let mut canvas = SvgCanvas::new(self.width as f32, self.height as f32 + top, background);
        if !title.is_empty() {
            canvas.text(
                self.width as f32 / 2.0,
                TITLE_HEIGHT * 0.7,
                title,
                &TextStyle::new(18.0).anchor(Anchor::Middle),
            );
        }
        canvas.begin_group(0.0, top);
        self.draw(&mut canvas);
        canvas.end_group();
        canvas.finish()
    }
}

/// Word cloud of the most frequent n-grams of `text`, as SVG.
///
/// # Examples
///
/// ```
/// use contexto::exploration::{WordCloudConfig, word_cloud};
///
/// let text = "datos abiertos datos públicos datos";
/// let svg = word_cloud(text, &WordCloudConfig::default()).unwrap();
/// assert!(svg.contains(">datos</text>"));
/// ```
pub fn word_cloud(text: &str, config: &WordCloudConfig) -> Result<String> {
    let frequencies = ngram_frequencies(text, config.ngram, Some(config.n_terms))?;
    let layout = WordCloudLayout::compute(&frequencies, config)?;
    log::info!("Word cloud with {} of {} terms", layout.words.len(), frequencies.len());
    finish_chart(
        layout.to_svg(&config.background, &config.title),
        config.output.as_deref(),
    )
}

fn pair_title(n: usize) -> String {
    if n == 1 {
        "Nube de palabras: términos".to_string()
    } else {
        format!("Nube de palabras: n_gramas ({n})")
    }
}

/// Two word clouds side by side: `n1`-grams on the left (mostly horizontal)
/// and `n2`-grams on the right (horizontal).
pub fn word_cloud_pair(text: &str, n1: usize, n2: usize, config: &WordCloudConfig) -> Result<String> {
    let left = WordCloudLayout::compute(
        &ngram_frequencies(text, n1, Some(config.n_terms))?,
        &WordCloudConfig {
            horizontal: 0.8,
            ..config.clone()
        },
    )?;
    let right = WordCloudLayout::compute(
        &ngram_frequencies(text, n2, Some(config.n_terms))?,
        &WordCloudConfig {
            horizontal: 1.0,
            ..config.clone()
        },
    )?;

    let header = 2.0 * TITLE_HEIGHT;
    let width = (left.width + right.width) as f32;
    let height = left.height.max(right.height) as f32 + header;
    let mut canvas = SvgCanvas::new(width, height, &config.background);
    canvas.text(
        width / 2.0,
        TITLE_HEIGHT * 0.8,
        &config.title,
        &TextStyle::new(28.0).anchor(Anchor::Middle),
    );
    let subtitle = TextStyle::new(18.0).anchor(Anchor::Middle);
    canvas.text(left.width as f32 / 2.0, header - 8.0, &pair_title(n1), &subtitle);
    canvas.text(
        left.width as f32 + right.width as f32 / 2.0,
        header - 8.0,
        &pair_title(n2),
        &subtitle,
    );

    canvas.begin_group(0.0, header);
    left.draw(&mut canvas);
    canvas.end_group();
    canvas.begin_group(left.width as f32, header);
    right.draw(&mut canvas);
    canvas.end_group();

    finish_chart(canvas.finish(), config.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use tempfile::TempDir;

    fn frequencies() -> Vec<(String, usize)> {
        [("ciudad", 20), ("parque", 12), ("río", 9), ("calle", 5), ("plaza", 5), ("sol", 2)]
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect()
    }

    fn overlaps(a: &PlacedWord, b: &PlacedWord) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    #[test]
    fn test_circle_mask() {
        let mask = Mask::circle(600, 600);
        assert!(mask.is_free(300, 300));
        assert!(mask.is_free(300, 45));
        assert!(!mask.is_free(5, 5));
        assert!(!mask.is_free(600, 300));
    }

    #[test]
    fn test_image_mask() {
        let image = GrayImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) && !(x == 20 && y == 20) {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        let mask = Mask::from_image(&image);
        assert_eq!(mask.dimensions(), (40, 40));
        assert!(mask.is_free(15, 15));
        assert!(mask.is_free(20, 20));
        assert!(!mask.is_free(2, 2));
    }

    #[test]
    fn test_layout() {
        let layout = WordCloudLayout::compute(&frequencies(), &WordCloudConfig::default()).unwrap();
        assert_eq!(layout.words.len(), 6);
        assert_eq!(layout.words[0].text, "ciudad");
        assert!(layout.words.windows(2).all(|w| w[0].font_size >= w[1].font_size));

        for (i, a) in layout.words.iter().enumerate() {
            let (dx, dy) = (a.x + a.width / 2.0 - 300.0, a.y + a.height / 2.0 - 300.0);
            assert!((dx * dx + dy * dy).sqrt() <= 262.0, "{} outside the circle", a.text);
            for b in &layout.words[i + 1..] {
                assert!(!overlaps(a, b), "{} overlaps {}", a.text, b.text);
            }
        }

        let again = WordCloudLayout::compute(&frequencies(), &WordCloudConfig::default()).unwrap();
        assert_eq!(layout, again);
    }

    #[test]
    fn test_orientation() {
        let horizontal = WordCloudConfig {
            horizontal: 1.0,
            ..WordCloudConfig::default()
        };
        let layout = WordCloudLayout::compute(&frequencies(), &horizontal).unwrap();
        assert!(layout.words.iter().all(|w| !w.vertical));

        let vertical = WordCloudConfig {
            horizontal: 0.0,
            ..WordCloudConfig::default()
        };
        let layout = WordCloudLayout::compute(&frequencies(), &vertical).unwrap();
        assert!(layout.words.iter().all(|w| w.vertical && w.height > w.width));
    }

    #[test]
    fn test_empty_text() {
        assert!(word_cloud("", &WordCloudConfig::default()).is_err());
    }

    #[test]
    fn test_mask_file_sets_canvas() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("forma.png");
        GrayImage::from_fn(300, 200, |x, _| if x < 150 { Luma([0]) } else { Luma([255]) })
            .save(&path)
            .unwrap();

        let config = WordCloudConfig {
            mask: Some(path),
            ..WordCloudConfig::default()
        };
        let layout = WordCloudLayout::compute(&frequencies(), &config).unwrap();
        assert_eq!((layout.width, layout.height), (300, 200));
        assert!(!layout.words.is_empty());
        assert!(layout.words.iter().all(|w| w.x + w.width <= 152.0));
    }

    #[test]
    fn test_word_cloud_pair() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("nubes.svg");
        let config = WordCloudConfig {
            output: Some(output.clone()),
            ..WordCloudConfig::default()
        };
        let text = "el agua del río y el agua del mar";
        let svg = word_cloud_pair(text, 1, 2, &config).unwrap();

        assert!(svg.contains("Nube de palabras: términos"));
        assert!(svg.contains("Nube de palabras: n_gramas (2)"));
        assert!(svg.contains(">el agua</text>"));
        assert_eq!(std::fs::read_to_string(output).unwrap(), svg);
    }
}
