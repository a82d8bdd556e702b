//! Image clean-up before OCR.
//!
//! Levels build on each other the usual way for scanned text: grayscale,
//! median blur against speckle noise, global (Otsu) or local (adaptive
//! Gaussian) binarization, and skew correction.

use std::fmt;

use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};

/// Median blur aperture.
pub const MEDIAN_KERNEL: u32 = 5;
/// Adaptive threshold neighbourhood size.
pub const ADAPTIVE_BLOCK: u32 = 75;
/// Constant subtracted from the adaptive threshold.
pub const ADAPTIVE_C: f32 = 15.0;
/// Largest skew angle searched, in degrees.
pub const MAX_SKEW: f32 = 45.0;

/// Preprocessing applied to an image before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Preprocessing {
    /// 0: the image as is.
    None,
    /// 1: grayscale.
    Gray,
    /// 2: grayscale and median blur.
    GrayBlur,
    /// 3: grayscale and Otsu binarization.
    #[default]
    Otsu,
    /// 4: grayscale, median blur, adaptive threshold and deskew.
    Adaptive,
    /// 5: grayscale, Otsu, median blur, adaptive threshold and deskew.
    Full,
}

impl Preprocessing {
    pub fn from_level(level: u8) -> Result<Self> {
        Ok(match level {
            0 => Preprocessing::None,
            1 => Preprocessing::Gray,
            2 => Preprocessing::GrayBlur,
            3 => Preprocessing::Otsu,
            4 => Preprocessing::Adaptive,
            5 => Preprocessing::Full,
            other => {
                return Err(ContextoError::invalid_argument(format!(
                    "Preprocessing level must be between 0 and 5, got {other}"
                )));
            }
        })
    }

    pub fn level(&self) -> u8 {
        match self {
            Preprocessing::None => 0,
            Preprocessing::Gray => 1,
            Preprocessing::GrayBlur => 2,
            Preprocessing::Otsu => 3,
            Preprocessing::Adaptive => 4,
            Preprocessing::Full => 5,
        }
    }

    /// Whether the level straightens the image on its own.
    pub fn deskews(&self) -> bool {
        matches!(self, Preprocessing::Adaptive | Preprocessing::Full)
    }
}

impl TryFrom<u8> for Preprocessing {
    type Error = ContextoError;

    fn try_from(level: u8) -> Result<Self> {
        Preprocessing::from_level(level)
    }
}

impl From<Preprocessing> for u8 {
    fn from(preprocessing: Preprocessing) -> u8 {
        preprocessing.level()
    }
}

impl fmt::Display for Preprocessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// Apply a preprocessing level. `deskew` also straightens levels 1 to 3.
pub fn preprocess(image: &DynamicImage, level: Preprocessing, deskew: bool) -> DynamicImage {
    let gray = match level {
        Preprocessing::None => return image.clone(),
        Preprocessing::Gray => image.to_luma8(),
        Preprocessing::GrayBlur => median_blur(&image.to_luma8(), MEDIAN_KERNEL),
        Preprocessing::Otsu => otsu_binarize(&image.to_luma8()),
        Preprocessing::Adaptive => {
            let blurred = median_blur(&image.to_luma8(), MEDIAN_KERNEL);
            adaptive_threshold(&blurred, ADAPTIVE_BLOCK, ADAPTIVE_C)
        }
        Preprocessing::Full => {
            let binary = otsu_binarize(&image.to_luma8());
            let blurred = median_blur(&binary, MEDIAN_KERNEL);
            adaptive_threshold(&blurred, ADAPTIVE_BLOCK, ADAPTIVE_C)
        }
    };

    let gray = if deskew || level.deskews() {
        self::deskew(&gray)
    } else {
        gray
    };
    DynamicImage::ImageLuma8(gray)
}

fn clamped(value: i64, upper: u32) -> u32 {
    value.clamp(0, i64::from(upper) - 1) as u32
}

/// Median filter with a square aperture, replicating the border.
pub fn median_blur(image: &GrayImage, kernel: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let radius = i64::from(kernel / 2);
    let mut window = Vec::with_capacity((kernel * kernel) as usize);

    GrayImage::from_fn(width, height, |x, y| {
        window.clear();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let sx = clamped(i64::from(x) + dx, width);
                let sy = clamped(i64::from(y) + dy, height);
                window.push(image.get_pixel(sx, sy)[0]);
            }
        }
        window.sort_unstable();
        Luma([window[window.len() / 2]])
    })
}

/// Threshold that maximizes the between-class variance of the histogram.
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let (mut best_level, mut best_variance) = (0u8, -1.0f64);
    let (mut weight_bg, mut sum_bg) = (0u64, 0.0f64);
    for (level, &count) in histogram.iter().enumerate() {
        weight_bg += count;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }
        sum_bg += level as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let variance = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }
    best_level
}

/// Binary image: white where the pixel is above `level`, black elsewhere.
pub fn threshold(image: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([if image.get_pixel(x, y)[0] > level { 255 } else { 0 }])
    })
}

/// Binarize with the Otsu threshold.
pub fn otsu_binarize(image: &GrayImage) -> GrayImage {
    threshold(image, otsu_level(image))
}

fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable Gaussian blur into an f32 buffer, replicating the border.
fn gaussian_blur(image: &GrayImage, size: u32) -> Vec<f32> {
    let (width, height) = image.dimensions();
    let kernel = gaussian_kernel(size);
    let radius = i64::from(size / 2);

    let mut horizontal = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = clamped(i64::from(x) + k as i64 - radius, width);
                acc += weight * f32::from(image.get_pixel(sx, y)[0]);
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    let mut blurred = vec![0.0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = clamped(i64::from(y) + k as i64 - radius, height);
                acc += weight * horizontal[(sy * width + x) as usize];
            }
            blurred[(y * width + x) as usize] = acc;
        }
    }
    blurred
}

/// Adaptive Gaussian threshold: a pixel is white when it is brighter than
/// the Gaussian-weighted mean of its `block`×`block` neighbourhood minus `c`.
pub fn adaptive_threshold(image: &GrayImage, block: u32, c: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let block = if block % 2 == 0 { block + 1 } else { block };
    let means = gaussian_blur(image, block);
    GrayImage::from_fn(width, height, |x, y| {
        let local = means[(y * width + x) as usize] - c;
        Luma([if f32::from(image.get_pixel(x, y)[0]) > local { 255 } else { 0 }])
    })
}

/// Dark pixels taken as ink, subsampled to keep the angle search cheap.
fn ink_points(image: &GrayImage) -> Vec<(f32, f32)> {
    const MAX_POINTS: usize = 20_000;
    let ink: Vec<(f32, f32)> = image
        .enumerate_pixels()
        .filter(|(_, _, pixel)| pixel[0] < 128)
        .map(|(x, y, _)| (x as f32, y as f32))
        .collect();
    let step = ink.len().div_ceil(MAX_POINTS).max(1);
    ink.into_iter().step_by(step).collect()
}

/// Sharpness of the row profile of `points` rotated by `angle` degrees.
fn profile_score(points: &[(f32, f32)], center: (f32, f32), angle: f32, rows: usize) -> f64 {
    let (sin, cos) = angle.to_radians().sin_cos();
    let offset = rows as f32 / 2.0;
    let mut profile = vec![0u32; rows];
    for &(x, y) in points {
        let ry = (x - center.0) * sin + (y - center.1) * cos + offset;
        if ry >= 0.0 && (ry as usize) < rows {
            profile[ry as usize] += 1;
        }
    }
    profile
        .windows(2)
        .map(|w| (f64::from(w[1]) - f64::from(w[0])).powi(2))
        .sum()
}

/// Rotation, in degrees, that makes the text lines of `image` horizontal.
/// Searched in whole degrees over ±45°, then refined in tenths.
pub fn estimate_skew(image: &GrayImage) -> f32 {
    let points = ink_points(image);
    if points.len() < 2 {
        return 0.0;
    }
    let (width, height) = image.dimensions();
    let center = (width as f32 / 2.0, height as f32 / 2.0);
    let rows = ((width as f32).hypot(height as f32).ceil() as usize).max(1) + 2;

    let best_in = |candidates: &mut dyn Iterator<Item = f32>| -> f32 {
        let mut best = (0.0f32, f64::MIN);
        for angle in candidates {
            let score = profile_score(&points, center, angle, rows);
            if score > best.1 || (score == best.1 && angle.abs() < best.0.abs()) {
                best = (angle, score);
            }
        }
        best.0
    };

    let coarse = best_in(&mut (-45..=45).map(|a| a as f32));
    let fine = best_in(&mut (-10..=10).map(|i| coarse + i as f32 / 10.0));
    fine.clamp(-MAX_SKEW, MAX_SKEW)
}

/// Rotate by `angle` degrees about the center with bilinear sampling,
/// replicating the border.
pub fn rotate(image: &GrayImage, angle: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if angle == 0.0 || width == 0 || height == 0 {
        return image.clone();
    }
    let (sin, cos) = angle.to_radians().sin_cos();
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let sample = |x: i64, y: i64| -> f32 {
        f32::from(image.get_pixel(clamped(x, width), clamped(y, height))[0])
    };

    GrayImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        // Inverse rotation maps the output pixel back to the source.
        let sx = dx * cos + dy * sin + cx;
        let sy = -dx * sin + dy * cos + cy;
        let (x0, y0) = (sx.floor(), sy.floor());
        let (fx, fy) = (sx - x0, sy - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = sample(x0, y0) * (1.0 - fx) + sample(x0 + 1, y0) * fx;
        let bottom = sample(x0, y0 + 1) * (1.0 - fx) + sample(x0 + 1, y0 + 1) * fx;
        Luma([(top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8])
    })
}

/// Straighten skewed text.
pub fn deskew(image: &GrayImage) -> GrayImage {
    let angle = estimate_skew(image);
    log::debug!("Estimated skew: {angle:.1}°");
    rotate(image, angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lined_image(slope_degrees: f32) -> GrayImage {
        let slope = slope_degrees.to_radians().tan();
        let mut image = GrayImage::from_pixel(200, 200, Luma([255]));
        for line in 0..6 {
            let base = 40.0 + line as f32 * 22.0;
            for x in 20..180 {
                let y = (base + slope * (x as f32 - 100.0)).round() as u32;
                image.put_pixel(x, y, Luma([0]));
                image.put_pixel(x, y + 1, Luma([0]));
            }
        }
        image
    }

    #[test]
    fn test_levels() {
        assert_eq!(Preprocessing::from_level(4).unwrap(), Preprocessing::Adaptive);
        assert!(Preprocessing::from_level(6).is_err());
        assert_eq!(Preprocessing::default().level(), 3);
        assert!(Preprocessing::Full.deskews());
        assert!(!Preprocessing::Otsu.deskews());
    }

    #[test]
    fn test_median_blur_removes_speckle() {
        let mut image = GrayImage::from_pixel(9, 9, Luma([200]));
        image.put_pixel(4, 4, Luma([0]));
        let blurred = median_blur(&image, MEDIAN_KERNEL);
        assert_eq!(blurred.get_pixel(4, 4)[0], 200);
    }

    #[test]
    fn test_otsu_separates_modes() {
        let image = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 30 } else { 220 }]));
        let level = otsu_level(&image);
        assert!((30..220).contains(&level));
        let binary = otsu_binarize(&image);
        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(9, 0)[0], 255);
    }

    #[test]
    fn test_adaptive_threshold_keeps_dark_text() {
        let mut image = GrayImage::from_pixel(40, 40, Luma([180]));
        for x in 10..30 {
            image.put_pixel(x, 20, Luma([20]));
        }
        let binary = adaptive_threshold(&image, ADAPTIVE_BLOCK, ADAPTIVE_C);
        assert_eq!(binary.get_pixel(15, 20)[0], 0);
        assert_eq!(binary.get_pixel(15, 5)[0], 255);
    }

    #[test]
    fn test_estimate_skew() {
        assert!(estimate_skew(&lined_image(0.0)).abs() < 0.5);
        let angle = estimate_skew(&lined_image(5.0));
        assert!((angle + 5.0).abs() < 1.0, "angle = {angle}");
    }

    #[test]
    fn test_preprocess_output() {
        let image = DynamicImage::ImageLuma8(lined_image(0.0));
        let none = preprocess(&image, Preprocessing::None, false);
        assert_eq!(none, image);
        let gray = preprocess(&image, Preprocessing::Otsu, false);
        assert_eq!(gray.width(), 200);
        assert!(gray.as_luma8().is_some());
    }
}
