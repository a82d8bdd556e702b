//! Tesseract and pdftoppm command-line drivers.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::error::{ContextoError, Result};
use crate::language::tesseract_language;
use crate::ocr::preprocess::{Preprocessing, preprocess};

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub preprocessing: Preprocessing,
    /// Tesseract language, such as `spa` or `spa+eng`. Plain language names
    /// (`es`, `english`) are converted.
    pub language: String,
    /// OCR engine mode.
    pub oem: u8,
    /// Page segmentation mode.
    pub psm: u8,
    /// Straighten the image even when the preprocessing level does not.
    pub deskew: bool,
    /// Resolution used to rasterize PDF pages.
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            preprocessing: Preprocessing::Otsu,
            language: "spa".to_string(),
            oem: 2,
            psm: 3,
            deskew: false,
            dpi: 200,
        }
    }
}

impl OcrConfig {
    /// Arguments passed to Tesseract after the input and output paths.
    pub fn tesseract_args(&self) -> Vec<String> {
        vec![
            "-l".to_string(),
            tesseract_language(&self.language),
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ]
    }
}

/// Runs OCR through external executables.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    tesseract: PathBuf,
    pdftoppm: PathBuf,
}

impl Default for OcrEngine {
    fn default() -> Self {
        OcrEngine {
            tesseract: PathBuf::from("tesseract"),
            pdftoppm: PathBuf::from("pdftoppm"),
        }
    }
}

fn run(command: &mut Command, program: &Path) -> Result<Vec<u8>> {
    log::debug!("Running {command:?}");
    let output = command.output().map_err(|e| {
        ContextoError::ocr(format!(
            "Could not run {}: {e}. Is it installed and in the PATH?",
            program.display()
        ))
    })?;
    if !output.status.success() {
        return Err(ContextoError::ocr(format!(
            "{} failed ({}): {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output.stdout)
}

impl OcrEngine {
    pub fn new() -> Self {
        OcrEngine::default()
    }

    /// Use executables other than the ones found in the `PATH`.
    pub fn with_executables<P: Into<PathBuf>, Q: Into<PathBuf>>(tesseract: P, pdftoppm: Q) -> Self {
        OcrEngine {
            tesseract: tesseract.into(),
            pdftoppm: pdftoppm.into(),
        }
    }

    /// Command that reads `image_path` and prints the text to stdout.
    pub fn tesseract_command(&self, image_path: &Path, config: &OcrConfig) -> Command {
        let mut command = Command::new(&self.tesseract);
        command.arg(image_path).arg("stdout").args(config.tesseract_args());
        command
    }

    /// Command that renders every page of `pdf_path` as `<prefix>-N.png`.
    pub fn pdftoppm_command(&self, pdf_path: &Path, prefix: &Path, dpi: u32) -> Command {
        let mut command = Command::new(&self.pdftoppm);
        command
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(pdf_path)
            .arg(prefix);
        command
    }

    /// Text in an image file.
    pub fn image_to_text(&self, path: &Path, config: &OcrConfig) -> Result<String> {
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| ContextoError::ocr(format!("Failed to decode {}: {e}", path.display())))?;
        self.recognize(&image, config)
    }

    /// Text in a decoded image.
    pub fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> Result<String> {
        let processed = preprocess(image, config.preprocessing, config.deskew);

        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join("page.png");
        processed
            .save(&image_path)
            .map_err(|e| ContextoError::ocr(format!("Failed to write temporary image: {e}")))?;

        let stdout = run(&mut self.tesseract_command(&image_path, config), &self.tesseract)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    /// Text of each page of a PDF, rendering pages to images first.
    pub fn pdf_to_text(&self, path: &Path, config: &OcrConfig) -> Result<Vec<String>> {
        let temp_dir = TempDir::new()?;
        let prefix = temp_dir.path().join("page");
        run(
            &mut self.pdftoppm_command(path, &prefix, config.dpi),
            &self.pdftoppm,
        )?;

        let mut pages: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        pages.sort_by_key(|p| page_number(p));
        log::info!("Running OCR on {} pages of {}", pages.len(), path.display());

        pages
            .iter()
            .map(|page| self.image_to_text(page, config))
            .collect()
    }
}

/// Page number in a pdftoppm file name such as `page-07.png`.
fn page_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}
