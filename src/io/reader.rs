//! Reading text from files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cleaning::make_xml_safe;
use crate::error::{ContextoError, Result};
use crate::io::{DocumentKind, ReadOutput, docx, pdf, rtf};
use crate::ocr::{OcrConfig, OcrEngine, Preprocessing};

/// Character encodings of plain-text files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1: each byte is the code point.
    Latin1,
}

impl Encoding {
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| ContextoError::document(format!("File is not valid UTF-8: {e}"))),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => f.write_str("utf-8"),
            Encoding::Latin1 => f.write_str("latin-1"),
        }
    }
}

impl FromStr for Encoding {
    type Err = ContextoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Encoding::Latin1),
            other => Err(ContextoError::invalid_argument(format!(
                "Unsupported encoding: {other}"
            ))),
        }
    }
}

/// Reading options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub kind: DocumentKind,
    /// Return PDF and Word documents page by page.
    pub by_pages: bool,
    pub encoding: Encoding,
    /// Run OCR on PDF pages instead of reading their text layer.
    pub ocr: bool,
    pub preprocessing: Preprocessing,
    /// Tesseract language.
    pub language: String,
    pub oem: u8,
    pub psm: u8,
    pub password: Option<String>,
    pub deskew: bool,
    /// Copy images embedded in Word documents to this directory.
    pub media_dir: Option<PathBuf>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        let ocr = OcrConfig::default();
        ReaderConfig {
            kind: DocumentKind::Infer,
            by_pages: false,
            encoding: Encoding::Utf8,
            ocr: false,
            preprocessing: ocr.preprocessing,
            language: ocr.language,
            oem: ocr.oem,
            psm: ocr.psm,
            password: None,
            deskew: false,
            media_dir: None,
        }
    }
}

impl ReaderConfig {
    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig {
            preprocessing: self.preprocessing,
            language: self.language.clone(),
            oem: self.oem,
            psm: self.psm,
            deskew: self.deskew,
            ..OcrConfig::default()
        }
    }
}

/// Reads the text of a single file.
///
/// # Examples
///
/// ```
/// use contexto::io::{Reader, ReaderConfig, ReadOutput};
/// # let dir = tempfile::TempDir::new().unwrap();
/// # let path = dir.path().join("notas.txt");
/// # std::fs::write(&path, "  primera línea \nsegunda\n").unwrap();
///
/// let text = Reader::new(&path).read(&ReaderConfig::default()).unwrap();
/// assert_eq!(text, ReadOutput::Text("primera línea\nsegunda".to_string()));
/// ```
pub struct Reader {
    path: PathBuf,
    engine: OcrEngine,
}

impl Reader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Reader {
            path: path.as_ref().to_path_buf(),
            engine: OcrEngine::default(),
        }
    }

    /// Use a specific OCR engine for images and scanned PDFs.
    pub fn with_engine(mut self, engine: OcrEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self, config: &ReaderConfig) -> Result<ReadOutput> {
        let kind = config.kind.resolve(&self.path);
        log::debug!("Reading {} as {kind}", self.path.display());

        let output = match kind {
            DocumentKind::Txt | DocumentKind::Csv => ReadOutput::Text(self.read_plain(config.encoding)?),
            DocumentKind::Pdf => {
                let pages = if config.ocr {
                    self.engine.pdf_to_text(&self.path, &config.ocr_config())?
                } else {
                    pdf::read_pages(&self.path, config.password.as_deref())?
                };
                paged(pages, config.by_pages)
            }
            DocumentKind::Rtf => ReadOutput::Text(self.read_rtf(config.encoding)?),
            DocumentKind::Docx => {
                let pages = docx::read_pages(&self.path, config.media_dir.as_deref())?;
                if config.by_pages {
                    ReadOutput::Pages(pages)
                } else {
                    ReadOutput::Text(pages.join("\n"))
                }
            }
            kind if kind.is_image() => {
                return Ok(ReadOutput::Text(
                    self.engine.image_to_text(&self.path, &config.ocr_config())?,
                ));
            }
            other => {
                return Err(ContextoError::document(format!(
                    "Unknown file format '{other}' for {}",
                    self.path.display()
                )));
            }
        };

        Ok(output.map(make_xml_safe))
    }

    fn read_plain(&self, encoding: Encoding) -> Result<String> {
        let content = encoding.decode(&fs::read(&self.path)?)?;
        Ok(content.lines().map(str::trim).collect::<Vec<_>>().join("\n"))
    }

    fn read_rtf(&self, encoding: Encoding) -> Result<String> {
        let content = encoding.decode(&fs::read(&self.path)?)?;
        Ok(content
            .lines()
            .map(|line| rtf::strip_rtf(line.trim()))
            .collect::<Vec<_>>()
            .join(" "))
    }
}

fn paged(pages: Vec<String>, by_pages: bool) -> ReadOutput {
    if by_pages {
        ReadOutput::Pages(pages)
    } else {
        ReadOutput::Text(pages.join(" "))
    }
}

/// Read the text of `path` with the given options.
pub fn read_text<P: AsRef<Path>>(path: P, config: &ReaderConfig) -> Result<ReadOutput> {
    Reader::new(path).read(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encodings() {
        assert_eq!("ISO-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert_eq!("utf_8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert!("ebcdic".parse::<Encoding>().is_err());
        assert_eq!(Encoding::Latin1.decode(&[b'a', 0xF1, b'o']).unwrap(), "año");
        assert!(Encoding::Utf8.decode(&[0xF1]).is_err());
    }

    #[test]
    fn test_read_latin1_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("viejo.csv");
        fs::write(&path, [b'n', 0xE9, b'\r', b'\n', b'\t', b'x', 0x01]).unwrap();

        let config = ReaderConfig {
            encoding: Encoding::Latin1,
            ..ReaderConfig::default()
        };
        let text = read_text(&path, &config).unwrap();
        assert_eq!(text, ReadOutput::Text("né\nx".to_string()));
    }

    #[test]
    fn test_read_rtf() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("carta.rtf");
        fs::write(&path, "{\\rtf1\\ansi\n\\pard Querido amigo,\n Saludos\\'21}\n").unwrap();

        let text = read_text(&path, &ReaderConfig::default()).unwrap().into_text();
        assert_eq!(text, " Querido amigo, Saludos!");
    }

    #[test]
    fn test_docx_pages() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("informe.docx");
        docx::write_pages(&path, &["uno".to_string(), "dos".to_string()]).unwrap();

        let config = ReaderConfig {
            by_pages: true,
            ..ReaderConfig::default()
        };
        assert_eq!(
            read_text(&path, &config).unwrap(),
            ReadOutput::Pages(vec!["uno".to_string(), "dos".to_string()])
        );
        assert_eq!(
            read_text(&path, &ReaderConfig::default()).unwrap(),
            ReadOutput::Text("uno\ndos".to_string())
        );
    }

    #[test]
    fn test_unknown_kind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tabla.xlsx");
        fs::write(&path, "x").unwrap();
        let err = read_text(&path, &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, ContextoError::Document(_)));
        assert!(read_text(temp_dir.path().join("falta.txt"), &ReaderConfig::default()).is_err());
    }
}
