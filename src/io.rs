//! Reading text out of documents and writing text back to them.
//!
//! Supported kinds are plain text (`txt`, `csv`), PDF, RTF, Word (`docx`)
//! and images (`png`, `jpg`, `jpeg`, through OCR). The kind is normally
//! inferred from the file extension.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};
use crate::util::fs::extension;

pub mod docx;
pub mod pdf;
pub mod reader;
pub mod rtf;
pub mod writer;

pub use reader::{Encoding, Reader, ReaderConfig, read_text};
pub use rtf::strip_rtf;
pub use writer::{Writer, write_text};

/// Separator placed between pages when several pages are written to a
/// plain-text file.
pub const PAGE_SEPARATOR: &str = "\n\n|**|\n\n";

/// File kinds understood by [`Reader`] and [`Writer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Take the kind from the file extension.
    #[default]
    Infer,
    Txt,
    Csv,
    Pdf,
    Rtf,
    Docx,
    Png,
    Jpg,
    Jpeg,
    /// Anything else, by extension.
    Other(String),
}

impl DocumentKind {
    /// Resolve [`DocumentKind::Infer`] against the extension of `path`.
    pub fn resolve(&self, path: &Path) -> DocumentKind {
        match self {
            DocumentKind::Infer => match extension(path) {
                Some(ext) => ext.parse().unwrap_or(DocumentKind::Other(ext)),
                None => DocumentKind::Other(String::new()),
            },
            other => other.clone(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, DocumentKind::Png | DocumentKind::Jpg | DocumentKind::Jpeg)
    }

    pub fn name(&self) -> &str {
        match self {
            DocumentKind::Infer => "infer",
            DocumentKind::Txt => "txt",
            DocumentKind::Csv => "csv",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Rtf => "rtf",
            DocumentKind::Docx => "docx",
            DocumentKind::Png => "png",
            DocumentKind::Jpg => "jpg",
            DocumentKind::Jpeg => "jpeg",
            DocumentKind::Other(ext) => ext,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentKind {
    type Err = ContextoError;

    /// Parse a kind name. Unknown names are an error; use
    /// [`DocumentKind::Other`] directly to carry them.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "infer" | "inferir" => Ok(DocumentKind::Infer),
            "txt" => Ok(DocumentKind::Txt),
            "csv" => Ok(DocumentKind::Csv),
            "pdf" => Ok(DocumentKind::Pdf),
            "rtf" => Ok(DocumentKind::Rtf),
            "doc" | "docx" => Ok(DocumentKind::Docx),
            "png" => Ok(DocumentKind::Png),
            "jpg" => Ok(DocumentKind::Jpg),
            "jpeg" => Ok(DocumentKind::Jpeg),
            other => Err(ContextoError::document(format!(
                "Unknown document kind: {other}"
            ))),
        }
    }
}

/// Text of a document, whole or split by pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadOutput {
    Text(String),
    Pages(Vec<String>),
}

impl ReadOutput {
    /// The whole text; pages are joined with a single space.
    pub fn into_text(self) -> String {
        match self {
            ReadOutput::Text(text) => text,
            ReadOutput::Pages(pages) => pages.join(" "),
        }
    }

    /// The pages; a whole text is a single page.
    pub fn into_pages(self) -> Vec<String> {
        match self {
            ReadOutput::Text(text) => vec![text],
            ReadOutput::Pages(pages) => pages,
        }
    }

    pub(crate) fn map<F: Fn(&str) -> String>(self, f: F) -> Self {
        match self {
            ReadOutput::Text(text) => ReadOutput::Text(f(&text)),
            ReadOutput::Pages(pages) => ReadOutput::Pages(pages.iter().map(|p| f(p)).collect()),
        }
    }
}

impl From<String> for ReadOutput {
    fn from(text: String) -> Self {
        ReadOutput::Text(text)
    }
}

impl From<&str> for ReadOutput {
    fn from(text: &str) -> Self {
        ReadOutput::Text(text.to_string())
    }
}

impl From<Vec<String>> for ReadOutput {
    fn from(pages: Vec<String>) -> Self {
        ReadOutput::Pages(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_resolution() {
        let kind = DocumentKind::Infer;
        assert_eq!(kind.resolve(Path::new("a/informe.PDF")), DocumentKind::Pdf);
        assert_eq!(kind.resolve(Path::new("notas.doc")), DocumentKind::Docx);
        assert_eq!(
            kind.resolve(Path::new("datos.xlsx")),
            DocumentKind::Other("xlsx".to_string())
        );
        assert_eq!(DocumentKind::Txt.resolve(Path::new("x.pdf")), DocumentKind::Txt);
        assert!(DocumentKind::Jpeg.is_image());
        assert!("xlsx".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_read_output() {
        let pages = ReadOutput::from(vec!["uno".to_string(), "dos".to_string()]);
        assert_eq!(pages.clone().into_text(), "uno dos");
        assert_eq!(pages.into_pages().len(), 2);
        assert_eq!(ReadOutput::from("hola").into_pages(), vec!["hola"]);
    }
}
