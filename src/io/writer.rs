//! Writing text to files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io::{DocumentKind, PAGE_SEPARATOR, ReadOutput, docx, pdf};
use crate::util::fs::ensure_parent_dir;

/// Writes a text, or a list of pages, to a file.
///
/// # Examples
///
/// ```
/// use contexto::io::{DocumentKind, Writer};
/// # let dir = tempfile::TempDir::new().unwrap();
/// # let path = dir.path().join("salida.txt");
///
/// let pages = vec!["uno".to_string(), "dos".to_string()];
/// let written = Writer::new(&path, pages).write(&DocumentKind::Infer).unwrap();
/// assert_eq!(std::fs::read_to_string(written).unwrap(), "uno\n\n|**|\n\ndos");
/// ```
pub struct Writer {
    path: PathBuf,
    content: ReadOutput,
}

impl Writer {
    pub fn new<P: AsRef<Path>, C: Into<ReadOutput>>(path: P, content: C) -> Self {
        Writer {
            path: path.as_ref().to_path_buf(),
            content: content.into(),
        }
    }

    /// Write the content and return the path actually written. Unknown kinds
    /// fall back to plain text in `<stem>_<kind>.txt`.
    pub fn write(&self, kind: &DocumentKind) -> Result<PathBuf> {
        let kind = kind.resolve(&self.path);
        let pages = self.content.clone().into_pages();

        match kind {
            DocumentKind::Txt | DocumentKind::Csv => {
                self.write_plain(&self.path)?;
                Ok(self.path.clone())
            }
            DocumentKind::Pdf => {
                pdf::write_pages(&self.path, &pages)?;
                Ok(self.path.clone())
            }
            DocumentKind::Docx => {
                docx::write_pages(&self.path, &pages)?;
                Ok(self.path.clone())
            }
            other => {
                let fallback = fallback_path(&self.path, other.name());
                log::warn!(
                    "Unknown format '{other}'; writing plain text to {}",
                    fallback.display()
                );
                self.write_plain(&fallback)?;
                Ok(fallback)
            }
        }
    }

    fn write_plain(&self, path: &Path) -> Result<()> {
        let text = match &self.content {
            ReadOutput::Text(text) => text.clone(),
            ReadOutput::Pages(pages) => pages.join(PAGE_SEPARATOR),
        };
        ensure_parent_dir(path)?;
        fs::write(path, text)?;
        Ok(())
    }
}

/// `dir/name.ext` becomes `dir/name_<kind>.txt`.
fn fallback_path(path: &Path, kind: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_{kind}.txt"))
}

/// Write `content` to `path`, returning the path written.
pub fn write_text<P: AsRef<Path>, C: Into<ReadOutput>>(
    path: P,
    content: C,
    kind: &DocumentKind,
) -> Result<PathBuf> {
    Writer::new(path, content).write(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ReaderConfig, read_text};
    use tempfile::TempDir;

    #[test]
    fn test_fallback_for_unknown_kind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("datos.xlsx");
        let written = write_text(&path, "contenido", &DocumentKind::Infer).unwrap();

        assert_eq!(written, temp_dir.path().join("datos_xlsx.txt"));
        assert_eq!(fs::read_to_string(&written).unwrap(), "contenido");
        assert!(!path.exists());
    }

    #[test]
    fn test_forced_kind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sub").join("notas.dat");
        let written = write_text(&path, "hola", &DocumentKind::Txt).unwrap();
        assert_eq!(written, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hola");
    }

    #[test]
    fn test_docx_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("carta.docx");
        let pages = vec!["Estimado señor:".to_string(), "Atentamente".to_string()];
        write_text(&path, pages.clone(), &DocumentKind::Infer).unwrap();

        let config = ReaderConfig {
            by_pages: true,
            ..ReaderConfig::default()
        };
        assert_eq!(read_text(&path, &config).unwrap().into_pages(), pages);
    }
}
