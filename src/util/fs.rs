//! Filesystem helpers.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Create `path` (and its parents) unless it already exists.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        log::debug!("Creating directory {}", path.display());
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Create the parent directory of a file path if needed.
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Lowercased extension of a path, without the dot.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();

        let file = temp_dir.path().join("c").join("salida.txt");
        ensure_parent_dir(&file).unwrap();
        assert!(temp_dir.path().join("c").is_dir());
        ensure_parent_dir("relativo.txt").unwrap();
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension(Path::new("doc/Informe.PDF")), Some("pdf".to_string()));
        assert_eq!(extension(Path::new("sin_extension")), None);
    }
}
