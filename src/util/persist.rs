//! Saving and loading fitted models.
//!
//! Objects are written with `bincode`, so any `Serialize` model can be stored
//! and restored later with the same type. Each file starts with a small
//! [`ModelHeader`] recording when and by which version it was written.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ContextoError, Result};
use crate::util::fs::ensure_parent_dir;

const MAGIC: &str = "contexto-model";

/// Leading record of every saved model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHeader {
    magic: String,
    pub version: String,
    pub saved_at: DateTime<Utc>,
}

impl ModelHeader {
    fn now() -> Self {
        ModelHeader {
            magic: MAGIC.to_string(),
            version: crate::VERSION.to_string(),
            saved_at: Utc::now(),
        }
    }
}

/// Serialize `object` into the file at `path`.
pub fn save_object<T: Serialize, P: AsRef<Path>>(object: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &ModelHeader::now())?;
    bincode::serialize_into(&mut writer, object)?;
    log::debug!("Saved object to {}", path.display());
    Ok(())
}

fn read_header<R: std::io::Read>(reader: R, path: &Path) -> Result<ModelHeader> {
    match bincode::deserialize_from::<_, ModelHeader>(reader) {
        Ok(header) if header.magic == MAGIC => Ok(header),
        _ => Err(ContextoError::serialization(format!(
            "{} is not a saved contexto model",
            path.display()
        ))),
    }
}

/// Header of a file written by [`save_object`].
pub fn load_header<P: AsRef<Path>>(path: P) -> Result<ModelHeader> {
    let path = path.as_ref();
    read_header(BufReader::new(File::open(path)?), path)
}

/// Deserialize an object previously written by [`save_object`].
pub fn load_object<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let header = read_header(&mut reader, path)?;
    if header.version != crate::VERSION {
        log::warn!(
            "{} was saved by version {}, this is {}",
            path.display(),
            header.version,
            crate::VERSION
        );
    }
    let object = bincode::deserialize_from(reader)?;
    log::debug!(
        "Loaded object from {} (saved {})",
        path.display(),
        header.saved_at.format("%Y-%m-%d %H:%M:%S")
    );
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modelos").join("conteos.bin");

        let mut counts: HashMap<String, u32> = HashMap::new();
        counts.insert("casa".to_string(), 3);
        save_object(&counts, &path).unwrap();

        let loaded: HashMap<String, u32> = load_object(&path).unwrap();
        assert_eq!(loaded, counts);
    }

    #[test]
    fn test_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("modelo.bin");
        let before = Utc::now();
        save_object(&vec![1u32, 2, 3], &path).unwrap();

        let header = load_header(&path).unwrap();
        assert_eq!(header.version, crate::VERSION);
        assert!(header.saved_at >= before);
    }

    #[test]
    fn test_rejects_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("otro.bin");
        std::fs::write(&path, bincode::serialize("otro-formato").unwrap()).unwrap();
        assert!(matches!(
            load_object::<Vec<u32>, _>(&path),
            Err(ContextoError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<Vec<u8>> = load_object("/no/existe/modelo.bin");
        assert!(result.is_err());
    }
}
