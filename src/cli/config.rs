//! Defaults loaded from the `--config` JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cleaning::CleaningConfig;
use crate::error::{ContextoError, Result};
use crate::exploration::{
    BarChartConfig, CooccurrenceConfig, DispersionConfig, GraphConfig, WordCloudConfig,
};
use crate::io::ReaderConfig;
use crate::language::Language;
use crate::ocr::OcrConfig;
use crate::spelling::CorrectorConfig;
use crate::vectorization::{Doc2VecConfig, FrequencyVectorizerConfig};

/// Settings shared by every command. Missing sections keep their defaults.
///
/// ```json
/// {
///   "language": "en",
///   "cleaning": { "n_min": 3 },
///   "wordcloud": { "n_terms": 50, "seed": 7 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextoConfig {
    /// Language name or code; `auto` detects it where a command allows.
    pub language: String,
    pub cleaning: CleaningConfig,
    pub corrector: CorrectorConfig,
    pub vectorizer: FrequencyVectorizerConfig,
    pub doc2vec: Doc2VecConfig,
    pub reader: ReaderConfig,
    pub ocr: OcrConfig,
    pub cooccurrence: CooccurrenceConfig,
    pub wordcloud: WordCloudConfig,
    pub barchart: BarChartConfig,
    pub graph: GraphConfig,
    pub dispersion: DispersionConfig,
}

impl Default for ContextoConfig {
    fn default() -> Self {
        ContextoConfig {
            language: "es".to_string(),
            cleaning: CleaningConfig::default(),
            corrector: CorrectorConfig::default(),
            vectorizer: FrequencyVectorizerConfig::default(),
            doc2vec: Doc2VecConfig::default(),
            reader: ReaderConfig::default(),
            ocr: OcrConfig::default(),
            cooccurrence: CooccurrenceConfig::default(),
            wordcloud: WordCloudConfig::default(),
            barchart: BarChartConfig::default(),
            graph: GraphConfig::default(),
            dispersion: DispersionConfig::default(),
        }
    }
}

impl ContextoConfig {
    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ContextoError::other(format!("Cannot read config {}: {e}", path.display()))
        })?;
        let config = serde_json::from_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => ContextoConfig::load(path),
            None => Ok(ContextoConfig::default()),
        }
    }

    /// Resolve a language given on the command line, falling back to the
    /// configured one. `auto` detects the language of `text`.
    pub fn resolve_language(&self, flag: Option<&str>, text: &str) -> Result<Language> {
        let name = flag.unwrap_or(&self.language);
        if name.trim().eq_ignore_ascii_case("auto") {
            let guess = crate::language::detect_language(text)?;
            log::info!(
                "Detected language: {} ({:.2})",
                guess.language.name(),
                guess.probability
            );
            Ok(guess.language)
        } else {
            Language::parse(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_config() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{"language": "en", "cleaning": {"n_min": 3}, "wordcloud": {"n_terms": 50}}"#,
        )
        .unwrap();

        let config = ContextoConfig::load(file.path()).unwrap();
        assert_eq!(config.language, "en");
        assert_eq!(config.cleaning.n_min, 3);
        assert!(config.cleaning.remove_accents);
        assert_eq!(config.wordcloud.n_terms, 50);
        assert_eq!(config.barchart, BarChartConfig::default());
    }

    #[test]
    fn test_resolve_language() {
        let config = ContextoConfig::default();
        assert_eq!(config.resolve_language(None, "").unwrap(), Language::Spanish);
        assert_eq!(
            config.resolve_language(Some("english"), "").unwrap(),
            Language::English
        );
        assert_eq!(
            config
                .resolve_language(Some("auto"), "the cat and the dog are in the house")
                .unwrap(),
            Language::English
        );
        assert!(config.resolve_language(Some("klingon"), "").is_err());
    }

    #[test]
    fn test_invalid_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "{ not json").unwrap();
        assert!(ContextoConfig::load(file.path()).is_err());
        assert!(ContextoConfig::load("/no/such/config.json").is_err());
    }
}
