//! Text cleaning.
//!
//! [`clean_text`] runs the full pipeline: listed words and expressions are
//! removed from the raw text, accents are stripped, punctuation and symbols
//! dropped, short words discarded, and the lists applied once more in case the
//! earlier steps produced new matches.
//!
//! # Examples
//!
//! ```
//! use contexto::cleaning::{CleaningConfig, clean_text};
//!
//! let config = CleaningConfig {
//!     words: vec!["de".to_string()],
//!     n_min: 3,
//!     ..CleaningConfig::default()
//! };
//! let cleaned = clean_text("¡La Canción de 1990 es muy BUENA!", &config).unwrap();
//! assert_eq!(cleaned, "cancion muy buena");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod atypical;
pub mod basic;
pub mod stopwords;

pub use atypical::{AtypicalConfig, remove_atypical_words};
pub use basic::{
    basic_cleaning, make_xml_safe, remove_accents, remove_repeated, remove_short_words, trim_ends,
};
pub use stopwords::{
    NameKind, PlaceKind, StopwordList, colombia_places, load_stopwords, names,
    remove_stopwords, remove_stopwords_from_file, stopwords, surnames,
};

/// Options of [`clean_text`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Words to remove
    pub words: Vec<String>,
    /// Multi-word expressions to remove
    pub expressions: Vec<String>,
    /// File with words and expressions; replaces both lists when set
    pub stopwords_file: Option<PathBuf>,
    /// Minimum word length in characters
    pub n_min: usize,
    pub remove_numbers: bool,
    pub remove_accents: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        CleaningConfig {
            words: Vec::new(),
            expressions: Vec::new(),
            stopwords_file: None,
            n_min: 0,
            remove_numbers: true,
            remove_accents: true,
        }
    }
}

impl CleaningConfig {
    /// The word and expression lists this configuration removes.
    pub fn stopword_list(&self) -> Result<StopwordList> {
        match &self.stopwords_file {
            Some(path) => load_stopwords(path),
            None => Ok(StopwordList {
                words: self.words.clone(),
                expressions: self.expressions.clone(),
            }),
        }
    }
}

/// Full cleaning of a text.
pub fn clean_text(text: &str, config: &CleaningConfig) -> Result<String> {
    let list = config.stopword_list()?;

    let mut text = remove_stopwords(text, &list.words, &list.expressions)?;
    if config.remove_accents {
        text = remove_accents(&text);
    }
    text = basic_cleaning(&text, config.remove_numbers);
    text = remove_short_words(&text, config.n_min);
    remove_stopwords(&text, &list.words, &list.expressions)
}

/// Items found in `text`.
///
/// When `sep` is given, an item such as `"cambio|plan"` matches if every
/// part appears somewhere in the text, not necessarily together.
pub fn search_in_text<'a>(text: &str, items: &'a [String], sep: Option<&str>) -> Vec<&'a str> {
    items
        .iter()
        .filter(|item| match sep {
            Some(sep) => item.split(sep).all(|part| text.contains(part)),
            None => text.contains(item.as_str()),
        })
        .map(String::as_str)
        .collect()
}

/// Whether at least one item is found in `text`, see [`search_in_text`].
pub fn contains_any(text: &str, items: &[String], sep: Option<&str>) -> bool {
    !search_in_text(text, items, sep).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_defaults() {
        let cleaned = clean_text("  El niño comió 3 manzanas, ¡qué rico!  ", &CleaningConfig::default()).unwrap();
        assert_eq!(cleaned, "el nino comio manzanas que rico");
    }

    #[test]
    fn test_clean_text_keeps_accents_and_numbers() {
        let config = CleaningConfig {
            remove_numbers: false,
            remove_accents: false,
            expressions: vec!["San Juan".to_string()],
            ..CleaningConfig::default()
        };
        let cleaned = clean_text("Visité San Juan en 2019.", &config).unwrap();
        assert_eq!(cleaned, "visité en 2019");
    }

    #[test]
    fn test_search_in_text() {
        let items = vec!["cambio|plan".to_string(), "presupuesto".to_string()];
        let text = "hubo un cambio en el plan";
        assert_eq!(search_in_text(text, &items, Some("|")), vec!["cambio|plan"]);
        assert!(search_in_text(text, &items, None).is_empty());
        assert!(contains_any(text, &items, Some("|")));
    }
}
