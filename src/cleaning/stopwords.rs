//! Word and expression lists, and their removal from text.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::stop::stop_words;
use crate::analysis::tokenizer::{detokenize, tokenize};
use crate::cleaning::basic::collapse_spaces;
use crate::error::{ContextoError, Result};
use crate::language::Language;

const MEN_NAMES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lists/nombres_hombres.txt"));
const WOMEN_NAMES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lists/nombres_mujeres.txt"));
const SHARED_NAMES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lists/nombres_ambos.txt"));
const SURNAMES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lists/apellidos.txt"));
const MUNICIPALITIES: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lists/municipios_col.txt"));
const DEPARTMENTS: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lists/departamentos_col.txt"));

/// Single words and multi-word expressions to remove from a text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopwordList {
    pub words: Vec<String>,
    pub expressions: Vec<String>,
}

impl StopwordList {
    /// Parse comma-separated items, one or more per line. Items containing a
    /// space are expressions.
    pub fn parse(content: &str) -> Self {
        let mut list = StopwordList::default();
        for line in content.lines() {
            for item in line.trim().split(',') {
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                if item.contains(' ') {
                    list.expressions.push(item.to_string());
                } else {
                    list.words.push(item.to_string());
                }
            }
        }
        list
    }

    /// Union of two lists, sorted and without duplicates.
    pub fn union(&self, other: &StopwordList) -> Self {
        let merge = |a: &[String], b: &[String]| -> Vec<String> {
            a.iter()
                .chain(b.iter())
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        };
        StopwordList {
            words: merge(&self.words, &other.words),
            expressions: merge(&self.expressions, &other.expressions),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.expressions.is_empty()
    }
}

/// Load a [`StopwordList`] from a plain-text file.
pub fn load_stopwords<P: AsRef<Path>>(path: P) -> Result<StopwordList> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(StopwordList::parse(&content))
}

/// Remove expressions, then listed words, from a text.
///
/// Expressions are replaced by a space before tokenizing; words are matched
/// against whole tokens. The remaining tokens are detokenized and repeated
/// spaces collapsed.
pub fn remove_stopwords(text: &str, words: &[String], expressions: &[String]) -> Result<String> {
    let mut text = text.to_string();
    let unique_expressions: HashSet<&String> = expressions.iter().collect();
    for expression in unique_expressions {
        if !expression.is_empty() {
            text = text.replace(expression.as_str(), " ");
        }
    }

    let words: HashSet<&str> = words.iter().map(String::as_str).collect();
    let kept: Vec<String> = tokenize(&text, None)?
        .into_iter()
        .filter(|token| !words.contains(token.as_str()))
        .collect();

    Ok(collapse_spaces(&detokenize(&kept, None)))
}

/// [`remove_stopwords`] with the lists read from a file.
pub fn remove_stopwords_from_file<P: AsRef<Path>>(text: &str, path: P) -> Result<String> {
    let list = load_stopwords(path)?;
    remove_stopwords(text, &list.words, &list.expressions)
}

/// Built-in stop words of a language, sorted.
pub fn stopwords(language: Language) -> Vec<String> {
    let mut words: Vec<String> = stop_words(language).iter().cloned().collect();
    words.sort();
    words
}

/// Which first names to return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NameKind {
    #[default]
    All,
    Men,
    Women,
}

impl FromStr for NameKind {
    type Err = ContextoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "todos" | "all" => Ok(NameKind::All),
            "m" | "masculino" | "hombre" | "hombres" | "men" => Ok(NameKind::Men),
            "f" | "femenino" | "mujer" | "mujeres" | "women" => Ok(NameKind::Women),
            _ => Err(ContextoError::invalid_argument(format!(
                "Unknown name kind '{s}'. Use 'hombres', 'mujeres' or 'todos'"
            ))),
        }
    }
}

/// Common Spanish first names.
pub fn names(kind: NameKind) -> StopwordList {
    match kind {
        NameKind::Men => StopwordList::parse(MEN_NAMES),
        NameKind::Women => StopwordList::parse(WOMEN_NAMES),
        NameKind::All => StopwordList::parse(SHARED_NAMES)
            .union(&StopwordList::parse(MEN_NAMES))
            .union(&StopwordList::parse(WOMEN_NAMES)),
    }
}

/// Common Spanish surnames.
pub fn surnames() -> StopwordList {
    StopwordList::parse(SURNAMES)
}

/// Which Colombian place names to return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaceKind {
    #[default]
    All,
    Municipalities,
    Departments,
}

impl FromStr for PlaceKind {
    type Err = ContextoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "todos" | "all" => Ok(PlaceKind::All),
            "municipios" | "mun" | "m" => Ok(PlaceKind::Municipalities),
            "departamentos" | "dep" | "d" => Ok(PlaceKind::Departments),
            _ => Err(ContextoError::invalid_argument(format!(
                "Unknown place kind '{s}'. Use 'municipios', 'departamentos' or 'todos'"
            ))),
        }
    }
}

/// Names of Colombian municipalities and departments.
pub fn colombia_places(kind: PlaceKind) -> StopwordList {
    match kind {
        PlaceKind::Municipalities => StopwordList::parse(MUNICIPALITIES),
        PlaceKind::Departments => StopwordList::parse(DEPARTMENTS),
        PlaceKind::All => {
            StopwordList::parse(MUNICIPALITIES).union(&StopwordList::parse(DEPARTMENTS))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_list() {
        let list = StopwordList::parse("hola, de ,a\nsan juan de dios,  distrito capital\n");
        assert_eq!(list.words, vec!["hola", "de", "a"]);
        assert_eq!(list.expressions, vec!["san juan de dios", "distrito capital"]);
    }

    #[test]
    fn test_remove_stopwords() {
        let text = "El alcalde de San Juan de Dios visitó la plaza.";
        let cleaned = remove_stopwords(
            text,
            &strings(&["El", "la"]),
            &strings(&["San Juan de Dios"]),
        )
        .unwrap();
        assert_eq!(cleaned, "alcalde de visitó plaza.");
    }

    #[test]
    fn test_builtin_lists() {
        assert!(stopwords(Language::Spanish).contains(&"que".to_string()));

        let men = names(NameKind::Men);
        let all = names(NameKind::All);
        assert!(men.words.contains(&"carlos".to_string()));
        assert!(all.words.len() > men.words.len());
        assert!(all.words.windows(2).all(|w| w[0] < w[1]));

        let places = colombia_places("dep".parse().unwrap());
        assert!(places.words.contains(&"antioquia".to_string()));
        assert!(places.expressions.contains(&"valle del cauca".to_string()));
        assert!(!surnames().is_empty());
        assert!("xyz".parse::<PlaceKind>().is_err());
    }
}
