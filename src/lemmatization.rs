//! Dictionary and rule based lemmatization.
//!
//! A word is resolved, in order, through the user overrides, the lexicon of
//! the language and a short list of suffix rules (plurals, gerunds). Words no
//! step recognizes are kept as they are.
//!
//! # Examples
//!
//! ```
//! use contexto::language::Language;
//! use contexto::lemmatization::Lemmatizer;
//!
//! let lemmatizer = Lemmatizer::new(Language::Spanish);
//! let lemmas = lemmatizer.lemmatize_text("Los niños estaban cantando canciones", false).unwrap();
//! assert_eq!(lemmas, "el niño estar cantar canción");
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::toktok::ToktokTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::cleaning::basic_cleaning;
use crate::error::{ContextoError, Result};
use crate::language::{Language, detect_language};

const SPANISH_LEXICON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lemmas/es.txt"));

/// Parse `form lemma` lines separated by a tab or spaces.
fn parse_lexicon(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(form), Some(lemma)) => Some((form.to_lowercase(), lemma.to_string())),
                _ => None,
            }
        })
        .collect()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'á' | 'é' | 'í' | 'ó' | 'ú')
}

fn spanish_rule(word: &str) -> Option<String> {
    let len = word.chars().count();

    if len > 6 && (word.ends_with("ciones") || word.ends_with("siones")) {
        return word.strip_suffix("iones").map(|stem| format!("{stem}ión"));
    }
    if len > 5
        && let Some(stem) = word.strip_suffix("ones")
    {
        return Some(format!("{stem}ón"));
    }
    if len > 4
        && let Some(stem) = word.strip_suffix("ces")
    {
        return Some(format!("{stem}z"));
    }
    if len > 5
        && let Some(stem) = word.strip_suffix("ando")
    {
        return Some(format!("{stem}ar"));
    }
    if len > 6
        && let Some(stem) = word.strip_suffix("iendo")
    {
        return Some(format!("{stem}er"));
    }
    if len > 4
        && let Some(stem) = word.strip_suffix("es")
    {
        // mujeres, ciudades, papeles; but not padres
        let mut tail = stem.chars().rev();
        if let (Some(last), Some(before)) = (tail.next(), tail.next())
            && matches!(last, 'l' | 'r' | 'n' | 'd' | 'j')
            && is_vowel(before)
        {
            return Some(stem.to_string());
        }
    }
    if len > 3
        && let Some(stem) = word.strip_suffix('s')
        && stem.chars().last().is_some_and(is_vowel)
    {
        return Some(stem.to_string());
    }
    None
}

fn english_rule(word: &str) -> Option<String> {
    let len = word.chars().count();
    if len > 4
        && let Some(stem) = word.strip_suffix("ies")
    {
        return Some(format!("{stem}y"));
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return Some(format!("{stem}ss"));
    }
    if len > 3
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return word.strip_suffix('s').map(str::to_string);
    }
    None
}

fn french_rule(word: &str) -> Option<String> {
    let len = word.chars().count();
    if len > 4
        && let Some(stem) = word.strip_suffix("aux")
    {
        return Some(format!("{stem}al"));
    }
    if len > 3 && !word.ends_with("ss") {
        return word.strip_suffix('s').map(str::to_string);
    }
    None
}

/// Lemmatizer for one language.
pub struct Lemmatizer {
    language: Language,
    lexicon: HashMap<String, String>,
    overrides: HashMap<String, String>,
    detokenizer: Box<dyn Tokenizer>,
}

impl std::fmt::Debug for Lemmatizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lemmatizer")
            .field("language", &self.language)
            .field("lexicon", &self.lexicon.len())
            .field("overrides", &self.overrides.len())
            .field("detokenizer", &self.detokenizer.name())
            .finish()
    }
}

impl Lemmatizer {
    /// Create a lemmatizer with the built-in lexicon of `language`.
    pub fn new(language: Language) -> Self {
        let lexicon = match language {
            Language::Spanish => parse_lexicon(SPANISH_LEXICON),
            _ => HashMap::new(),
        };
        Lemmatizer {
            language,
            lexicon,
            overrides: HashMap::new(),
            detokenizer: Box::new(WhitespaceTokenizer::new()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Add the `form lemma` lines of a file to the lexicon.
    pub fn with_lexicon_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        self.lexicon.extend(parse_lexicon(&content));
        Ok(self)
    }

    /// Word → lemma pairs taking precedence over everything else.
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Load overrides from a JSON object of word → lemma.
    pub fn with_overrides_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let overrides: HashMap<String, String> = serde_json::from_reader(reader).map_err(|e| {
            ContextoError::invalid_argument(format!(
                "Could not load lemma overrides from {}: {e}",
                path.display()
            ))
        })?;
        Ok(self.with_overrides(overrides))
    }

    /// Tokenizer used to join lemmas back into text.
    pub fn with_detokenizer(mut self, detokenizer: Box<dyn Tokenizer>) -> Self {
        self.detokenizer = detokenizer;
        self
    }

    /// The lemma of a single word.
    pub fn lemmatize_word(&self, word: &str) -> String {
        if let Some(lemma) = self.overrides.get(word) {
            return lemma.clone();
        }
        let lower = word.to_lowercase();
        if let Some(lemma) = self.overrides.get(&lower).or_else(|| self.lexicon.get(&lower)) {
            return lemma.clone();
        }
        if !lower.chars().all(char::is_alphabetic) {
            return word.to_string();
        }

        let by_rule = match self.language {
            Language::Spanish => spanish_rule(&lower),
            Language::English => english_rule(&lower),
            Language::French => french_rule(&lower),
            Language::German => None,
        };
        by_rule.unwrap_or_else(|| word.to_string())
    }

    /// Lemmatize every token of a text.
    ///
    /// With `clean`, the text first goes through [`basic_cleaning`].
    pub fn lemmatize_text(&self, text: &str, clean: bool) -> Result<String> {
        let text = if clean {
            basic_cleaning(text, true)
        } else {
            text.to_string()
        };
        let lemmas: Vec<String> = ToktokTokenizer::new()
            .tokenize_words(&text)?
            .iter()
            .map(|token| self.lemmatize_word(token))
            .collect();
        Ok(self.detokenizer.detokenize(&lemmas))
    }
}

/// Lemmatize a text in `language`; `"auto"` detects the language first.
pub fn lemmatize_text(
    text: &str,
    language: &str,
    overrides: Option<HashMap<String, String>>,
    clean: bool,
) -> Result<String> {
    let language = if language.trim().eq_ignore_ascii_case("auto") {
        detect_language(text)?.language
    } else {
        Language::parse(language)?
    };
    let lemmatizer = Lemmatizer::new(language).with_overrides(overrides.unwrap_or_default());
    lemmatizer.lemmatize_text(text, clean)
}
