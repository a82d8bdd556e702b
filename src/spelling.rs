//! Spelling correction.
//!
//! [`SpellingDictionary`] holds word frequencies; [`Corrector`] replaces
//! unknown words by their most probable neighbor within a small edit distance.

pub mod corrector;
pub mod dictionary;

pub use corrector::{Corrector, CorrectorConfig, DictionarySource, correct_text};
pub use dictionary::{BuiltinDictionary, SpellingDictionary};
