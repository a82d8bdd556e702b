//! # contexto
//!
//! Text processing for Spanish first, with English, German and French
//! support.
//!
//! ## Features
//!
//! - Cleaning: stop words, accents, punctuation, atypical words
//! - Tokenization, spelling correction, stemming and lemmatization
//! - Vectorization: bag of words, TF-IDF, feature hashing, word vectors, Doc2Vec
//! - Similarity and distance between texts, and edit distances between strings
//! - Reading and writing txt, csv, pdf, rtf, docx and images, with OCR
//! - Exploration: n-grams, co-occurrences and SVG charts
//!
//! ## Example
//!
//! ```
//! use contexto::cleaning::{CleaningConfig, clean_text};
//! use contexto::stemming::Stemmer;
//! use contexto::language::Language;
//!
//! let cleaned = clean_text("¡Los niños corrían felices!", &CleaningConfig::default()).unwrap();
//! assert_eq!(cleaned, "los ninos corrian felices");
//!
//! let stems = Stemmer::new(Language::Spanish).stem_text(&cleaned, false);
//! assert!(stems.starts_with("los nin"));
//! ```

pub mod analysis;
pub mod cleaning;
pub mod cli;
pub mod comparison;
pub mod error;
pub mod exploration;
pub mod io;
pub mod language;
pub mod lemmatization;
pub mod ocr;
pub mod spelling;
pub mod stemming;
pub mod util;
pub mod vectorization;

pub mod prelude {
    pub use crate::cleaning::{CleaningConfig, clean_text};
    pub use crate::comparison::{Distance, DistanceMetric, Similarity, StringDifference, StringMetric};
    pub use crate::error::{ContextoError, Result};
    pub use crate::io::{ReadOutput, ReaderConfig, read_text, write_text};
    pub use crate::language::{Language, detect_language};
    pub use crate::vectorization::Vectorizer;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
