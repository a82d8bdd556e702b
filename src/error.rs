//! Error types for the contexto library.
//!
//! All fallible operations return [`ContextoError`] through the crate-wide
//! [`Result`] alias.
//!
//! # Examples
//!
//! ```
//! use contexto::error::{ContextoError, Result};
//!
//! fn compare(texts: &[&str]) -> Result<()> {
//!     if texts.len() < 2 {
//!         return Err(ContextoError::invalid_argument("at least two texts are required"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(compare(&["solo uno"]).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for contexto operations.
#[derive(Error, Debug)]
pub enum ContextoError {
    /// I/O errors (file operations, external processes, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Unknown or unsupported language
    #[error("Language error: {0}")]
    Language(String),

    /// Vectorizer errors (unfitted models, dimension mismatches, etc.)
    #[error("Vectorization error: {0}")]
    Vectorization(String),

    /// Document reading and writing errors
    #[error("Document error: {0}")]
    Document(String),

    /// OCR and image preprocessing errors
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with ContextoError.
pub type Result<T> = std::result::Result<T, ContextoError>;

impl ContextoError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ContextoError::Analysis(msg.into())
    }

    /// Create a new language error.
    pub fn language<S: Into<String>>(msg: S) -> Self {
        ContextoError::Language(msg.into())
    }

    /// Create a new vectorization error.
    pub fn vectorization<S: Into<String>>(msg: S) -> Self {
        ContextoError::Vectorization(msg.into())
    }

    /// Create a new document error.
    pub fn document<S: Into<String>>(msg: S) -> Self {
        ContextoError::Document(msg.into())
    }

    /// Create a new OCR error.
    pub fn ocr<S: Into<String>>(msg: S) -> Self {
        ContextoError::Ocr(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        ContextoError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ContextoError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ContextoError::InvalidOperation(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ContextoError::Other(format!("Not found: {}", msg.into()))
    }

    /// Error for models used before `fit`/`train`.
    pub fn not_fitted<S: Into<String>>(model: S) -> Self {
        ContextoError::Vectorization(format!(
            "{} must be fitted before it can be used",
            model.into()
        ))
    }
}

impl From<bincode::Error> for ContextoError {
    fn from(err: bincode::Error) -> Self {
        ContextoError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for ContextoError {
    fn from(err: image::ImageError) -> Self {
        ContextoError::Ocr(err.to_string())
    }
}

impl From<zip::result::ZipError> for ContextoError {
    fn from(err: zip::result::ZipError) -> Self {
        ContextoError::Document(err.to_string())
    }
}

impl From<quick_xml::Error> for ContextoError {
    fn from(err: quick_xml::Error) -> Self {
        ContextoError::Document(err.to_string())
    }
}

impl From<lopdf::Error> for ContextoError {
    fn from(err: lopdf::Error) -> Self {
        ContextoError::Document(err.to_string())
    }
}
