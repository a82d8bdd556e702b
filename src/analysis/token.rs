//! Token types and utilities for text analysis.
//!
//! # Examples
//!
//! ```
//! use contexto::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("¿Dónde", 0, 0, 8).with_token_type(TokenType::Word);
//! assert_eq!(token.text, "¿Dónde");
//! assert_eq!(token.end_offset, 8);
//! assert_eq!(token.token_type, Some(TokenType::Word));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text produced by a tokenizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped (removed) by a filter
    pub stopped: bool,

    /// Coarse classification of the token content
    pub token_type: Option<TokenType>,
}

/// Token type classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Alphabetic word (any script)
    Word,
    /// Numeric value, possibly with separators
    Num,
    /// Mixed letters and digits
    Alphanum,
    /// Punctuation marks
    Punctuation,
    /// URLs and e-mail addresses
    Url,
    /// Other/unknown token types
    Other,
}

impl TokenType {
    /// Classify a piece of text.
    pub fn detect(text: &str) -> TokenType {
        if text.is_empty() {
            return TokenType::Other;
        }
        if text.contains("://") || (text.contains('@') && text.contains('.')) {
            return TokenType::Url;
        }
        if text.chars().all(|c| c.is_alphabetic()) {
            return TokenType::Word;
        }
        if text.chars().all(|c| c.is_numeric() || c == '.' || c == ',')
            && text.chars().any(|c| c.is_numeric())
        {
            return TokenType::Num;
        }
        if text.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return TokenType::Alphanum;
        }
        if text.chars().all(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
            return TokenType::Punctuation;
        }
        TokenType::Other
    }
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            stopped: false,
            token_type: None,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
            token_type: None,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Set the token type.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = Some(token_type);
        self
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }

    /// Clone this token with updated position.
    pub fn with_position(&self, position: usize) -> Self {
        let mut token = self.clone();
        token.position = position;
        token
    }

    /// Whether the token is made of letters only.
    pub fn is_word(&self) -> bool {
        match self.token_type {
            Some(token_type) => token_type == TokenType::Word,
            None => TokenType::detect(&self.text) == TokenType::Word,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hola", 0);
        assert_eq!(token.text, "hola");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert!(!token.stopped);
        assert!(token.token_type.is_none());
    }

    #[test]
    fn test_token_methods() {
        let token = Token::new("prueba", 3).stop().with_token_type(TokenType::Word);
        assert!(token.is_stopped());
        assert_eq!(token.token_type, Some(TokenType::Word));

        let moved = token.with_position(7).with_text("otra");
        assert_eq!(moved.position, 7);
        assert_eq!(moved.text, "otra");
        assert!(moved.is_stopped());
    }

    #[test]
    fn test_token_type_detection() {
        assert_eq!(TokenType::detect("canción"), TokenType::Word);
        assert_eq!(TokenType::detect("3,14"), TokenType::Num);
        assert_eq!(TokenType::detect("covid19"), TokenType::Alphanum);
        assert_eq!(TokenType::detect("¿"), TokenType::Punctuation);
        assert_eq!(TokenType::detect("https://dnp.gov.co"), TokenType::Url);
        assert_eq!(TokenType::detect(""), TokenType::Other);
    }
}
