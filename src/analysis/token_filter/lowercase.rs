//! Lowercase filter implementation.
//!
//! # Examples
//!
//! ```
//! use contexto::analysis::token_filter::Filter;
//! use contexto::analysis::token_filter::lowercase::LowercaseFilter;
//! use contexto::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Ñandú", 0), Token::new("ÁRBOL", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "ñandú");
//! assert_eq!(filtered[1].text, "árbol");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, map_words};
use crate::error::Result;

/// A filter that converts tokens to lowercase.
///
/// Stopped tokens pass through untouched. Positions and offsets are kept.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(map_words(tokens, |word| {
            word.chars()
                .any(char::is_uppercase)
                .then(|| word.to_lowercase())
        }))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_lowercase_filter() {
        let filter = LowercaseFilter::new();
        let tokens = vec![
            Token::new("Canción", 0),
            Token::new("BOGOTÁ", 1),
            Token::new("Prueba", 2).stop(),
        ];
        let token_stream = Box::new(tokens.into_iter());

        let result: Vec<Token> = filter.filter(token_stream).unwrap().collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].text, "canción");
        assert_eq!(result[1].text, "bogotá");
        assert_eq!(result[2].text, "Prueba");
        assert!(result[2].is_stopped());
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(LowercaseFilter::new().name(), "lowercase");
    }
}
