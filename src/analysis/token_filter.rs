//! Token filters applied after tokenization.
//!
//! A filter receives the whole stream and returns a new one. Filters never
//! drop positions: a stop word is flagged with [`Token::stop`] and only
//! removed when the filter is configured to do so, which lets detokenizers
//! rebuild the text when needed.
//!
//! ```
//! use contexto::analysis::token_filter::{Filter, apply_filters};
//! use contexto::analysis::token_filter::lowercase::LowercaseFilter;
//! use contexto::analysis::token_filter::stop::StopFilter;
//! use contexto::analysis::token::Token;
//! use std::sync::Arc;
//!
//! let filters: Vec<Arc<dyn Filter>> = vec![
//!     Arc::new(LowercaseFilter::new()),
//!     Arc::new(StopFilter::from_words(vec!["la"])),
//! ];
//! let tokens = vec![Token::new("La", 0), Token::new("CIUDAD", 1)];
//! let words: Vec<String> = apply_filters(&filters, Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(words, vec!["ciudad"]);
//! ```
//!
//! [`Token::stop`]: crate::analysis::token::Token::stop

use std::sync::Arc;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Transforms a token stream.
pub trait Filter: Send + Sync {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Short identifier shown in `Debug` output of analyzers.
    fn name(&self) -> &'static str;
}

/// Run `tokens` through every filter in order.
pub fn apply_filters(filters: &[Arc<dyn Filter>], tokens: TokenStream) -> Result<TokenStream> {
    filters
        .iter()
        .try_fold(tokens, |stream, filter| filter.filter(stream))
}

/// Rewrite the text of every token that is not stopped.
///
/// `rewrite` returns `None` to leave a token as it is.
pub(crate) fn map_words<F>(tokens: TokenStream, rewrite: F) -> TokenStream
where
    F: Fn(&str) -> Option<String>,
{
    let mapped: Vec<Token> = tokens
        .map(|token| {
            if token.is_stopped() {
                return token;
            }
            match rewrite(&token.text) {
                Some(text) => token.with_text(text),
                None => token,
            }
        })
        .collect();
    Box::new(mapped.into_iter())
}

pub mod lowercase;
pub mod stem;
pub mod stop;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token_filter::lowercase::LowercaseFilter;

    #[test]
    fn test_map_words_skips_stopped() {
        let tokens = vec![Token::new("sol", 0), Token::new("de", 1).stop()];
        let result: Vec<Token> =
            map_words(Box::new(tokens.into_iter()), |w| Some(w.to_uppercase())).collect();

        assert_eq!(result[0].text, "SOL");
        assert_eq!(result[1].text, "de");
    }

    #[test]
    fn test_apply_no_filters() {
        let tokens = vec![Token::new("Árbol", 0)];
        let result: Vec<Token> = apply_filters(&[], Box::new(tokens.into_iter()))
            .unwrap()
            .collect();
        assert_eq!(result[0].text, "Árbol");

        let filters: Vec<Arc<dyn Filter>> = vec![Arc::new(LowercaseFilter::new())];
        let tokens = vec![Token::new("Árbol", 0)];
        let result: Vec<Token> = apply_filters(&filters, Box::new(tokens.into_iter()))
            .unwrap()
            .collect();
        assert_eq!(result[0].text, "árbol");
    }
}
