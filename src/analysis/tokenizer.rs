//! Tokenizer implementations for text analysis.
//!
//! Tokenizers split text into tokens and, for the operations that rebuild
//! text after filtering tokens out, join tokens back into text.
//!
//! # Available Tokenizers
//!
//! - [`toktok::ToktokTokenizer`] - Punctuation-aware tokenizer, the default
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace characters
//! - [`regex::RegexTokenizer`] - Custom regex-based tokenization
//!
//! # Examples
//!
//! ```
//! use contexto::analysis::tokenizer::{detokenize, tokenize};
//!
//! let tokens = tokenize("¡Hola, mundo!", None).unwrap();
//! assert_eq!(tokens, vec!["¡", "Hola", ",", "mundo", "!"]);
//! assert_eq!(detokenize(&tokens, None), "¡Hola, mundo!");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` to allow use in concurrent contexts.
///
/// # Examples
///
/// ```
/// use contexto::analysis::token::{Token, TokenStream};
/// use contexto::analysis::tokenizer::Tokenizer;
/// use contexto::error::Result;
///
/// struct CommaTokenizer;
///
/// impl Tokenizer for CommaTokenizer {
///     fn tokenize(&self, text: &str) -> Result<TokenStream> {
///         let tokens: Vec<Token> = text
///             .split(',')
///             .enumerate()
///             .map(|(i, s)| Token::new(s.trim(), i))
///             .collect();
///         Ok(Box::new(tokens.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "comma"
///     }
/// }
///
/// let tokens = CommaTokenizer.tokenize_words("a, b").unwrap();
/// assert_eq!(tokens, vec!["a", "b"]);
/// assert_eq!(CommaTokenizer.detokenize(&tokens), "a b");
/// ```
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Join tokens back into text.
    ///
    /// The default implementation joins with single spaces.
    fn detokenize(&self, tokens: &[String]) -> String {
        tokens.join(" ")
    }

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Tokenize and keep only the token texts.
    fn tokenize_words(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.tokenize(text)?.map(|token| token.text).collect())
    }

    /// Tokenize several texts, one token list per text.
    fn tokenize_many(&self, texts: &[&str]) -> Result<Vec<Vec<String>>> {
        texts.iter().map(|text| self.tokenize_words(text)).collect()
    }

    /// Detokenize several token lists, one text per list.
    fn detokenize_many(&self, token_lists: &[Vec<String>]) -> Vec<String> {
        token_lists
            .iter()
            .map(|tokens| self.detokenize(tokens))
            .collect()
    }
}

pub mod regex;
pub mod toktok;
pub mod whitespace;

/// Tokenize `text` with the given tokenizer, or the default [`toktok::ToktokTokenizer`].
pub fn tokenize(text: &str, tokenizer: Option<&dyn Tokenizer>) -> Result<Vec<String>> {
    match tokenizer {
        Some(tokenizer) => tokenizer.tokenize_words(text),
        None => toktok::ToktokTokenizer::new().tokenize_words(text),
    }
}

/// Join tokens with the given tokenizer, or the default [`toktok::ToktokTokenizer`].
pub fn detokenize(tokens: &[String], tokenizer: Option<&dyn Tokenizer>) -> String {
    match tokenizer {
        Some(tokenizer) => tokenizer.detokenize(tokens),
        None => toktok::ToktokTokenizer::new().detokenize(tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::whitespace::WhitespaceTokenizer;
    use super::*;

    #[test]
    fn test_default_tokenizer_round_trip() {
        let tokens = tokenize("Esto es una prueba.", None).unwrap();
        assert_eq!(tokens, vec!["Esto", "es", "una", "prueba", "."]);
        assert_eq!(detokenize(&tokens, None), "Esto es una prueba.");
    }

    #[test]
    fn test_custom_tokenizer() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens = tokenize("hola ,  mundo", Some(&tokenizer)).unwrap();
        assert_eq!(tokens, vec!["hola", ",", "mundo"]);
        assert_eq!(detokenize(&tokens, Some(&tokenizer)), "hola , mundo");
    }

    #[test]
    fn test_many() {
        let tokenizer = WhitespaceTokenizer::new();
        let lists = tokenizer.tokenize_many(&["a b", "c"]).unwrap();
        assert_eq!(lists, vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(tokenizer.detokenize_many(&lists), vec!["a b", "c"]);
    }
}
