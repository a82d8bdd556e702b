//! Regex-based tokenizer implementation.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::Tokenizer;
use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::{ContextoError, Result};

/// Pattern used by the frequency and hashing vectorizers: words of at least
/// two characters.
pub const WORD_PATTERN: &str = r"\b\w\w+\b";

static WORD_REGEX: LazyLock<Arc<Regex>> =
    LazyLock::new(|| Arc::new(Regex::new(WORD_PATTERN).expect("valid pattern")));

/// A tokenizer that extracts the matches (or the gaps between matches) of a
/// regular expression.
#[derive(Clone, Debug)]
pub struct RegexTokenizer {
    pattern: Arc<Regex>,
    /// Whether to extract gaps (text between matches) instead of matches
    gaps: bool,
}

impl RegexTokenizer {
    /// Create a new regex tokenizer with [`WORD_PATTERN`].
    pub fn new() -> Result<Self> {
        Self::with_pattern(WORD_PATTERN)
    }

    /// Create a new regex tokenizer with a custom pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(RegexTokenizer {
            pattern: Arc::new(Self::compile(pattern)?),
            gaps: false,
        })
    }

    /// Create a tokenizer that extracts gaps (text between matches) instead of matches.
    pub fn with_gaps(pattern: &str) -> Result<Self> {
        Ok(RegexTokenizer {
            pattern: Arc::new(Self::compile(pattern)?),
            gaps: true,
        })
    }

    fn compile(pattern: &str) -> Result<Regex> {
        Regex::new(pattern)
            .map_err(|e| ContextoError::analysis(format!("Invalid regex pattern: {e}")))
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check if this tokenizer extracts gaps.
    pub fn gaps(&self) -> bool {
        self.gaps
    }
}

impl Default for RegexTokenizer {
    /// A tokenizer over [`WORD_PATTERN`], sharing one compiled regex.
    fn default() -> Self {
        RegexTokenizer {
            pattern: Arc::clone(&WORD_REGEX),
            gaps: false,
        }
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let make = |word: &str, position, start, end| {
            Token::with_offsets(word, position, start, end).with_token_type(TokenType::detect(word))
        };

        let tokens: Vec<Token> = if self.gaps {
            let mut tokens = Vec::new();
            let mut last_end = 0;

            for mat in self.pattern.find_iter(text) {
                if mat.start() > last_end {
                    let gap = &text[last_end..mat.start()];
                    tokens.push(make(gap, tokens.len(), last_end, mat.start()));
                }
                last_end = mat.end();
            }
            if last_end < text.len() {
                tokens.push(make(&text[last_end..], tokens.len(), last_end, text.len()));
            }

            tokens
        } else {
            self.pattern
                .find_iter(text)
                .enumerate()
                .map(|(position, mat)| make(mat.as_str(), position, mat.start(), mat.end()))
                .collect()
        };

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_tokenizer() {
        let tokenizer = RegexTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("a la niña, sí").unwrap().collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "la");
        assert_eq!(tokens[0].start_offset, 2);
        assert_eq!(tokens[1].text, "niña");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[1].end_offset, 10);
        assert_eq!(tokens[2].text, "sí");
    }

    #[test]
    fn test_regex_tokenizer_with_gaps() {
        let tokenizer = RegexTokenizer::with_gaps(r"\s*;\s*").unwrap();
        let words = tokenizer.tokenize_words("uno; dos ;tres").unwrap();
        assert_eq!(words, vec!["uno", "dos", "tres"]);
        assert!(tokenizer.gaps());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(RegexTokenizer::with_pattern("(").is_err());
        assert_eq!(RegexTokenizer::new().unwrap().name(), "regex");
        assert_eq!(RegexTokenizer::default().pattern(), WORD_PATTERN);
    }
}
