//! Punctuation-aware tokenizer tuned for Spanish and English text.
//!
//! Every period is detached from the preceding word before splitting, so
//! sentence ends become their own token. This also splits decimal numbers
//! (`3.14` gives `3` and `.14`), domains and e-mail addresses at their dots.
//! Opening and closing punctuation (`¿ ¡ ( « " …`) is split off, commas are
//! separated unless they sit between digits, and URLs keep their colons and
//! slashes. Detokenization reverses the spacing rules so that
//! `detokenize(tokenize(text))` reproduces ordinary punctuated text, dotted
//! numbers and URLs included.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

/// Characters that always form a token of their own.
const SPLIT_CHARS: &[char] = &[
    '¿', '¡', '?', '!', ';', '"', '(', ')', '[', ']', '{', '}', '«', '»', '‹', '›', '“', '”',
    '‘', '’', '\'', '`', '%', '…', '–', '—', '|', '$', '€', '£', '¥', '°', '±', '©', '®',
];

/// Tokens after which no space is written when detokenizing.
const OPENING: &[&str] = &["¿", "¡", "(", "[", "{", "«", "‹", "“", "‘", "'", "`", "$", "€"];

/// Tokens written without a space before them when detokenizing.
const CLOSING: &[&str] = &[
    ",", ".", ";", ":", "?", "!", "%", ")", "]", "}", "»", "›", "”", "’", "…", "°",
];

/// Tokenizer that separates punctuation from words.
#[derive(Clone, Debug, Default)]
pub struct ToktokTokenizer;

impl ToktokTokenizer {
    /// Create a new tokenizer.
    pub fn new() -> Self {
        ToktokTokenizer
    }

    fn split_chunk(chunk: &str, out: &mut Vec<String>) {
        if chunk.contains("://") || chunk.starts_with("www") {
            let trimmed = chunk.trim_end_matches(|c: char| CLOSING.contains(&c.to_string().as_str()));
            out.push(trimmed.to_string());
            for c in chunk[trimmed.len()..].chars() {
                out.push(c.to_string());
            }
            return;
        }

        let chars: Vec<char> = chunk.chars().collect();
        let mut buffer = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();

            let split = if SPLIT_CHARS.contains(&c) {
                true
            } else {
                match c {
                    ',' => !(prev.is_some_and(|p| p.is_ascii_digit())
                        && next.is_some_and(|n| n.is_ascii_digit())),
                    ':' => !(next == Some('/') && chars.get(i + 2) == Some(&'/')),
                    '.' => !(buffer.is_empty() && next.is_some_and(|n| n.is_alphanumeric())),
                    '-' => next == Some('-') || (prev == Some('-') && buffer.is_empty()),
                    _ => false,
                }
            };

            if !split {
                buffer.push(c);
                i += 1;
                continue;
            }

            if !buffer.is_empty() {
                out.push(std::mem::take(&mut buffer));
            }

            // Runs of dashes or commas stay together
            if c == '-' || c == ',' {
                let mut run = String::new();
                while i < chars.len() && chars[i] == c {
                    run.push(c);
                    i += 1;
                }
                out.push(run);
                continue;
            }

            out.push(c.to_string());
            i += 1;
        }

        if !buffer.is_empty() {
            out.push(buffer);
        }
    }

    /// Split text into token strings.
    fn split(text: &str) -> Vec<String> {
        let padded = text.replace('.', " .").replace('\u{00A0}', " ");
        let mut out = Vec::new();
        for chunk in padded.split_whitespace() {
            Self::split_chunk(chunk, &mut out);
        }
        out
    }
}

impl Tokenizer for ToktokTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut cursor = 0;
        let tokens: Vec<Token> = Self::split(text)
            .into_iter()
            .enumerate()
            .map(|(position, word)| {
                let (start, end) = match text[cursor..].find(word.as_str()) {
                    Some(offset) => (cursor + offset, cursor + offset + word.len()),
                    None => (cursor, cursor),
                };
                cursor = end;
                let token_type = TokenType::detect(&word);
                Token::with_offsets(word, position, start, end).with_token_type(token_type)
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn detokenize(&self, tokens: &[String]) -> String {
        let mut text = String::new();
        let mut glue_next = false;
        let mut quote_open = false;

        for token in tokens {
            let token = token.as_str();
            let is_quote = token == "\"";
            let attach_left = CLOSING.contains(&token)
                || (is_quote && quote_open)
                || (token.starts_with('.') && token.len() > 1);

            if !text.is_empty() && !attach_left && !glue_next {
                text.push(' ');
            }
            text.push_str(token);

            glue_next = OPENING.contains(&token) || (is_quote && !quote_open);
            if is_quote {
                quote_open = !quote_open;
            }
        }

        text.replace("¿ ", "¿")
            .replace("¡ ", "¡")
            .replace("' ", "'")
            .replace(" .", ".")
    }

    fn name(&self) -> &'static str {
        "toktok"
    }
}
