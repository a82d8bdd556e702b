//! Text analysis building blocks.
//!
//! Tokenizers split text into [`token::Token`]s, token filters transform the
//! resulting stream, and analyzers chain both. Every higher-level component of
//! the crate (cleaning, correction, vectorization, exploration) tokenizes
//! through this module.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
