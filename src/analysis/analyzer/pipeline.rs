//! Pipeline analyzer that combines tokenizers and filters.
//!
//! The tokenizer runs first, then every token filter in the order it was
//! added.
//!
//! # Examples
//!
//! ```
//! use contexto::analysis::analyzer::Analyzer;
//! use contexto::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use contexto::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//! use contexto::analysis::token_filter::lowercase::LowercaseFilter;
//! use contexto::analysis::token_filter::stop::StopFilter;
//! use std::sync::Arc;
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .add_filter(Arc::new(StopFilter::from_words(vec!["el", "y"])))
//!     .with_name("mi_analizador");
//!
//! let tokens: Vec<_> = analyzer.analyze("El gato Y el RATÓN").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].text, "gato");
//! assert_eq!(tokens[1].text, "ratón");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, apply_filters};
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::stem::StemFilter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::toktok::ToktokTokenizer;
use crate::error::Result;
use crate::language::Language;

/// A configurable analyzer that combines a tokenizer with a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Toktok tokens, lowercased, without the stop words of `language`.
    pub fn for_language(language: Language) -> Self {
        PipelineAnalyzer::new(Arc::new(ToktokTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::for_language(language)))
            .with_name(format!("{}_words", language.name()))
    }

    /// Same as [`PipelineAnalyzer::for_language`] with Snowball stemming.
    pub fn stemmed(language: Language) -> Self {
        Self::for_language(language)
            .add_filter(Arc::new(StemFilter::for_language(language)))
            .with_name(format!("{}_stems", language.name()))
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Name given with [`PipelineAnalyzer::with_name`].
    pub fn pipeline_name(&self) -> &str {
        &self.name
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        apply_filters(&self.filters, self.tokenizer.tokenize(text)?)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_pipeline_analyzer() {
        let analyzer = PipelineAnalyzer::for_language(Language::Spanish);
        let tokens: Vec<Token> = analyzer
            .analyze("Los perros, y los gatos.")
            .unwrap()
            .collect();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["perros", ",", "gatos", "."]);
        assert_eq!(analyzer.pipeline_name(), "spanish_words");
        assert_eq!(analyzer.filters().len(), 2);
    }

    #[test]
    fn test_stemmed_pipeline() {
        let analyzer = PipelineAnalyzer::stemmed(Language::Spanish);
        let words = analyzer.analyze_words("Las casas").unwrap();
        assert_eq!(words, vec!["cas"]);
    }

    #[test]
    fn test_debug_output() {
        let analyzer = PipelineAnalyzer::new(Arc::new(ToktokTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()));
        let debug = format!("{analyzer:?}");
        assert!(debug.contains("pipeline_toktok"));
        assert!(debug.contains("lowercase"));
    }
}
