//! Command line argument parsing for the contexto CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// contexto - Spanish-first text processing from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "contexto")]
#[command(about = "Clean, correct, vectorize, compare, read and explore texts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ContextoArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// JSON file with the default language and component settings
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ContextoArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Clean a text: stop words, accents, punctuation, short words
    Clean(CleanArgs),

    /// Split a text into tokens
    Tokenize(TokenizeArgs),

    /// Correct the spelling of a text
    Correct(CorrectArgs),

    /// Reduce the words of a text to their stems
    Stem(LanguageTextArgs),

    /// Reduce the words of a text to their lemmas
    Lemmatize(LemmatizeArgs),

    /// Guess the language of a text
    #[command(name = "detect-language")]
    DetectLanguage(TextArgs),

    /// Turn texts into vectors
    Vectorize(VectorizeArgs),

    /// Similarity or distance between texts
    Compare(CompareArgs),

    /// Edit distances or similarities between strings
    #[command(name = "string-distance")]
    StringDistance(StringDistanceArgs),

    /// Read the text of a document
    Read(ReadArgs),

    /// Write text to a document
    Write(WriteArgs),

    /// Recognize the text of an image or scanned PDF
    Ocr(OcrArgs),

    /// Most frequent n-grams of a text
    Ngrams(NgramsArgs),

    /// Co-occurrence matrix of the terms of several texts
    Cooccurrence(CooccurrenceArgs),

    /// Draw a word cloud
    Wordcloud(WordcloudArgs),

    /// Draw a bar chart of the most frequent terms
    Barchart(BarchartArgs),

    /// Draw the co-occurrence graph of several texts
    Graph(GraphArgs),

    /// Draw where keywords occur along several texts
    Dispersion(DispersionArgs),
}

/// A single input text.
#[derive(Args, Debug, Clone, Default)]
pub struct TextArgs {
    /// Text to process; read from stdin when neither this nor --input is given
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Read the text from a file (txt, csv, pdf, rtf, docx or image)
    #[arg(short, long, value_name = "FILE", conflicts_with = "text")]
    pub input: Option<PathBuf>,
}

/// Several input texts.
#[derive(Args, Debug, Clone, Default)]
pub struct TextsArgs {
    /// Texts to process
    #[arg(value_name = "TEXTS")]
    pub texts: Vec<String>,

    /// Files whose text is added to the inputs, one text per file
    #[arg(short, long = "input", value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// File with one text per line
    #[arg(long, value_name = "FILE")]
    pub lines: Option<PathBuf>,
}

/// A text and the language to process it in.
#[derive(Args, Debug, Clone)]
pub struct LanguageTextArgs {
    #[command(flatten)]
    pub input: TextArgs,

    /// Language of the text, or "auto" to detect it
    #[arg(short, long)]
    pub language: Option<String>,

    /// Skip the basic cleaning applied before processing
    #[arg(long)]
    pub no_clean: bool,
}

impl LanguageTextArgs {
    /// Whether the text goes through basic cleaning first.
    pub fn clean(&self) -> bool {
        !self.no_clean
    }
}

/// Arguments for cleaning
#[derive(Parser, Debug, Clone)]
pub struct CleanArgs {
    #[command(flatten)]
    pub input: TextArgs,

    /// Words to remove (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub words: Vec<String>,

    /// Expressions to remove (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub expressions: Vec<String>,

    /// File listing words and expressions to remove
    #[arg(long, value_name = "FILE")]
    pub stopwords_file: Option<PathBuf>,

    /// Also remove the built-in stop words of this language
    #[arg(long, value_name = "LANGUAGE")]
    pub stopwords: Option<String>,

    /// Minimum word length
    #[arg(long)]
    pub n_min: Option<usize>,

    /// Keep numbers
    #[arg(long)]
    pub keep_numbers: bool,

    /// Keep accents
    #[arg(long)]
    pub keep_accents: bool,

    /// Also remove words that look like noise (repeated or consecutive letters)
    #[arg(long)]
    pub atypical: bool,
}

/// Tokenizers selectable from the CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// Punctuation-aware tokenizer
    #[default]
    Toktok,
    /// Split on whitespace
    Whitespace,
    /// Words of two or more characters, or the matches of --pattern
    Regex,
}

/// Arguments for tokenizing
#[derive(Parser, Debug, Clone)]
pub struct TokenizeArgs {
    #[command(flatten)]
    pub input: TextArgs,

    /// Tokenizer to use
    #[arg(short, long, default_value = "toktok")]
    pub tokenizer: TokenizerKind,

    /// Pattern of the regex tokenizer
    #[arg(long)]
    pub pattern: Option<String>,

    /// Lowercase and drop the stop words of this language
    #[arg(long, value_name = "LANGUAGE")]
    pub analyze: Option<String>,

    /// With --analyze, also stem the remaining words
    #[arg(long, requires = "analyze")]
    pub stem: bool,
}

/// Arguments for spelling correction
#[derive(Parser, Debug, Clone)]
pub struct CorrectArgs {
    #[command(flatten)]
    pub text: LanguageTextArgs,

    /// Maximum edit distance of the corrections (1 or 2)
    #[arg(long)]
    pub max_distance: Option<usize>,

    /// JSON dictionary (a list, or word → frequency) replacing the built-in one
    #[arg(long, value_name = "FILE")]
    pub dictionary: Option<PathBuf>,

    /// Apply the --dictionary file on top of the built-in dictionary
    #[arg(long, requires = "dictionary")]
    pub keep_builtin: bool,
}

/// Arguments for lemmatization
#[derive(Parser, Debug, Clone)]
pub struct LemmatizeArgs {
    #[command(flatten)]
    pub text: LanguageTextArgs,

    /// JSON file of word → lemma overrides
    #[arg(long, value_name = "FILE")]
    pub overrides: Option<PathBuf>,
}

/// Vectorization methods
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorizeMethod {
    /// Term counts
    Bow,
    /// TF-IDF weights
    Tfidf,
    /// Signed feature hashing
    Hashing,
    /// Averaged pretrained word vectors
    Word2vec,
    /// Trained document vectors
    Doc2vec,
}

/// Arguments for vectorizing
#[derive(Parser, Debug, Clone)]
pub struct VectorizeArgs {
    #[command(flatten)]
    pub texts: TextsArgs,

    /// Vectorization method
    #[arg(short, long, default_value = "tfidf")]
    pub method: VectorizeMethod,

    /// Saved model to load (bow, tfidf, hashing, doc2vec)
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Save the model built from the inputs
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Word vectors in text format (word2vec)
    #[arg(long, value_name = "FILE")]
    pub vectors: Option<PathBuf>,

    /// Number of features (hashing)
    #[arg(long)]
    pub n_features: Option<usize>,

    /// Largest n-gram size (bow, tfidf, hashing)
    #[arg(long, default_value = "1")]
    pub max_ngram: usize,

    /// Language of the texts
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for comparing texts
#[derive(Parser, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub texts: TextsArgs,

    /// cosine or jaccard similarity, or a distance: euclidean, manhattan,
    /// chebyshev, minkowski[:p], hamming, braycurtis, canberra, correlation
    #[arg(short, long, default_value = "cosine")]
    pub metric: String,

    /// Compare vectors with Jaccard instead of word sets
    #[arg(long)]
    pub vectorize: bool,

    /// Fitted bow/tfidf model used to vectorize the texts
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Language of the texts
    #[arg(short, long)]
    pub language: Option<String>,
}

/// Arguments for string distances
#[derive(Parser, Debug, Clone)]
pub struct StringDistanceArgs {
    /// Strings to compare
    #[arg(value_name = "STRINGS", num_args = 2..)]
    pub strings: Vec<String>,

    /// levenshtein, damerau_levenshtein, hamming, jaro or jaro_winkler
    #[arg(short, long, default_value = "levenshtein")]
    pub metric: String,

    /// Scale distances by the length of the longer string
    #[arg(short, long)]
    pub normalized: bool,
}

/// Arguments for reading documents
#[derive(Parser, Debug, Clone)]
pub struct ReadArgs {
    /// Document to read
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Document type; inferred from the extension by default
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Return the text page by page (pdf, docx)
    #[arg(long)]
    pub by_pages: bool,

    /// Encoding of plain-text files (utf-8, latin-1)
    #[arg(short, long)]
    pub encoding: Option<String>,

    /// Recognize the pages of a PDF instead of reading its text layer
    #[arg(long)]
    pub ocr: bool,

    /// Password of an encrypted PDF
    #[arg(long)]
    pub password: Option<String>,

    /// Copy the images of a Word document to this directory
    #[arg(long, value_name = "DIR")]
    pub media_dir: Option<PathBuf>,

    /// Write the text read to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for writing documents
#[derive(Parser, Debug, Clone)]
pub struct WriteArgs {
    /// Document to write
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Text to write; read from stdin when neither this nor --input is given
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Copy the text of this file
    #[arg(short, long, value_name = "FILE", conflicts_with = "text")]
    pub input: Option<PathBuf>,

    /// Document type; inferred from the extension by default
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Page separator in the input text; each part becomes a page
    #[arg(long)]
    pub page_separator: Option<String>,
}

/// Arguments for OCR
#[derive(Parser, Debug, Clone)]
pub struct OcrArgs {
    /// Image or PDF
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Tesseract language (spa, eng, spa+eng...)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Preprocessing level, 0 to 5
    #[arg(short, long)]
    pub preprocessing: Option<u8>,

    /// OCR engine mode
    #[arg(long)]
    pub oem: Option<u8>,

    /// Page segmentation mode
    #[arg(long)]
    pub psm: Option<u8>,

    /// Straighten the image before recognition
    #[arg(long)]
    pub deskew: bool,

    /// Tesseract executable
    #[arg(long, value_name = "PATH")]
    pub tesseract: Option<PathBuf>,

    /// pdftoppm executable
    #[arg(long, value_name = "PATH")]
    pub pdftoppm: Option<PathBuf>,
}

/// Arguments for n-grams
#[derive(Parser, Debug, Clone)]
pub struct NgramsArgs {
    #[command(flatten)]
    pub input: TextArgs,

    /// N-gram size
    #[arg(short, long, default_value = "1")]
    pub n: usize,

    /// Keep only the most frequent ones
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Apply basic cleaning first
    #[arg(long)]
    pub clean: bool,
}

/// Options shared by the commands that build a co-occurrence matrix
#[derive(Args, Debug, Clone, Default)]
pub struct CooccurrenceOptions {
    /// document or window
    #[arg(long)]
    pub mode: Option<String>,

    /// Tokens on each side in window mode
    #[arg(long)]
    pub window: Option<usize>,

    /// Minimum frequency of a term
    #[arg(long)]
    pub min_freq: Option<usize>,

    /// Number of most frequent terms
    #[arg(long)]
    pub max_num: Option<usize>,

    /// Apply basic cleaning first
    #[arg(long)]
    pub clean: bool,
}

/// Arguments for co-occurrence matrices
#[derive(Parser, Debug, Clone)]
pub struct CooccurrenceArgs {
    #[command(flatten)]
    pub texts: TextsArgs,

    #[command(flatten)]
    pub options: CooccurrenceOptions,

    /// Keep the values below the diagonal
    #[arg(long)]
    pub full: bool,

    /// Save the matrix as CSV
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

/// Arguments for word clouds
#[derive(Parser, Debug, Clone)]
pub struct WordcloudArgs {
    #[command(flatten)]
    pub input: TextArgs,

    /// SVG file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// N-gram size
    #[arg(long)]
    pub ngram: Option<usize>,

    /// Number of terms
    #[arg(long)]
    pub n_terms: Option<usize>,

    /// Share of horizontal terms, 0 to 1
    #[arg(long)]
    pub horizontal: Option<f32>,

    /// Image whose dark region shapes the cloud
    #[arg(long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Draw a second cloud of n-grams of this size beside the first
    #[arg(long, value_name = "N")]
    pub pair: Option<usize>,
}

/// Arguments for bar charts
#[derive(Parser, Debug, Clone)]
pub struct BarchartArgs {
    #[command(flatten)]
    pub input: TextArgs,

    /// SVG file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// N-gram size
    #[arg(long)]
    pub ngram: Option<usize>,

    /// Number of terms
    #[arg(long)]
    pub n_terms: Option<usize>,

    /// Put the most frequent term at the bottom
    #[arg(long)]
    pub descending: bool,

    /// Chart title
    #[arg(long)]
    pub title: Option<String>,
}

/// Arguments for co-occurrence graphs
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    #[command(flatten)]
    pub texts: TextsArgs,

    #[command(flatten)]
    pub options: CooccurrenceOptions,

    /// SVG file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Nodes kept: a fraction up to 1, or a count
    #[arg(long)]
    pub n_nodes: Option<f32>,

    /// Layout seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Chart title
    #[arg(long)]
    pub title: Option<String>,
}

/// Arguments for dispersion plots
#[derive(Parser, Debug, Clone)]
pub struct DispersionArgs {
    #[command(flatten)]
    pub texts: TextsArgs,

    /// Keywords to locate (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub keywords: Vec<String>,

    /// SVG file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Tell uppercase and lowercase apart
    #[arg(long)]
    pub case_sensitive: bool,

    /// Document labels (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub labels: Vec<String>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let args = ContextoArgs::try_parse_from([
            "contexto",
            "clean",
            "Hola mundo",
            "-vv",
            "--format",
            "json",
            "--pretty",
        ])
        .unwrap();

        assert_eq!(args.verbosity(), 2);
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.pretty);
        if let Command::Clean(clean) = args.command {
            assert_eq!(clean.input.text.as_deref(), Some("Hola mundo"));
        } else {
            panic!("Expected clean command");
        }
    }

    #[test]
    fn test_language_commands_clean_by_default() {
        let args = ContextoArgs::try_parse_from(["contexto", "stem", "casas"]).unwrap();
        if let Command::Stem(stem) = args.command {
            assert!(stem.clean());
        } else {
            panic!("Expected stem command");
        }

        let args = ContextoArgs::try_parse_from([
            "contexto",
            "correct",
            "--no-clean",
            "--dictionary",
            "palabras.json",
            "--keep-builtin",
            "ejenplo",
        ])
        .unwrap();
        if let Command::Correct(correct) = args.command {
            assert!(!correct.text.clean());
            assert!(correct.keep_builtin);
        } else {
            panic!("Expected correct command");
        }

        assert!(ContextoArgs::try_parse_from(["contexto", "correct", "--keep-builtin", "x"]).is_err());
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = ContextoArgs::try_parse_from(["contexto", "-q", "-vvv", "stem", "casas"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_text_and_input_conflict() {
        let result = ContextoArgs::try_parse_from([
            "contexto",
            "detect-language",
            "hola",
            "--input",
            "texto.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_clean_lists() {
        let args = ContextoArgs::try_parse_from([
            "contexto",
            "clean",
            "--words",
            "de,la",
            "--n-min",
            "3",
            "texto",
        ])
        .unwrap();
        if let Command::Clean(clean) = args.command {
            assert_eq!(clean.words, vec!["de", "la"]);
            assert_eq!(clean.n_min, Some(3));
        } else {
            panic!("Expected clean command");
        }
    }

    #[test]
    fn test_string_distance_needs_two_strings() {
        assert!(ContextoArgs::try_parse_from(["contexto", "string-distance", "casa"]).is_err());
        let args =
            ContextoArgs::try_parse_from(["contexto", "string-distance", "casa", "cosa", "-m", "jaro"])
                .unwrap();
        if let Command::StringDistance(sd) = args.command {
            assert_eq!(sd.strings, vec!["casa", "cosa"]);
            assert_eq!(sd.metric, "jaro");
        } else {
            panic!("Expected string-distance command");
        }
    }

    #[test]
    fn test_vectorize_method() {
        let args = ContextoArgs::try_parse_from([
            "contexto",
            "vectorize",
            "uno",
            "dos",
            "--method",
            "hashing",
            "--n-features",
            "16",
        ])
        .unwrap();
        if let Command::Vectorize(vectorize) = args.command {
            assert_eq!(vectorize.method, VectorizeMethod::Hashing);
            assert_eq!(vectorize.texts.texts, vec!["uno", "dos"]);
            assert_eq!(vectorize.n_features, Some(16));
        } else {
            panic!("Expected vectorize command");
        }
    }

    #[test]
    fn test_dispersion_requires_keywords() {
        assert!(
            ContextoArgs::try_parse_from(["contexto", "dispersion", "a b", "-o", "d.svg"]).is_err()
        );
        let args = ContextoArgs::try_parse_from([
            "contexto",
            "dispersion",
            "a b",
            "b c",
            "-k",
            "a,b",
            "-o",
            "d.svg",
        ])
        .unwrap();
        if let Command::Dispersion(dispersion) = args.command {
            assert_eq!(dispersion.keywords, vec!["a", "b"]);
            assert_eq!(dispersion.texts.texts.len(), 2);
        } else {
            panic!("Expected dispersion command");
        }
    }
}
