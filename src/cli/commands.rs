//! Command implementations for the contexto CLI.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::stem::StemFilter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::analysis::tokenizer::toktok::ToktokTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::cleaning::{AtypicalConfig, basic_cleaning, clean_text, remove_atypical_words, stopwords};
use crate::cli::args::*;
use crate::cli::config::ContextoConfig;
use crate::cli::output::*;
use crate::comparison::{Distance, DistanceMetric, Similarity, StringDifference, StringMetric};
use crate::error::{ContextoError, Result};
use crate::exploration::{
    BarChartConfig, CooccurrenceConfig, CooccurrenceMatrix, DispersionConfig, GraphConfig,
    WordCloudConfig, bar_chart, cooccurrence_graph, cooccurrence_matrix, dispersion_plot,
    ngram_frequencies, word_cloud, word_cloud_pair,
};
use crate::io::{DocumentKind, ReadOutput, Reader, ReaderConfig, read_text, write_text};
use crate::language::detect_language;
use crate::lemmatization::Lemmatizer;
use crate::ocr::{OcrConfig, OcrEngine, Preprocessing};
use crate::spelling::{Corrector, CorrectorConfig, DictionarySource};
use crate::stemming::Stemmer;
use crate::util::fs::ensure_parent_dir;
use crate::vectorization::{
    Doc2VecVectorizer, FrequencyKind, FrequencyVectorizer, FrequencyVectorizerConfig,
    HashingVectorizer, Vectorizer, Word2VecVectorizer,
};

/// Execute a CLI command.
pub fn execute_command(args: ContextoArgs) -> Result<()> {
    let config = ContextoConfig::load_or_default(args.config.as_deref())?;
    match &args.command {
        Command::Clean(clean_args) => clean(clean_args.clone(), &config, &args),
        Command::Tokenize(tokenize_args) => tokenize(tokenize_args.clone(), &config, &args),
        Command::Correct(correct_args) => correct(correct_args.clone(), &config, &args),
        Command::Stem(stem_args) => stem(stem_args.clone(), &config, &args),
        Command::Lemmatize(lemmatize_args) => lemmatize(lemmatize_args.clone(), &config, &args),
        Command::DetectLanguage(text_args) => detect(text_args.clone(), &config, &args),
        Command::Vectorize(vectorize_args) => vectorize(vectorize_args.clone(), &config, &args),
        Command::Compare(compare_args) => compare(compare_args.clone(), &config, &args),
        Command::StringDistance(sd_args) => string_distance(sd_args.clone(), &args),
        Command::Read(read_args) => read_document(read_args.clone(), &config, &args),
        Command::Write(write_args) => write_document(write_args.clone(), &config, &args),
        Command::Ocr(ocr_args) => ocr(ocr_args.clone(), &config, &args),
        Command::Ngrams(ngrams_args) => ngrams(ngrams_args.clone(), &config, &args),
        Command::Cooccurrence(cooc_args) => cooccurrence(cooc_args.clone(), &config, &args),
        Command::Wordcloud(cloud_args) => wordcloud(cloud_args.clone(), &config, &args),
        Command::Barchart(bar_args) => barchart(bar_args.clone(), &config, &args),
        Command::Graph(graph_args) => graph(graph_args.clone(), &config, &args),
        Command::Dispersion(dispersion_args) => {
            dispersion(dispersion_args.clone(), &config, &args)
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// The text of a command: its argument, a file read with the configured
/// reader, or standard input.
fn input_text(input: &TextArgs, config: &ContextoConfig) -> Result<String> {
    match (&input.text, &input.input) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => Ok(read_text(path, &config.reader)?.into_text()),
        (None, None) => read_stdin(),
    }
}

/// The texts of a multi-text command, in order: arguments, files, then the
/// lines of `--lines`. Standard input is read one text per line when nothing
/// else is given.
fn input_texts(input: &TextsArgs, config: &ContextoConfig) -> Result<Vec<String>> {
    let mut texts = input.texts.clone();
    for path in &input.inputs {
        texts.push(read_text(path, &config.reader)?.into_text());
    }
    let lines = match &input.lines {
        Some(path) => Some(fs::read_to_string(path)?),
        None if texts.is_empty() => Some(read_stdin()?),
        None => None,
    };
    if let Some(lines) = lines {
        texts.extend(
            lines
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }
    if texts.is_empty() {
        return Err(ContextoError::invalid_argument("No input texts were given"));
    }
    log::debug!("Read {} input texts", texts.len());
    Ok(texts)
}

fn as_strs(texts: &[String]) -> Vec<&str> {
    texts.iter().map(String::as_str).collect()
}

fn file_result(path: &Path) -> Result<FileResult> {
    Ok(FileResult {
        path: path.to_string_lossy().to_string(),
        size_bytes: fs::metadata(path)?.len(),
    })
}

/// Remove words, expressions, accents and noise from a text.
fn clean(args: CleanArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args.input, config)?;

    let mut cleaning = config.cleaning.clone();
    cleaning.words.extend(args.words);
    cleaning.expressions.extend(args.expressions);
    if let Some(file) = args.stopwords_file {
        cleaning.stopwords_file = Some(file);
    }
    if let Some(language) = &args.stopwords {
        let language = config.resolve_language(Some(language.as_str()), &text)?;
        cleaning.words.extend(stopwords(language));
    }
    if let Some(n_min) = args.n_min {
        cleaning.n_min = n_min;
    }
    if args.keep_numbers {
        cleaning.remove_numbers = false;
    }
    if args.keep_accents {
        cleaning.remove_accents = false;
    }

    let mut cleaned = clean_text(&text, &cleaning)?;
    if args.atypical {
        cleaned = remove_atypical_words(&cleaned, &AtypicalConfig::default())?;
    }

    output_result(
        "Text cleaned",
        &TextResult {
            language: None,
            text: cleaned,
        },
        cli_args,
    )
}

fn build_tokenizer(kind: TokenizerKind, pattern: Option<&str>) -> Result<Arc<dyn Tokenizer>> {
    Ok(match kind {
        TokenizerKind::Toktok => Arc::new(ToktokTokenizer::new()),
        TokenizerKind::Whitespace => Arc::new(WhitespaceTokenizer::new()),
        TokenizerKind::Regex => match pattern {
            Some(pattern) => Arc::new(RegexTokenizer::with_pattern(pattern)?),
            None => Arc::new(RegexTokenizer::new()?),
        },
    })
}

/// Split a text into tokens, optionally through a language analyzer.
fn tokenize(args: TokenizeArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args.input, config)?;
    let tokenizer = build_tokenizer(args.tokenizer, args.pattern.as_deref())?;

    let (name, tokens) = match &args.analyze {
        Some(language) => {
            let language = config.resolve_language(Some(language.as_str()), &text)?;
            let analyzer = match (args.tokenizer, args.stem) {
                (TokenizerKind::Toktok, false) => PipelineAnalyzer::for_language(language),
                (TokenizerKind::Toktok, true) => PipelineAnalyzer::stemmed(language),
                (_, stem) => {
                    let analyzer = PipelineAnalyzer::new(tokenizer)
                        .add_filter(Arc::new(LowercaseFilter::new()))
                        .add_filter(Arc::new(StopFilter::for_language(language)));
                    if stem {
                        analyzer.add_filter(Arc::new(StemFilter::for_language(language)))
                    } else {
                        analyzer
                    }
                }
            };
            (
                analyzer.pipeline_name().to_string(),
                analyzer.analyze_words(&text)?,
            )
        }
        None => (tokenizer.name().to_string(), tokenizer.tokenize_words(&text)?),
    };

    output_result(
        "Text tokenized",
        &TokensResult {
            tokenizer: name,
            count: tokens.len(),
            tokens,
        },
        cli_args,
    )
}

/// Correct the spelling of a text.
fn correct(args: CorrectArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args.text.input, config)?;
    let language = config.resolve_language(args.text.language.as_deref(), &text)?;
    let corrector_config = CorrectorConfig {
        max_distance: args.max_distance.unwrap_or(config.corrector.max_distance),
        keep_builtin: args.keep_builtin || config.corrector.keep_builtin,
    };
    let source = args.dictionary.map(DictionarySource::JsonFile);
    let corrector = Corrector::with_config(language, source, corrector_config)?;

    output_result(
        "Text corrected",
        &TextResult {
            language: Some(language.code().to_string()),
            text: corrector.correct_text(&text, args.text.clean())?,
        },
        cli_args,
    )
}

/// Reduce the words of a text to their stems.
fn stem(args: LanguageTextArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args.input, config)?;
    let language = config.resolve_language(args.language.as_deref(), &text)?;

    output_result(
        "Text stemmed",
        &TextResult {
            language: Some(language.code().to_string()),
            text: Stemmer::new(language).stem_text(&text, args.clean()),
        },
        cli_args,
    )
}

/// Reduce the words of a text to their lemmas.
fn lemmatize(args: LemmatizeArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args.text.input, config)?;
    let language = config.resolve_language(args.text.language.as_deref(), &text)?;
    let lemmatizer = match &args.overrides {
        Some(path) => Lemmatizer::new(language).with_overrides_file(path)?,
        None => Lemmatizer::new(language),
    };

    output_result(
        "Text lemmatized",
        &TextResult {
            language: Some(language.code().to_string()),
            text: lemmatizer.lemmatize_text(&text, args.text.clean())?,
        },
        cli_args,
    )
}

/// Guess the language of a text.
fn detect(args: TextArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args, config)?;
    let guess = detect_language(&text)?;

    output_result(
        "Language detected",
        &LanguageResult {
            language: guess.language.name().to_string(),
            code: guess.language.code().to_string(),
            probability: guess.probability,
        },
        cli_args,
    )
}

/// Turn texts into vectors with a fitted, loaded or pretrained model.
fn vectorize(args: VectorizeArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let texts = input_texts(&args.texts, config)?;
    let texts = as_strs(&texts);
    let joined = texts.join(" ");

    let vectors = match args.method {
        VectorizeMethod::Bow | VectorizeMethod::Tfidf => {
            let kind = if args.method == VectorizeMethod::Bow {
                FrequencyKind::Bow
            } else {
                FrequencyKind::TfIdf
            };
            match &args.model {
                Some(model) => {
                    let vectorizer = FrequencyVectorizer::load(model)?;
                    if vectorizer.kind() != kind {
                        log::warn!(
                            "Model {} is a {} model; using it as loaded",
                            model.display(),
                            vectorizer.kind().name()
                        );
                    }
                    vectorizer.transform(&texts)?
                }
                None => {
                    let mut vectorizer = FrequencyVectorizer::with_config(FrequencyVectorizerConfig {
                        kind,
                        ngram_range: (1, args.max_ngram.max(1)),
                        ..config.vectorizer.clone()
                    });
                    vectorizer.fit(&texts, args.save.as_deref())?;
                    vectorizer.transform(&texts)?
                }
            }
        }
        VectorizeMethod::Hashing => {
            let vectorizer = match &args.model {
                Some(model) => HashingVectorizer::load(model)?,
                None => {
                    let n_features = args
                        .n_features
                        .unwrap_or_else(|| HashingVectorizer::default().n_features());
                    let vectorizer = HashingVectorizer::new(n_features, (1, args.max_ngram.max(1)))?;
                    if let Some(path) = &args.save {
                        vectorizer.save(path)?;
                    }
                    vectorizer
                }
            };
            vectorizer.vectorize(&texts)?
        }
        VectorizeMethod::Word2vec => {
            let path = args.vectors.as_ref().ok_or_else(|| {
                ContextoError::invalid_argument("word2vec needs a vectors file (--vectors)")
            })?;
            let language = config.resolve_language(args.language.as_deref(), &joined)?;
            Word2VecVectorizer::from_file(language, path)?.vectorize(&texts)?
        }
        VectorizeMethod::Doc2vec => {
            let vectorizer = match &args.model {
                Some(model) => Doc2VecVectorizer::load(model)?,
                None => {
                    let mut vectorizer = Doc2VecVectorizer::new(config.doc2vec.clone())?;
                    vectorizer.train(&texts, false, args.save.as_deref())?;
                    vectorizer
                }
            };
            vectorizer.vectorize(&texts)?
        }
    };

    let model_saved = match (&args.save, &args.model, args.method) {
        (Some(_), _, VectorizeMethod::Word2vec) | (Some(_), Some(_), _) => {
            log::warn!("--save only applies to models built from the inputs");
            None
        }
        (Some(path), None, _) => Some(path.to_string_lossy().to_string()),
        _ => None,
    };

    output_result(
        "Texts vectorized",
        &VectorsResult {
            method: format!("{:?}", args.method).to_lowercase(),
            dimension: vectors.first().map_or(0, Vec::len),
            vectors,
            model_saved,
        },
        cli_args,
    )
}

fn text_labels(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("text_{i}")).collect()
}

/// Similarity or distance matrix between texts.
fn compare(args: CompareArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let texts = input_texts(&args.texts, config)?;
    let texts = as_strs(&texts);
    let language = config.resolve_language(args.language.as_deref(), &texts.join(" "))?;
    let vectorizer: Option<Box<dyn Vectorizer>> = match &args.model {
        Some(model) => Some(Box::new(FrequencyVectorizer::load(model)?)),
        None => None,
    };

    let metric = args.metric.trim().to_lowercase();
    let values = match metric.as_str() {
        "cosine" => Similarity::new(language, vectorizer).cosine(&texts)?,
        "jaccard" => Similarity::new(language, vectorizer).jaccard(&texts, args.vectorize)?,
        other => {
            let metric: DistanceMetric = other.parse()?;
            Distance::new(language, vectorizer).pairwise(&texts, metric)?
        }
    };

    output_result(
        "Texts compared",
        &MatrixResult {
            metric,
            labels: text_labels(texts.len()),
            values,
        },
        cli_args,
    )
}

/// Edit distances or similarities between strings.
fn string_distance(args: StringDistanceArgs, cli_args: &ContextoArgs) -> Result<()> {
    let metric: StringMetric = args.metric.parse()?;
    let strings = as_strs(&args.strings);
    let values = StringDifference::new()
        .normalized(args.normalized)
        .matrix(&strings, metric)?;

    output_result(
        "Strings compared",
        &MatrixResult {
            metric: metric.name().to_string(),
            labels: args.strings.clone(),
            values,
        },
        cli_args,
    )
}

/// Read the text of a document, optionally saving it elsewhere.
fn read_document(args: ReadArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let mut reader_config: ReaderConfig = config.reader.clone();
    if let Some(kind) = &args.kind {
        reader_config.kind = kind.parse()?;
    }
    if let Some(encoding) = &args.encoding {
        reader_config.encoding = encoding.parse()?;
    }
    reader_config.by_pages |= args.by_pages;
    reader_config.ocr |= args.ocr;
    if args.password.is_some() {
        reader_config.password = args.password.clone();
    }
    if args.media_dir.is_some() {
        reader_config.media_dir = args.media_dir.clone();
    }

    let output = Reader::new(&args.path).read(&reader_config)?;
    let saved_to = match &args.output {
        Some(path) => Some(
            write_text(path, output.clone(), &DocumentKind::Infer)?
                .to_string_lossy()
                .to_string(),
        ),
        None => None,
    };

    output_result(
        "Document read",
        &DocumentResult {
            path: args.path.to_string_lossy().to_string(),
            kind: reader_config.kind.resolve(&args.path).to_string(),
            pages: output.into_pages(),
            saved_to,
        },
        cli_args,
    )
}

/// Write text to a document.
fn write_document(args: WriteArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(
        &TextArgs {
            text: args.text.clone(),
            input: args.input.clone(),
        },
        config,
    )?;
    let content = match &args.page_separator {
        Some(separator) => ReadOutput::Pages(text.split(separator.as_str()).map(String::from).collect()),
        None => ReadOutput::Text(text),
    };
    let kind = match &args.kind {
        Some(kind) => kind.parse()?,
        None => DocumentKind::Infer,
    };

    let written = write_text(&args.path, content, &kind)?;
    output_result("Document written", &file_result(&written)?, cli_args)
}

/// Recognize the text of an image or a scanned PDF.
fn ocr(args: OcrArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let mut ocr_config: OcrConfig = config.ocr.clone();
    if let Some(language) = args.language {
        ocr_config.language = language;
    }
    if let Some(level) = args.preprocessing {
        ocr_config.preprocessing = Preprocessing::from_level(level)?;
    }
    if let Some(oem) = args.oem {
        ocr_config.oem = oem;
    }
    if let Some(psm) = args.psm {
        ocr_config.psm = psm;
    }
    ocr_config.deskew |= args.deskew;

    let engine = match (args.tesseract, args.pdftoppm) {
        (None, None) => OcrEngine::new(),
        (tesseract, pdftoppm) => OcrEngine::with_executables(
            tesseract.unwrap_or_else(|| "tesseract".into()),
            pdftoppm.unwrap_or_else(|| "pdftoppm".into()),
        ),
    };

    let kind = DocumentKind::Infer.resolve(&args.path);
    let pages = if kind == DocumentKind::Pdf {
        engine.pdf_to_text(&args.path, &ocr_config)?
    } else {
        vec![engine.image_to_text(&args.path, &ocr_config)?]
    };

    output_result(
        "Text recognized",
        &DocumentResult {
            path: args.path.to_string_lossy().to_string(),
            kind: kind.to_string(),
            pages,
            saved_to: None,
        },
        cli_args,
    )
}

/// Most frequent n-grams of a text.
fn ngrams(args: NgramsArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let mut text = input_text(&args.input, config)?;
    if args.clean {
        text = basic_cleaning(&text, true);
    }
    let frequencies = ngram_frequencies(&text, args.n, args.top)?;

    output_result(
        "N-grams counted",
        &FrequencyResult {
            n: args.n,
            frequencies,
        },
        cli_args,
    )
}

fn cooccurrence_config(
    options: &CooccurrenceOptions,
    defaults: &CooccurrenceConfig,
) -> Result<CooccurrenceConfig> {
    let mut config = defaults.clone();
    if let Some(mode) = &options.mode {
        config.mode = mode.parse()?;
    }
    if let Some(window) = options.window {
        config.window = window;
    }
    if let Some(min_freq) = options.min_freq {
        config.min_freq = min_freq;
    }
    if let Some(max_num) = options.max_num {
        config.max_num = max_num;
    }
    config.clean |= options.clean;
    Ok(config)
}

fn build_matrix(texts: &[String], config: &CooccurrenceConfig) -> Result<CooccurrenceMatrix> {
    let matrix = cooccurrence_matrix(&as_strs(texts), config, None)?;
    log::info!("Co-occurrence matrix of {} terms", matrix.len());
    Ok(matrix)
}

/// Co-occurrence matrix of the terms of several texts.
fn cooccurrence(args: CooccurrenceArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let texts = input_texts(&args.texts, config)?;
    let mut cooc_config = cooccurrence_config(&args.options, &config.cooccurrence)?;
    if args.full {
        cooc_config.upper_triangle = false;
    }
    let matrix = build_matrix(&texts, &cooc_config)?;

    let csv = match &args.csv {
        Some(path) => {
            ensure_parent_dir(path)?;
            fs::write(path, matrix.to_csv())?;
            Some(path.to_string_lossy().to_string())
        }
        None => None,
    };

    output_result(
        "Co-occurrence matrix built",
        &CooccurrenceResult {
            mode: cooc_config.mode.to_string(),
            terms: matrix.terms,
            values: matrix.values,
            csv,
        },
        cli_args,
    )
}

/// Draw a word cloud, or a pair of them.
fn wordcloud(args: WordcloudArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args.input, config)?;
    let mut cloud: WordCloudConfig = config.wordcloud.clone();
    if let Some(ngram) = args.ngram {
        cloud.ngram = ngram;
    }
    if let Some(n_terms) = args.n_terms {
        cloud.n_terms = n_terms;
    }
    if let Some(horizontal) = args.horizontal {
        cloud.horizontal = horizontal;
    }
    if args.mask.is_some() {
        cloud.mask = args.mask.clone();
    }
    if let Some(seed) = args.seed {
        cloud.seed = seed;
    }
    cloud.output = Some(args.output.clone());

    match args.pair {
        Some(n2) => word_cloud_pair(&text, cloud.ngram, n2, &cloud)?,
        None => word_cloud(&text, &cloud)?,
    };
    output_result("Word cloud drawn", &file_result(&args.output)?, cli_args)
}

/// Draw a bar chart of the most frequent terms.
fn barchart(args: BarchartArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let text = input_text(&args.input, config)?;
    let mut bars: BarChartConfig = config.barchart.clone();
    if let Some(ngram) = args.ngram {
        bars.ngram = ngram;
    }
    if let Some(n_terms) = args.n_terms {
        bars.n_terms = n_terms;
    }
    if args.descending {
        bars.ascending = false;
    }
    if let Some(title) = args.title {
        bars.title = title;
    }
    bars.output = Some(args.output.clone());

    bar_chart(&text, &bars)?;
    output_result("Bar chart drawn", &file_result(&args.output)?, cli_args)
}

/// Draw the co-occurrence graph of several texts.
fn graph(args: GraphArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let texts = input_texts(&args.texts, config)?;
    let matrix = build_matrix(&texts, &cooccurrence_config(&args.options, &config.cooccurrence)?)?;

    let mut graph_config: GraphConfig = config.graph.clone();
    if let Some(n_nodes) = args.n_nodes {
        graph_config.n_nodes = n_nodes;
    }
    if let Some(seed) = args.seed {
        graph_config.seed = seed;
    }
    if let Some(title) = args.title {
        graph_config.title = title;
    }
    graph_config.output = Some(args.output.clone());

    cooccurrence_graph(&matrix, &graph_config)?;
    output_result("Graph drawn", &file_result(&args.output)?, cli_args)
}

/// Draw where keywords occur along several texts.
fn dispersion(args: DispersionArgs, config: &ContextoConfig, cli_args: &ContextoArgs) -> Result<()> {
    let texts = input_texts(&args.texts, config)?;
    let mut plot: DispersionConfig = config.dispersion.clone();
    if args.case_sensitive {
        plot.ignore_case = false;
    }
    if !args.labels.is_empty() {
        plot.labels = Some(args.labels.clone());
    }
    plot.output = Some(args.output.clone());

    dispersion_plot(&as_strs(&texts), &as_strs(&args.keywords), &plot)?;
    output_result("Dispersion plot drawn", &file_result(&args.output)?, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn run(argv: &[&str]) -> Result<()> {
        let mut full = vec!["contexto", "-q", "--format", "json"];
        full.extend_from_slice(argv);
        execute_command(ContextoArgs::try_parse_from(full).unwrap())
    }

    #[test]
    fn test_input_texts_order() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("uno.txt");
        let lines = temp_dir.path().join("lineas.txt");
        fs::write(&file, "texto del archivo").unwrap();
        fs::write(&lines, "primera\n\n  segunda  \n").unwrap();

        let input = TextsArgs {
            texts: vec!["argumento".to_string()],
            inputs: vec![file],
            lines: Some(lines),
        };
        let texts = input_texts(&input, &ContextoConfig::default()).unwrap();
        assert_eq!(texts, vec!["argumento", "texto del archivo", "primera", "segunda"]);
    }

    #[test]
    fn test_input_text_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nota.txt");
        fs::write(&file, "  hola  \n").unwrap();
        let input = TextArgs {
            text: None,
            input: Some(file),
        };
        assert_eq!(input_text(&input, &ContextoConfig::default()).unwrap(), "hola");
    }

    #[test]
    fn test_build_tokenizer() {
        let tokenizer = build_tokenizer(TokenizerKind::Regex, Some(r"\d+")).unwrap();
        assert_eq!(tokenizer.tokenize_words("a1 b22").unwrap(), vec!["1", "22"]);
        let tokenizer = build_tokenizer(TokenizerKind::Whitespace, None).unwrap();
        assert_eq!(tokenizer.tokenize_words("a1 b22").unwrap(), vec!["a1", "b22"]);
    }

    #[test]
    fn test_cooccurrence_overrides() {
        let options = CooccurrenceOptions {
            mode: Some("window".to_string()),
            window: Some(2),
            ..CooccurrenceOptions::default()
        };
        let config = cooccurrence_config(&options, &CooccurrenceConfig::default()).unwrap();
        assert_eq!(config.window, 2);
        assert_eq!(config.max_num, 200);

        let bad = CooccurrenceOptions {
            mode: Some("sideways".to_string()),
            ..CooccurrenceOptions::default()
        };
        assert!(cooccurrence_config(&bad, &CooccurrenceConfig::default()).is_err());
    }

    #[test]
    fn test_commands_run() {
        run(&["clean", "La casa de papel, 1990"]).unwrap();
        run(&["tokenize", "--analyze", "es", "--stem", "Los gatos corren"]).unwrap();
        run(&["stem", "corriendo"]).unwrap();
        run(&["string-distance", "casa", "cosa", "caso"]).unwrap();
        run(&["compare", "el perro come", "el gato come", "la mesa", "-m", "euclidean"]).unwrap();
        assert!(run(&["compare", "solo uno"]).is_err());
    }

    #[test]
    fn test_chart_commands_write_files() {
        let temp_dir = TempDir::new().unwrap();
        let bars = temp_dir.path().join("barras.svg");
        let csv = temp_dir.path().join("matriz.csv");
        let text = "uva pera uva manzana uva pera";

        run(&["barchart", text, "-o", bars.to_str().unwrap()]).unwrap();
        assert!(fs::read_to_string(&bars).unwrap().starts_with("<svg"));

        run(&[
            "cooccurrence",
            "el gato come",
            "el perro come",
            "--csv",
            csv.to_str().unwrap(),
        ])
        .unwrap();
        assert!(fs::read_to_string(&csv).unwrap().starts_with(",come"));
    }
}
