//! Exploring a small corpus read from disk: n-grams, co-occurrences and the
//! charts built on them.

use std::fs;

use contexto::exploration::{
    BarChartConfig, CooccurrenceConfig, CooccurrenceMode, DispersionConfig, GraphConfig,
    WordCloudConfig, bar_chart, cooccurrence_graph, cooccurrence_matrix, dispersion_plot,
    ngram_frequencies, word_cloud,
};
use contexto::io::{ReaderConfig, read_text};
use tempfile::TempDir;

const DOCUMENTS: [&str; 4] = [
    "el río crece con la lluvia",
    "la lluvia llena el río y el lago",
    "el lago refleja el cielo",
    "la lluvia cae sobre el cielo gris",
];

fn corpus_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("corpus.txt");
    fs::write(&path, DOCUMENTS.join("\n")).unwrap();
    path
}

#[test]
fn test_frequencies_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let text = read_text(corpus_file(&temp_dir), &ReaderConfig::default())
        .unwrap()
        .into_text();

    let top = ngram_frequencies(&text, 1, Some(3)).unwrap();
    assert_eq!(top[0], ("el".to_string(), 6));
    assert_eq!(top[1], ("la".to_string(), 3));
    assert_eq!(top[2], ("lluvia".to_string(), 3));

    let bigrams = ngram_frequencies(&text, 2, Some(1)).unwrap();
    assert_eq!(bigrams[0], ("la lluvia".to_string(), 3));
}

#[test]
fn test_cooccurrence_graph_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("graficos").join("grafo.svg");

    let config = CooccurrenceConfig {
        mode: CooccurrenceMode::Window,
        window: 2,
        max_num: 8,
        ..CooccurrenceConfig::default()
    };
    let matrix = cooccurrence_matrix(&DOCUMENTS, &config, None).unwrap();
    assert_eq!(matrix.len(), 8);
    assert!(matrix.terms.windows(2).all(|w| w[0] < w[1]));

    let svg = cooccurrence_graph(
        &matrix,
        &GraphConfig {
            output: Some(output.clone()),
            ..GraphConfig::default()
        },
    )
    .unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), svg);
    assert!(svg.contains(">río</text>"));
}

#[test]
fn test_charts_of_one_text() {
    let temp_dir = TempDir::new().unwrap();
    let text = DOCUMENTS.join(" ");

    let cloud_path = temp_dir.path().join("nube.svg");
    word_cloud(
        &text,
        &WordCloudConfig {
            output: Some(cloud_path.clone()),
            ..WordCloudConfig::default()
        },
    )
    .unwrap();
    assert!(fs::read_to_string(&cloud_path).unwrap().contains(">lluvia</text>"));

    let bars = bar_chart(
        &text,
        &BarChartConfig {
            n_terms: 5,
            ..BarChartConfig::default()
        },
    )
    .unwrap();
    // Background plus five bars.
    assert_eq!(bars.matches("<rect").count(), 6);
}

#[test]
fn test_dispersion_over_documents() {
    let svg = dispersion_plot(
        &DOCUMENTS,
        &["lluvia", "cielo", "nieve"],
        &DispersionConfig {
            labels: Some(vec![
                "lunes".to_string(),
                "martes".to_string(),
                "miércoles".to_string(),
                "jueves".to_string(),
            ]),
            ..DispersionConfig::default()
        },
    )
    .unwrap();
    assert!(svg.contains(">miércoles</text>"));
    assert!(svg.contains(">cielo</text>"));
    assert!(!svg.contains(">nieve</text>"));
}
