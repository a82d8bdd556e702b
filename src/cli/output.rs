//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{ContextoArgs, OutputFormat};
use crate::error::Result;

/// A processed text: cleaned, corrected, stemmed or lemmatized.
#[derive(Debug, Serialize, Deserialize)]
pub struct TextResult {
    pub language: Option<String>,
    pub text: String,
}

/// Result structure for tokenization.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokensResult {
    pub tokenizer: String,
    pub count: usize,
    pub tokens: Vec<String>,
}

/// Result structure for language detection.
#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageResult {
    pub language: String,
    pub code: String,
    pub probability: f64,
}

/// Result structure for vectorization.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorsResult {
    pub method: String,
    pub dimension: usize,
    pub vectors: Vec<Vec<f32>>,
    pub model_saved: Option<String>,
}

/// Pairwise values between inputs.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixResult {
    pub metric: String,
    pub labels: Vec<String>,
    pub values: Vec<Vec<f32>>,
}

/// Result structure for document reading.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResult {
    pub path: String,
    pub kind: String,
    pub pages: Vec<String>,
    pub saved_to: Option<String>,
}

/// A file written by a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    pub size_bytes: u64,
}

/// Result structure for n-gram counts.
#[derive(Debug, Serialize, Deserialize)]
pub struct FrequencyResult {
    pub n: usize,
    pub frequencies: Vec<(String, usize)>,
}

/// Result structure for co-occurrence matrices.
#[derive(Debug, Serialize, Deserialize)]
pub struct CooccurrenceResult {
    pub mode: String,
    pub terms: Vec<String>,
    pub values: Vec<Vec<u64>>,
    pub csv: Option<String>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &ContextoArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &ContextoArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;

    match result {
        _ if std::any::type_name::<T>().contains("TextResult") => output_text_human(&value),
        _ if std::any::type_name::<T>().contains("TokensResult") => output_tokens_human(&value),
        _ if std::any::type_name::<T>().contains("MatrixResult") => output_matrix_human(&value),
        _ if std::any::type_name::<T>().contains("DocumentResult") => {
            output_document_human(&value)
        }
        _ if std::any::type_name::<T>().contains("FrequencyResult") => {
            output_frequencies_human(&value)
        }
        _ if std::any::type_name::<T>().contains("CooccurrenceResult") => {
            output_cooccurrence_human(&value)
        }
        _ if std::any::type_name::<T>().contains("FileResult") => output_file_human(&value),
        _ => output_generic_human(&value),
    }
}

fn output_text_human(value: &serde_json::Value) -> Result<()> {
    if let Some(text) = value.get("text").and_then(|t| t.as_str()) {
        println!("{text}");
    }
    Ok(())
}

fn output_tokens_human(value: &serde_json::Value) -> Result<()> {
    if let Some(tokens) = value.get("tokens").and_then(|t| t.as_array()) {
        for token in tokens {
            println!("{}", format_value(token));
        }
    }
    Ok(())
}

/// Output a matrix as an aligned table with one row and column per input.
fn output_matrix_human(value: &serde_json::Value) -> Result<()> {
    let labels: Vec<String> = value
        .get("labels")
        .and_then(|l| l.as_array())
        .map(|l| l.iter().map(format_value).collect())
        .unwrap_or_default();
    let rows = value
        .get("values")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    if let Some(metric) = value.get("metric").and_then(|m| m.as_str()) {
        println!("{metric}");
    }

    // A single pair comes back as a 1x1 matrix.
    if rows.len() == 1 && labels.len() == 2 {
        let cell = rows[0].get(0).map(format_number).unwrap_or_default();
        println!("{} / {}: {cell}", labels[0], labels[1]);
        return Ok(());
    }

    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(8);
    let header: Vec<String> = labels.iter().map(|l| format!("{l:>width$}")).collect();
    println!("{:width$} {}", "", header.join(" "));
    for (label, row) in labels.iter().zip(&rows) {
        let cells: Vec<String> = row
            .as_array()
            .map(|r| r.iter().map(|v| format!("{:>width$}", format_number(v))).collect())
            .unwrap_or_default();
        println!("{label:width$} {}", cells.join(" "));
    }
    Ok(())
}

fn output_document_human(value: &serde_json::Value) -> Result<()> {
    let pages = value
        .get("pages")
        .and_then(|p| p.as_array())
        .cloned()
        .unwrap_or_default();
    if pages.len() == 1 {
        println!("{}", format_value(&pages[0]));
    } else {
        for (i, page) in pages.iter().enumerate() {
            println!("--- Page {} ---", i + 1);
            println!("{}", format_value(page));
        }
    }
    if let Some(saved) = value.get("saved_to").and_then(|s| s.as_str()) {
        eprintln!("Text saved to {saved}");
    }
    Ok(())
}

fn output_frequencies_human(value: &serde_json::Value) -> Result<()> {
    let frequencies = value
        .get("frequencies")
        .and_then(|f| f.as_array())
        .cloned()
        .unwrap_or_default();
    let width = frequencies
        .iter()
        .filter_map(|pair| pair.get(0).and_then(|t| t.as_str()))
        .map(|t| t.chars().count())
        .max()
        .unwrap_or(0);
    for pair in &frequencies {
        let term = pair.get(0).map(format_value).unwrap_or_default();
        let count = pair.get(1).map(format_value).unwrap_or_default();
        println!("{term:width$}  {count}");
    }
    Ok(())
}

fn output_cooccurrence_human(value: &serde_json::Value) -> Result<()> {
    if let Some(csv) = value.get("csv").and_then(|c| c.as_str()) {
        eprintln!("Matrix saved to {csv}");
    }
    let labels = value.get("terms").cloned().unwrap_or_default();
    let values = value.get("values").cloned().unwrap_or_default();
    let matrix = serde_json::json!({
        "metric": format!("Co-occurrences ({})", format_value(value.get("mode").unwrap_or(&serde_json::Value::Null))),
        "labels": labels,
        "values": values,
    });
    output_matrix_human(&matrix)
}

fn output_file_human(value: &serde_json::Value) -> Result<()> {
    let path = value.get("path").map(format_value).unwrap_or_default();
    let size = value.get("size_bytes").and_then(|s| s.as_u64()).unwrap_or(0);
    println!("Wrote {path} ({})", format_bytes(size));
    Ok(())
}

/// Output generic data in human format.
fn output_generic_human(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                let formatted_val = format_value(val);
                println!("{key}: {formatted_val}");
            }
        }
        _ => {
            let formatted_value = format_value(value);
            println!("{formatted_value}");
        }
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &ContextoArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}

/// Format a matrix cell: integers as they are, other numbers with four
/// decimals.
fn format_number(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) if n.is_f64() => {
            format!("{:.4}", n.as_f64().unwrap_or_default())
        }
        other => format_value(other),
    }
}

/// Format bytes into human-readable format.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    let unit = UNITS[unit_index];
    if unit_index == 0 {
        format!("{bytes} {unit}")
    } else {
        format!("{size:.1} {unit}")
    }
}
