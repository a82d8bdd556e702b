//! Writing documents in every supported format and reading them back.

use std::fs;

use contexto::io::{DocumentKind, ReadOutput, ReaderConfig, read_text, write_text};
use tempfile::TempDir;

fn pages() -> Vec<String> {
    vec!["Primera hoja del informe".to_string(), "Segunda hoja".to_string()]
}

fn by_pages() -> ReaderConfig {
    ReaderConfig {
        by_pages: true,
        ..ReaderConfig::default()
    }
}

#[test]
fn test_plain_text_keeps_page_separator() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("informe.txt");

    let written = write_text(&path, pages(), &DocumentKind::Infer).unwrap();
    assert_eq!(written, path);
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("|**|"));

    let text = read_text(&path, &ReaderConfig::default()).unwrap().into_text();
    assert!(text.starts_with("Primera hoja del informe"));
    assert!(text.ends_with("Segunda hoja"));
}

#[test]
fn test_docx_pages_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("anexos").join("informe.docx");

    write_text(&path, pages(), &DocumentKind::Infer).unwrap();
    assert_eq!(read_text(&path, &by_pages()).unwrap(), ReadOutput::Pages(pages()));
}

#[test]
fn test_pdf_pages_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("informe.pdf");

    write_text(&path, pages(), &DocumentKind::Pdf).unwrap();
    let read = read_text(&path, &by_pages()).unwrap().into_pages();
    assert_eq!(read.len(), 2);
    assert!(read[0].contains("Primera"));
    assert!(read[1].contains("Segunda"));
}

#[test]
fn test_unknown_format_falls_back_to_text() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("datos.xyz");

    let written = write_text(&path, "contenido", &DocumentKind::Infer).unwrap();
    assert_eq!(written, temp_dir.path().join("datos_xyz.txt"));
    assert!(!path.exists());
    assert_eq!(
        read_text(&written, &ReaderConfig::default()).unwrap(),
        ReadOutput::Text("contenido".to_string())
    );
}

#[test]
fn test_forced_kind_overrides_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tabla.dat");
    fs::write(&path, "a,b\n1,2\n").unwrap();

    let config = ReaderConfig {
        kind: DocumentKind::Csv,
        ..ReaderConfig::default()
    };
    assert_eq!(read_text(&path, &config).unwrap().into_text(), "a,b\n1,2");
    assert!(read_text(&path, &ReaderConfig::default()).is_err());
}
