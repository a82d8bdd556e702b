//! PDF text extraction and a minimal PDF writer.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::error::{ContextoError, Result};
use crate::util::fs::ensure_parent_dir;

/// Letter page size, in points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const FONT_SIZE: i64 = 7;
const LEADING: f32 = 8.5;
const TEXT_ORIGIN: (i64, i64) = (50, 700);
/// Lines longer than this many characters are wrapped.
const WRAP_WIDTH: usize = 150;

/// Text of each page of a PDF.
///
/// Without a password the text layer is read with `pdf-extract`, falling
/// back to `lopdf` when that fails. Protected documents go straight to
/// `lopdf`, which can decrypt them.
pub fn read_pages(path: &Path, password: Option<&str>) -> Result<Vec<String>> {
    if password.is_none() {
        match pdf_extract::extract_text_by_pages(path) {
            Ok(pages) => return Ok(pages),
            Err(e) => log::debug!(
                "pdf-extract could not read {}: {e}; trying lopdf",
                path.display()
            ),
        }
    }
    read_pages_lopdf(path, password)
}

fn read_pages_lopdf(path: &Path, password: Option<&str>) -> Result<Vec<String>> {
    let mut document = Document::load(path)
        .map_err(|e| ContextoError::document(format!("Failed to open PDF {}: {e}", path.display())))?;

    if document.is_encrypted() {
        document
            .decrypt(password.unwrap_or(""))
            .map_err(|e| ContextoError::document(format!("Failed to decrypt PDF: {e}")))?;
    }

    let pages = document
        .get_pages()
        .keys()
        .map(|&number| match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Could not extract text from page {number}: {e}");
                String::new()
            }
        })
        .collect();
    Ok(pages)
}

/// Greedy word wrap at `width` characters. Words longer than the width get a
/// line of their own.
pub(crate) fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode for the WinAnsi font encoding; characters outside Latin-1 become `?`.
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn page_operations(text: &str) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![TEXT_ORIGIN.0.into(), TEXT_ORIGIN.1.into()]),
    ];
    for line in text.split('\n') {
        let wrapped = wrap_line(line, WRAP_WIDTH);
        if wrapped.is_empty() {
            operations.push(Operation::new("T*", vec![]));
        }
        for sub_line in wrapped {
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(latin1_bytes(&sub_line), StringFormat::Literal)],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
    }
    operations.push(Operation::new("ET", vec![]));
    operations
}

/// Write one PDF page per entry of `pages`.
pub fn write_pages(path: &Path, pages: &[String]) -> Result<()> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: page_operations(text),
        };
        let encoded = content
            .encode()
            .map_err(|e| ContextoError::document(format!("Failed to encode PDF page: {e}")))?;
        let content_id = document.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document.compress();

    ensure_parent_dir(path)?;
    document.save(path)?;
    Ok(())
}
