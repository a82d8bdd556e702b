//! Word (`.docx`) text extraction and writing.
//!
//! A `.docx` file is a zip package; the body lives in `word/document.xml`.
//! Paragraphs become lines and explicit page breaks split pages.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use quick_xml::Reader as XmlReader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{ContextoError, Result};
use crate::util::fs::{ensure_dir, ensure_parent_dir};

const DOCUMENT_PART: &str = "word/document.xml";
const MEDIA_PREFIX: &str = "word/media/";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_TAIL: &str = "</w:body></w:document>";

fn zip_error(e: zip::result::ZipError) -> ContextoError {
    ContextoError::document(format!("Invalid docx package: {e}"))
}

fn xml_error(e: quick_xml::Error) -> ContextoError {
    ContextoError::document(format!("Invalid docx XML: {e}"))
}

fn is_page_break(element: &BytesStart) -> Result<bool> {
    let kind = element
        .try_get_attribute("w:type")
        .map_err(|e| ContextoError::document(format!("Invalid docx attribute: {e}")))?;
    Ok(kind.is_some_and(|attr| attr.value.as_ref() == b"page"))
}

/// Pages of text in a WordprocessingML body.
pub(crate) fn parse_document_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = XmlReader::from_str(xml);

    let mut pages = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;
    // A paragraph holding only a page break is not a line of text.
    let mut page_broken = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    page_broken = false;
                    paragraph.clear();
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = false;
                    if !(page_broken && paragraph.is_empty()) {
                        paragraphs.push(std::mem::take(&mut paragraph));
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" if in_paragraph => paragraph.push('\t'),
                b"w:br" | b"w:cr" if in_paragraph => {
                    if is_page_break(&e)? {
                        if !paragraph.is_empty() {
                            paragraphs.push(std::mem::take(&mut paragraph));
                        }
                        pages.push(paragraphs.join("\n"));
                        paragraphs.clear();
                        page_broken = true;
                    } else {
                        paragraph.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                paragraph.push_str(&t.unescape().map_err(xml_error)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    pages.push(paragraphs.join("\n"));
    Ok(pages)
}

/// Text of a `.docx` file, one entry per page. With `media_dir`, embedded
/// images are copied there.
pub fn read_pages(path: &Path, media_dir: Option<&Path>) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(zip_error)?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(zip_error)?
        .read_to_string(&mut xml)?;

    if let Some(media_dir) = media_dir {
        extract_media(&mut archive, media_dir)?;
    }

    parse_document_xml(&xml)
}

fn extract_media(archive: &mut ZipArchive<File>, media_dir: &Path) -> Result<()> {
    ensure_dir(media_dir)?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        let Some(name) = entry.name().strip_prefix(MEDIA_PREFIX).map(str::to_string) else {
            continue;
        };
        // Entries with directory components are skipped rather than recreated.
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            continue;
        }
        let target = media_dir.join(&name);
        let mut output = File::create(&target)?;
        std::io::copy(&mut entry, &mut output)?;
        log::debug!("Extracted {}", target.display());
    }
    Ok(())
}

fn paragraph_xml(text: &str) -> String {
    let mut xml = String::from("<w:p><w:r>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape(line));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r></w:p>");
    xml
}

/// Body XML with one paragraph per page and page breaks between pages.
pub(crate) fn document_xml(pages: &[String]) -> String {
    let mut xml = String::from(DOCUMENT_HEAD);
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        }
        xml.push_str(&paragraph_xml(page));
    }
    xml.push_str(DOCUMENT_TAIL);
    xml
}

/// Write `pages` to a `.docx` file.
pub fn write_pages(path: &Path, pages: &[String]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default();

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        (DOCUMENT_PART, document_xml(pages)),
    ] {
        zip.start_file(name, options).map_err(zip_error)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish().map_err(zip_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_document_xml() {
        let xml = r#"<w:document><w:body>
<w:p><w:r><w:t>Hola</w:t></w:r><w:r><w:t xml:space="preserve"> mundo &amp; más</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>antes</w:t><w:br w:type="page"/><w:t>después</w:t></w:r></w:p>
</w:body></w:document>"#;
        let pages = parse_document_xml(xml).unwrap();
        assert_eq!(pages, vec!["Hola mundo & más\n\nantes", "después"]);
    }

    #[test]
    fn test_round_trip_through_package() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("informe.docx");
        let pages = vec!["Título\nlínea <2>".to_string(), "Segunda página".to_string()];
        write_pages(&path, &pages).unwrap();

        let media = temp_dir.path().join("media");
        let read = read_pages(&path, Some(&media)).unwrap();
        assert_eq!(read, pages);
        assert!(media.is_dir());
    }
}
