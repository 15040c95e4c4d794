//! File text extraction for DOCX, PDF and plain text.
//!
//! Readers return `Result`; [`load_document`] turns reader failures into a
//! textual stand-in (`"Error reading PDF: ..."`) so a bad upload still
//! produces a well-formed metadata record.

use std::path::Path;

use docmeta_core::{Error, Result};
use tracing::{debug, warn};

use crate::document::{base_name, Document, FileType};
use crate::ocr::OcrEngine;

/// Fallback DOCX title when the document has no paragraphs.
pub const UNTITLED: &str = "Untitled";

/// Paragraph texts of a DOCX body, in order.
#[derive(Debug, Clone, Default)]
pub struct DocxContent {
    pub paragraphs: Vec<String>,
}

impl DocxContent {
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    /// First paragraph, trimmed.
    pub fn title(&self) -> Option<String> {
        self.paragraphs.first().map(|p| p.trim().to_string())
    }
}

/// Load a document, choosing the reader from the extension of `filename`.
///
/// Returns `Error::UnsupportedFileType` for anything other than DOCX, PDF
/// and TXT. Every other failure is folded into the document text.
pub fn load_document(
    path: &Path,
    filename: &str,
    ocr: Option<&dyn OcrEngine>,
) -> Result<Document> {
    let filename = base_name(filename);
    let kind = FileType::from_name(&filename);

    let (title, raw_text) = match kind {
        FileType::Docx => match read_docx(path) {
            Ok(content) => (content.title(), content.text()),
            Err(e) => {
                warn!("Failed to read DOCX {}: {}", path.display(), e);
                (None, surrogate(kind, &e))
            }
        },
        FileType::Pdf => {
            let text = pdf_text(path, ocr).unwrap_or_else(|e| {
                warn!("Failed to read PDF {}: {}", path.display(), e);
                surrogate(kind, &e)
            });
            (None, text)
        }
        FileType::PlainText => {
            let text = read_txt(path).unwrap_or_else(|e| {
                warn!("Failed to read TXT {}: {}", path.display(), e);
                surrogate(kind, &e)
            });
            (None, text)
        }
        FileType::Unsupported => return Err(Error::UnsupportedFileType(filename)),
    };

    Ok(Document {
        filename,
        kind,
        title,
        raw_text,
    })
}

/// The text that stands in for a document that could not be read.
fn surrogate(kind: FileType, err: &Error) -> String {
    let message = match err {
        Error::Docx(m) | Error::Pdf(m) | Error::Ocr(m) => m.clone(),
        other => other.to_string(),
    };
    format!("Error reading {}: {}", kind.label(), message)
}

/// Read the body paragraphs of a DOCX file.
pub fn read_docx(path: &Path) -> Result<DocxContent> {
    let bytes = std::fs::read(path)?;
    let docx = docx_rs::read_docx(&bytes).map_err(|e| Error::Docx(e.to_string()))?;

    let paragraphs = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    Ok(DocxContent { paragraphs })
}

/// Concatenate the text runs of one paragraph, including runs nested in
/// hyperlinks and tracked insertions.
fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    push_children_text(&para.children, &mut text);
    text
}

fn push_children_text(children: &[docx_rs::ParagraphChild], text: &mut String) {
    use docx_rs::{InsertChild, ParagraphChild};

    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run_text(run, text),
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for ic in &insert.children {
                    if let InsertChild::Run(run) = ic {
                        push_run_text(run, text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run_text(run: &docx_rs::Run, text: &mut String) {
    use docx_rs::RunChild;

    for rc in &run.children {
        match rc {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

/// Extract the text of each PDF page, in page order.
///
/// A page whose text cannot be decoded counts as empty.
pub fn read_pdf_pages(bytes: &[u8]) -> Result<Vec<String>> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| Error::Pdf(e.to_string()))?;

    let pages = doc
        .get_pages()
        .keys()
        .map(|&number| {
            doc.extract_text(&[number]).unwrap_or_else(|e| {
                debug!("No text on PDF page {}: {}", number, e);
                String::new()
            })
        })
        .collect();
    Ok(pages)
}

/// PDF text, with an OCR pass when direct extraction finds nothing.
fn pdf_text(path: &Path, ocr: Option<&dyn OcrEngine>) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let pages = read_pdf_pages(&bytes)?;
    let text = pages.concat();
    if !text.trim().is_empty() {
        return Ok(text);
    }

    match ocr {
        Some(engine) if engine.is_available() => {
            warn!(
                "PDF {} has no extractable text, running OCR on {} pages",
                path.display(),
                pages.len()
            );
            ocr_pages(path, pages.len(), engine)
        }
        Some(engine) => {
            warn!(
                "PDF {} has no extractable text and OCR backend '{}' is unavailable",
                path.display(),
                engine.name()
            );
            Ok(text)
        }
        None => Ok(text),
    }
}

/// Recognize pages `1..=page_count` and concatenate the results.
pub(crate) fn ocr_pages(path: &Path, page_count: usize, engine: &dyn OcrEngine) -> Result<String> {
    let mut text = String::new();
    for page in 1..=page_count as u32 {
        text.push_str(&engine.recognize_page(path, page)?);
    }
    Ok(text)
}

/// Read a text file. Invalid UTF-8 is replaced rather than rejected.
pub fn read_txt(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!("{} is not valid UTF-8, decoding lossily", path.display());
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}
