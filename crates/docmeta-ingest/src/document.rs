//! Loaded document and declared file type.

use std::path::Path;

/// Supported file types, chosen by extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Docx,
    Pdf,
    PlainText,
    Unsupported,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "docx" => Self::Docx,
            "pdf" => Self::Pdf,
            "txt" => Self::PlainText,
            _ => Self::Unsupported,
        }
    }

    /// Detect file type from the extension of a file name or path.
    pub fn from_name(name: impl AsRef<Path>) -> Self {
        name.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unsupported)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Docx => "DOCX",
            Self::Pdf => "PDF",
            Self::PlainText => "TXT",
            Self::Unsupported => "unsupported",
        }
    }
}

/// A document's text as seen by the analysis stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub filename: String,
    pub kind: FileType,
    /// First paragraph of a DOCX file. `None` for other types and for
    /// DOCX files without paragraphs.
    pub title: Option<String>,
    pub raw_text: String,
}

impl Document {
    /// Wrap already-extracted text.
    pub fn from_text(filename: impl Into<String>, kind: FileType, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            kind,
            title: None,
            raw_text: text.into(),
        }
    }
}

/// Strip any directory components from an uploaded or on-disk name.
pub fn base_name(name: &str) -> String {
    let cleaned = name.replace('\\', "/");
    cleaned
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("unnamed")
        .to_string()
}
