//! Metadata record assembly and output pruning.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use docmeta_core::{Result, TitlePolicy};

use crate::document::{Document, FileType};
use crate::extract::entities::NamedEntities;
use crate::extract::lexical::LexicalStats;
use crate::extract::sections::SectionMap;
use crate::file::UNTITLED;

/// Message of the record returned for unsupported uploads.
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";

/// Everything the analysis stages found in one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentFeatures {
    pub lexical: LexicalStats,
    pub key_sentences: Vec<String>,
    pub entities: NamedEntities,
    pub sections: SectionMap,
    pub email_ids: Vec<String>,
    pub institution: Option<String>,
}

/// Extracted metadata for one document.
///
/// Absent fields are `None` or empty and never reach the JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub word_count: usize,
    pub character_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_sentences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_entities: Option<NamedEntities>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections_found: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
}

/// Record returned instead of metadata when a file cannot be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
    pub filename: String,
}

impl ErrorRecord {
    pub fn unsupported(filename: impl Into<String>) -> Self {
        Self {
            error: UNSUPPORTED_FILE_TYPE.to_string(),
            filename: filename.into(),
        }
    }
}

/// Result of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataResponse {
    Metadata(MetadataRecord),
    Unsupported(ErrorRecord),
}

impl MetadataResponse {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, MetadataResponse::Unsupported(_))
    }

    pub fn metadata(&self) -> Option<&MetadataRecord> {
        match self {
            MetadataResponse::Metadata(record) => Some(record),
            MetadataResponse::Unsupported(_) => None,
        }
    }

    /// JSON value with every empty field removed.
    pub fn to_json(&self) -> Result<Value> {
        let value = serde_json::to_value(self)?;
        Ok(prune_value(value).unwrap_or_else(|| Value::Object(Map::new())))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json()?)?)
    }
}

/// Recursively drop `null`, `""`, `"None"`, `[]` and `{}`.
///
/// Returns `None` when the value itself is empty after pruning.
pub fn prune_value(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() || s == "None" => None,
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(prune_value).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        Value::Object(fields) => {
            let kept: Map<String, Value> = fields
                .into_iter()
                .filter_map(|(k, v)| prune_value(v).map(|v| (k, v)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        other => Some(other),
    }
}

/// Merge analysis results into a record.
///
/// `summary` prefers a summary or conclusion section and `purpose` an
/// objective or introduction section; otherwise both fall back to key
/// sentences (the first two, and the third and fourth).
pub fn compose(doc: &Document, features: DocumentFeatures, title_policy: TitlePolicy) -> MetadataRecord {
    let summary = features
        .sections
        .find("summary")
        .or_else(|| features.sections.find("conclusion"))
        .map(str::to_string)
        .or_else(|| join_sentences(&features.key_sentences, 0..2));

    let purpose = features
        .sections
        .find("objective")
        .or_else(|| features.sections.find("introduction"))
        .map(str::to_string)
        .or_else(|| join_sentences(&features.key_sentences, 2..4));

    let named_entities = (!features.entities.is_empty()).then_some(features.entities);

    MetadataRecord {
        filename: doc.filename.clone(),
        title: document_title(doc, title_policy),
        word_count: features.lexical.word_count,
        character_count: doc.raw_text.chars().count(),
        top_keywords: features.lexical.top_keywords,
        key_sentences: features.key_sentences,
        summary,
        purpose,
        named_entities,
        sections_found: features.sections.keys(),
        email_ids: features.email_ids,
        institution: features.institution,
    }
}

/// The sentinel stands in only when the DOCX has no paragraphs; a blank
/// first paragraph yields `""`, which pruning removes.
fn document_title(doc: &Document, policy: TitlePolicy) -> Option<String> {
    if doc.kind != FileType::Docx {
        return None;
    }
    match (doc.title.as_deref(), policy) {
        (Some(t), _) => Some(t.trim().to_string()),
        (None, TitlePolicy::Always) => Some(UNTITLED.to_string()),
        (None, TitlePolicy::OmitUntitled) => None,
    }
}

fn join_sentences(sentences: &[String], range: std::ops::Range<usize>) -> Option<String> {
    let end = range.end.min(sentences.len());
    let start = range.start.min(end);
    let joined = sentences[start..end].join(" ");
    (!joined.trim().is_empty()).then_some(joined)
}
