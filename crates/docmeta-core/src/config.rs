//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3004;
/// Default upload size limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 25;
/// Default wall-clock limit for one extraction call.
pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 120;

/// Paths to the docmeta data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Temporary upload files (`data/uploads/`). Files live only for one request.
    pub uploads: PathBuf,
    /// Pipeline options (`data/docmeta.json`), optional.
    pub options_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            uploads: root.join("uploads"),
            options_file: root.join("docmeta.json"),
            root,
        };
        std::fs::create_dir_all(&paths.uploads)?;
        Ok(paths)
    }
}

/// How the DOCX `title` field behaves when the document has no paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePolicy {
    /// Always emit a title for DOCX input, using "Untitled" when there is none.
    #[default]
    Always,
    /// Leave the title out when the document has no paragraphs.
    OmitUntitled,
}

/// Settings for the OCR fallback used on image-only PDFs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language code.
    pub language: String,
    /// Path to the tesseract binary (relies on PATH by default).
    pub tesseract_path: String,
    /// Path to poppler's pdftoppm, used to render pages to images.
    pub pdftoppm_path: String,
    /// Render resolution for OCR.
    pub dpi: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".into(),
            tesseract_path: "tesseract".into(),
            pdftoppm_path: "pdftoppm".into(),
            dpi: 300,
        }
    }
}

/// Which enrichment stages run and how large their outputs are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Run the entity extractor.
    pub entities: bool,
    /// Run the section detector.
    pub sections: bool,
    /// OCR image-only PDFs.
    pub ocr_fallback: bool,
    /// Maximum number of `top_keywords`.
    pub keyword_limit: usize,
    /// Maximum number of `key_sentences`.
    pub key_sentence_limit: usize,
    pub title_policy: TitlePolicy,
    /// Institution names reported in `institution` when found verbatim.
    pub known_institutions: Vec<String>,
    pub ocr: OcrSettings,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            entities: true,
            sections: true,
            ocr_fallback: true,
            keyword_limit: 10,
            key_sentence_limit: 5,
            title_policy: TitlePolicy::Always,
            known_institutions: Vec::new(),
            ocr: OcrSettings::default(),
        }
    }
}

impl PipelineOptions {
    /// Load options from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Apply `DOCMETA_ENTITIES`, `DOCMETA_SECTIONS` and `DOCMETA_OCR_FALLBACK`.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply stage switches from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let switches: [(&str, &mut bool); 3] = [
            ("DOCMETA_ENTITIES", &mut self.entities),
            ("DOCMETA_SECTIONS", &mut self.sections),
            ("DOCMETA_OCR_FALLBACK", &mut self.ocr_fallback),
        ];
        for (key, slot) in switches {
            if let Some(raw) = lookup(key) {
                *slot = parse_switch(&raw)
                    .ok_or_else(|| Error::Config(format!("{key}: expected on/off, got {raw:?}")))?;
            }
        }
        Ok(())
    }
}

/// Parse an on/off style switch.
pub fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Top-level docmeta configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMetaConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Upload body limit in bytes.
    pub max_upload_bytes: usize,
    /// Limit for one extraction call; 0 disables the limit.
    pub extract_timeout_secs: u64,
    pub pipeline: PipelineOptions,
}

impl DocMetaConfig {
    /// Create configuration from environment, `docmeta.json` and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        let port = env_parse("PORT").unwrap_or(DEFAULT_PORT);
        let max_upload_mb = env_parse("DOCMETA_MAX_UPLOAD_MB").unwrap_or(DEFAULT_MAX_UPLOAD_MB);
        let extract_timeout_secs =
            env_parse("DOCMETA_EXTRACT_TIMEOUT_SECS").unwrap_or(DEFAULT_EXTRACT_TIMEOUT_SECS);

        let data_paths = DataPaths::new(data_dir)?;
        let mut pipeline = PipelineOptions::load(&data_paths.options_file)?;
        pipeline.apply_env()?;

        Ok(Self {
            port,
            data_paths,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            extract_timeout_secs,
            pipeline,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
