//! DocMeta Ingest — document loading, text analysis and metadata composition.

pub mod compose;
pub mod document;
pub mod extract;
pub mod file;
pub mod ocr;
pub mod pipeline;

pub use compose::{prune_value, ErrorRecord, MetadataRecord, MetadataResponse};
pub use document::{Document, FileType};
pub use extract::{create_tagger, EntityTagger, HeuristicTagger, NamedEntities};
pub use file::load_document;
pub use ocr::{create_ocr_engine, NoopOcr, OcrEngine, TesseractOcr};
pub use pipeline::MetadataPipeline;
