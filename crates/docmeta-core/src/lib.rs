//! docmeta core — error type and configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, DocMetaConfig, OcrSettings, PipelineOptions, TitlePolicy};
pub use error::{Error, Result};
