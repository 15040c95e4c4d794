//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use docmeta_core::DocMetaConfig;
use docmeta_ingest::MetadataPipeline;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: DocMetaConfig,
    pub pipeline: Arc<MetadataPipeline>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state with a pipeline created from the configured options.
    pub fn new(config: DocMetaConfig) -> Self {
        let pipeline = Arc::new(MetadataPipeline::from_options(config.pipeline.clone()));
        Self::with_pipeline(config, pipeline)
    }

    pub fn with_pipeline(config: DocMetaConfig, pipeline: Arc<MetadataPipeline>) -> Self {
        Self {
            config,
            pipeline,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
