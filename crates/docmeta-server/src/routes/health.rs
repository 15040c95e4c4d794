//! Liveness and capability report.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

/// GET /api/health — server status and enabled stages.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let options = state.pipeline.options();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "entities": options.entities,
        "sections": options.sections,
        "ocr_fallback": options.ocr_fallback,
        "ocr_available": state.pipeline.ocr_available(),
        "tagger": state.pipeline.tagger_name(),
        "uptime_secs": state.uptime_secs(),
    }))
}
