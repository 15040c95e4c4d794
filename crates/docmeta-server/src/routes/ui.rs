//! Upload page.

use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}

/// GET / — single-page upload form.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
