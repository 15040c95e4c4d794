//! Metadata extraction endpoint.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use docmeta_ingest::{ErrorRecord, FileType, MetadataResponse};
use serde::Deserialize;
use tracing::{info, warn};

use super::error_response;
use crate::state::AppState;

const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"metadata.json\"";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/extract", post(extract))
}

#[derive(Debug, Default, Deserialize)]
struct ExtractParams {
    #[serde(default)]
    download: bool,
}

/// One uploaded file held in memory.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// POST /api/extract — multipart upload, returns the metadata record.
async fn extract(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExtractParams>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();

    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.body_text()),
    };

    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "No file uploaded"),
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    info!(
        "[{}] Extracting {} ({} bytes)",
        request_id,
        upload.filename,
        upload.bytes.len()
    );

    let response = if FileType::from_name(&upload.filename) == FileType::Unsupported {
        warn!("[{}] Unsupported file type: {}", request_id, upload.filename);
        MetadataResponse::Unsupported(ErrorRecord::unsupported(
            docmeta_ingest::document::base_name(&upload.filename),
        ))
    } else {
        match run_extraction(&state, upload).await {
            Ok(response) => response,
            Err(failure) => return failure,
        }
    };

    let status = if response.is_unsupported() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    } else {
        StatusCode::OK
    };

    let body = match response.to_json() {
        Ok(body) => body,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let mut resp = (status, Json(body)).into_response();
    if params.download {
        resp.headers_mut()
            .insert(CONTENT_DISPOSITION, HeaderValue::from_static(DOWNLOAD_DISPOSITION));
    }
    resp
}

/// First multipart field that carries a file name.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let bytes = field.bytes().await.map_err(|e| e.body_text())?;
        return Ok(Some(Upload {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Stage the upload in a temp file and run the pipeline on a blocking thread.
///
/// The temp file is removed when the blocking task finishes, including
/// after a timeout.
async fn run_extraction(state: &AppState, upload: Upload) -> Result<MetadataResponse, Response> {
    let pipeline = state.pipeline.clone();
    let uploads = state.config.data_paths.uploads.clone();
    let timeout_secs = state.config.extract_timeout_secs;

    let task = tokio::task::spawn_blocking(move || -> std::io::Result<MetadataResponse> {
        let extension = Path::new(&upload.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let mut temp = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&extension)
            .tempfile_in(&uploads)?;
        temp.write_all(&upload.bytes)?;
        temp.flush()?;
        Ok(pipeline.extract_path(temp.path(), &upload.filename))
    });

    let joined = if timeout_secs > 0 {
        match tokio::time::timeout(Duration::from_secs(timeout_secs), task).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!("Extraction exceeded {}s", timeout_secs);
                return Err(error_response(
                    StatusCode::GATEWAY_TIMEOUT,
                    format!("Extraction timed out after {} seconds", timeout_secs),
                ));
            }
        }
    } else {
        task.await
    };

    match joined {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to stage upload: {}", e),
        )),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Extraction task failed: {}", e),
        )),
    }
}
