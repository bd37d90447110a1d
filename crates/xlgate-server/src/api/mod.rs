//! HTTP API surface
//!
//! Thin I/O wrapper over the ingestion orchestrator: the upload route builds
//! an [`UploadedFile`] from the multipart body, hands it to the orchestrator,
//! and renders the synchronous [`Summary`] as JSON. All routing decisions and
//! failure semantics live in the core, not here.

pub mod response;

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::config::Config;
use crate::error::AppError;
use crate::file::UploadedFile;
use crate::middleware;
use crate::orchestrator::IngestionOrchestrator;
use response::ApiResponse;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<IngestionOrchestrator>,
    /// Initiator identity assumed when the upload carries none.
    pub system_identity: String,
}

/// Build the application router with all routes and middleware
pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/uploads", post(upload_file))
        .with_state(state)
        .layer(middleware::tracing_layer())
        .layer(middleware::body_limit_layer(config))
}

/// Health check handler
async fn health_check() -> Response {
    (StatusCode::OK, Json(json!({"status": "healthy"}))).into_response()
}

#[tracing::instrument(skip(state, multipart))]
async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut initiator: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {e}")))?;
                file = Some(UploadedFile::new(name, content_type, data));
            },
            "initiator" => {
                initiator = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read initiator field: {e}"))
                })?);
            },
            _ => {},
        }
    }

    let file = file
        .ok_or_else(|| AppError::BadRequest("Expected a file field named 'file'".to_string()))?;
    let initiator = initiator.unwrap_or_else(|| state.system_identity.clone());

    let summary = state.orchestrator.ingest(&file, &initiator).await;

    tracing::info!(
        ok = summary.ok,
        error_count = summary.error_count,
        "Upload ingested via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(summary))).into_response())
}
