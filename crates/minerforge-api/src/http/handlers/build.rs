//! ISO build handlers for the HTTP API.

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use minerforge_types::build::BuildSnapshot;
use minerforge_types::error::BuildError;

use crate::http::error::{AppError, StatusError};
use crate::http::extractors::query::BuildStatusQuery;
use crate::http::response::SubmitResponse;
use crate::state::AppState;

/// POST /api/build-iso - Validate a build request and start the build.
pub async fn submit_build(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    let raw: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidJson(e.to_string()))?;

    let build_id = state.build_service.submit(&raw).map_err(|e| {
        tracing::info!(error = %e, "build request rejected");
        e
    })?;

    Ok(Json(SubmitResponse::started(build_id.to_string())))
}

/// GET /api/build-status?id=<build_id> - Progress and recent logs of a build.
pub async fn build_status(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BuildSnapshot>, StatusError> {
    let query = BuildStatusQuery::from_pairs(pairs);
    let id = query.id.ok_or(BuildError::NotFound)?;
    let snapshot = state.build_service.get_status(&id)?;
    Ok(Json(snapshot))
}

/// GET /api/download/{filename} - Stream a built ISO.
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = state
        .build_service
        .resolve_download(&filename)
        .await
        .map_err(|e| {
            tracing::info!(%filename, error = %e, "download refused");
            e
        })?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| BuildError::ArtifactNotFound)?;
    let len = file.metadata().await.map_err(BuildError::Io)?.len();

    tracing::info!(%filename, bytes = len, "serving artifact");

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_LENGTH, len.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// OPTIONS on API routes - Bare preflight answer; CORS headers come from the layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
