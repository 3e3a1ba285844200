//! Error types mapping to HTTP status codes and JSON bodies.
//!
//! Two body shapes exist: most endpoints answer `{success: false, error}`,
//! while the status endpoint answers `{status: "not_found" | "error", error}`
//! so pollers can branch on `status` alone.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use minerforge_types::error::BuildError;

use crate::http::response::{ErrorBody, StatusErrorBody};

/// Application-level error for submission and download endpoints.
#[derive(Debug)]
pub enum AppError {
    /// Request body was not valid JSON.
    InvalidJson(String),
    /// Error from the build service.
    Build(BuildError),
}

impl From<BuildError> for AppError {
    fn from(e: BuildError) -> Self {
        AppError::Build(e)
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::InvalidJson(detail) => {
                (StatusCode::BAD_REQUEST, format!("Invalid JSON data: {detail}"))
            }
            AppError::Build(e @ BuildError::Validation(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Build(BuildError::NotFound) => {
                (StatusCode::NOT_FOUND, "Build not found".to_string())
            }
            AppError::Build(BuildError::ArtifactNotFound) => {
                (StatusCode::NOT_FOUND, "File not found".to_string())
            }
            AppError::Build(BuildError::Forbidden(_)) => {
                (StatusCode::FORBIDDEN, "Invalid file type".to_string())
            }
            AppError::Build(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

/// Error for `GET /api/build-status`.
#[derive(Debug)]
pub struct StatusError(pub BuildError);

impl From<BuildError> for StatusError {
    fn from(e: BuildError) -> Self {
        StatusError(e)
    }
}

impl IntoResponse for StatusError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            BuildError::NotFound => (
                StatusCode::NOT_FOUND,
                StatusErrorBody::new("not_found", "Build not found"),
            ),
            e => {
                tracing::error!(error = %e, "status lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    StatusErrorBody::new("error", &e.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minerforge_types::error::ValidationError;

    #[test]
    fn maps_build_errors_to_status_codes() {
        let cases = [
            (AppError::InvalidJson("eof".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Build(ValidationError::WalletPrefix("ak_").into()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::Build(BuildError::ArtifactNotFound), StatusCode::NOT_FOUND),
            (
                AppError::Build(BuildError::Forbidden("x.txt".into())),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::Build(BuildError::Internal("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn status_error_not_found_is_404() {
        let resp = StatusError(BuildError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = StatusError(BuildError::Internal("lock".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
