//! JSON response bodies.
//!
//! The build front end expects these exact shapes:
//! ```json
//! { "success": true, "build_id": "...", "message": "Build started successfully" }
//! { "success": false, "error": "..." }
//! { "status": "not_found", "error": "Build not found" }
//! ```
//! Successful status polls return a `BuildSnapshot` as-is.

use serde::Serialize;

/// Body of a successful `POST /api/build-iso`.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub build_id: String,
    pub message: String,
}

impl SubmitResponse {
    pub fn started(build_id: String) -> Self {
        Self {
            success: true,
            build_id,
            message: "Build started successfully".to_string(),
        }
    }
}

/// Failure body for submission and download endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: String) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// Failure body for the status endpoint.
#[derive(Debug, Serialize)]
pub struct StatusErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl StatusErrorBody {
    pub fn new(status: &'static str, error: &str) -> Self {
        Self {
            status,
            error: error.to_string(),
        }
    }
}
