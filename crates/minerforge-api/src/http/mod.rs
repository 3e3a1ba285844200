//! HTTP API layer for minerforge.
//!
//! Axum-based JSON API under `/api/` for submitting ISO builds, polling
//! their progress and downloading the result, with permissive CORS for the
//! browser front end.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
