//! Axum router configuration with middleware.
//!
//! API routes live under `/api/`. Middleware: CORS (any origin), tracing.
//!
//! The builder's static front end is served from the configured web
//! directory when it exists; API routes and `/health` take priority and
//! unknown paths fall through to its `index.html`.

use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

const CORS_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];
const CORS_HEADERS: [HeaderName; 1] = [header::CONTENT_TYPE];

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(CORS_METHODS)
        .allow_headers(CORS_HEADERS);

    let web_dir = state.config.web_dir_path();

    let api_routes = Router::new()
        .route(
            "/build-iso",
            post(handlers::build::submit_build).options(handlers::build::preflight),
        )
        .route(
            "/build-status",
            get(handlers::build::build_status).options(handlers::build::preflight),
        )
        // Catch-all so multi-segment and `..` names still reach the 403 check.
        .route(
            "/download/{*filename}",
            get(handlers::build::download_artifact).options(handlers::build::preflight),
        );

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check));

    if web_dir.is_dir() {
        let index_path = web_dir.join("index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir.display(), "static front end serving enabled");
    }

    // Layers go on last so the static fallback is covered too.
    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
