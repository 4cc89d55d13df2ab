//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /r/{token}`        - Scan redirect (public)
//! - `GET  /ws`               - Live scan updates over WebSocket (public)
//! - `GET  /health`           - Health check: DB, scan queue, cache (public)
//! - `/codes`, `/codes/{id}`  - Code management (Bearer credential required)
//! - `GET  /static/qrs/*`     - Rendered QR images
//!
//! Every route is wrapped in request tracing and trailing-slash normalization.

use crate::api;
use crate::api::handlers::{health_handler, live_handler, redirect_handler};
use crate::api::middleware::{auth, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use std::path::Path;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Constructs the application router.
///
/// `asset_dir` is the directory the QR images are rendered into; it is served
/// read-only under `/static/qrs`.
pub fn app_router(state: AppState, asset_dir: impl AsRef<Path>) -> NormalizePath<Router> {
    let api_router = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let router = Router::new()
        .route("/r/{token}", get(redirect_handler))
        .route("/ws", get(live_handler))
        .route("/health", get(health_handler))
        .merge(api_router)
        .nest_service("/static/qrs", ServeDir::new(asset_dir.as_ref()))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
