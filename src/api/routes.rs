//! Owner-facing API route configuration.
//!
//! All endpoints here require Bearer authentication via
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_codes_handler, delete_code_handler, list_codes_handler, rename_code_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch},
};

/// Code management routes.
///
/// # Endpoints
///
/// - `POST   /codes`       - Mint a batch of codes
/// - `GET    /codes`       - List the caller's codes
/// - `PATCH  /codes/{id}`  - Set or clear a display name
/// - `DELETE /codes/{id}`  - Delete a code and its QR image
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/codes", get(list_codes_handler).post(create_codes_handler))
        .route(
            "/codes/{id}",
            patch(rename_code_handler).delete(delete_code_handler),
        )
}
