//! Handler for the public scan redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::application::services::ScanOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// Body of every unsuccessful scan.
pub const INVALID_CODE: &str = "invalid code";

/// Resolves a scanned token and redirects to its destination.
///
/// # Endpoint
///
/// `GET /r/{token}`
///
/// # Request Flow
///
/// 1. Look up the token (cache, then database)
/// 2. Atomically increment the scan counter in the database
/// 3. Queue a `scan_update` notification without waiting on it
/// 4. Return `302 Found` with `Location: target_url`
///
/// # Errors
///
/// Unknown tokens get `404` with the plain-text body `invalid code` and no
/// counter changes. Storage outages surface as `503`.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    match state.scan_service.resolve(&token).await? {
        ScanOutcome::Redirect { target_url, .. } => {
            Ok((StatusCode::FOUND, [(header::LOCATION, target_url)]).into_response())
        }
        ScanOutcome::InvalidCode => Ok((StatusCode::NOT_FOUND, INVALID_CODE).into_response()),
    }
}
