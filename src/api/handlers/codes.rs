//! Handlers for code management endpoints (create, list, rename, delete).

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::codes::{
    CodeResponse, CreateCodesRequest, CreateCodesResponse, DeleteCodeResponse, RenameCodeRequest,
};
use crate::api::middleware::AuthenticatedOwner;
use crate::error::AppError;
use crate::state::AppState;

fn body_rejected(rejection: JsonRejection) -> AppError {
    AppError::bad_request(
        "Invalid request body",
        json!({ "reason": rejection.body_text() }),
    )
}

/// A path id that is not an integer cannot name an existing code.
fn code_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::not_found("Code not found", json!({})))
}

/// Mints a batch of codes for the authenticated owner.
///
/// # Endpoint
///
/// `POST /codes`
///
/// # Request Body
///
/// ```json
/// { "target_url": "https://example.com", "count": 3 }
/// ```
///
/// `count` may also be a numeric string (`"3"`).
///
/// # Response
///
/// `201 Created` with `{"count": 3}`.
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed body, an empty or non-HTTP(S)
/// `target_url`, or a `count` outside `1..=MAX_BATCH_SIZE`. No code is
/// created in that case.
pub async fn create_codes_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    payload: Result<Json<CreateCodesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateCodesResponse>), AppError> {
    let Json(payload) = payload.map_err(body_rejected)?;
    payload.validate()?;

    let codes = state
        .code_service
        .create_batch(owner.id, &payload.target_url, payload.count)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCodesResponse { count: codes.len() }),
    ))
}

/// Lists the authenticated owner's codes, ordered by id.
///
/// # Endpoint
///
/// `GET /codes`
pub async fn list_codes_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
) -> Result<Json<Vec<CodeResponse>>, AppError> {
    let codes = state.code_service.list(owner.id).await?;

    Ok(Json(codes.into_iter().map(CodeResponse::from).collect()))
}

/// Sets or clears a code's display name.
///
/// # Endpoint
///
/// `PATCH /codes/{id}` with `{"display_name": "Spring flyer"}`; `null` or a
/// blank string clears the label.
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist or belongs to another owner.
pub async fn rename_code_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RenameCodeRequest>, JsonRejection>,
) -> Result<Json<CodeResponse>, AppError> {
    let id = code_id(path)?;
    let Json(payload) = payload.map_err(body_rejected)?;

    let code = state
        .code_service
        .rename(owner.id, id, payload.display_name)
        .await?;

    Ok(Json(code.into()))
}

/// Deletes a code and its QR image.
///
/// # Endpoint
///
/// `DELETE /codes/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist or belongs to another owner.
pub async fn delete_code_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthenticatedOwner>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteCodeResponse>, AppError> {
    let id = code_id(path)?;

    let code = state.code_service.delete(owner.id, id).await?;

    Ok(Json(DeleteCodeResponse {
        id: code.id,
        deleted: true,
    }))
}
