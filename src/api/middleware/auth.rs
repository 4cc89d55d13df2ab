//! Bearer credential authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Identity of the owner making the request.
///
/// Inserted into request extensions by [`layer`]; handlers take it with
/// `Extension<AuthenticatedOwner>` and pass the id into every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedOwner {
    pub id: i64,
}

/// Authenticates requests using Bearer credentials from the Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <credential>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` if the header is
/// missing, malformed, or the credential belongs to no owner. The body never
/// says which.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(credential) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthenticated(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let owner = st.auth_service.authenticate(&credential).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut()
        .insert(AuthenticatedOwner { id: owner.id });

    tracing::debug!(owner_id = owner.id, "Owner authenticated");

    Ok(next.run(req).await)
}
