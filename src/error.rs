//! Application error type and its HTTP mapping.
//!
//! Every fallible operation in the service returns [`AppError`]. Handlers return it
//! directly and axum renders it through [`IntoResponse`] as
//! `{"error": {"code", "message", "details"}}`.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

/// Name of the uniqueness constraint on `codes.redirect_token`.
pub const REDIRECT_TOKEN_CONSTRAINT: &str = "codes_redirect_token_key";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Error taxonomy shared by every layer of the service.
///
/// `NotFound` deliberately covers both "absent" and "owned by someone else" so
/// callers cannot probe for records belonging to other owners.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// No valid owner context on the request.
    #[error("{message}")]
    Unauthenticated { message: String, details: Value },

    /// Record absent or not owned by the caller.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Redirect token already taken. Recovered by re-minting, never surfaced.
    #[error("{message}")]
    TokenCollision { message: String, details: Value },

    /// The persistence layer cannot be reached. Retryable by the client.
    #[error("{message}")]
    StorageUnavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthenticated(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthenticated {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn token_collision(message: impl Into<String>, details: Value) -> Self {
        Self::TokenCollision {
            message: message.into(),
            details,
        }
    }

    pub fn storage_unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::TokenCollision { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts the error into its serializable payload.
    ///
    /// Internal variants never leak their details to clients.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            Self::Validation { message, details } => ErrorInfo {
                code: "validation_error",
                message: message.clone(),
                details: details.clone(),
            },
            Self::Unauthenticated { .. } => ErrorInfo {
                code: "unauthenticated",
                message: "Unauthorized".to_string(),
                details: json!({}),
            },
            Self::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            Self::StorageUnavailable { message, .. } => ErrorInfo {
                code: "storage_unavailable",
                message: message.clone(),
                details: json!({ "retryable": true }),
            },
            Self::TokenCollision { .. } | Self::Internal { .. } => ErrorInfo {
                code: "internal_error",
                message: "Internal server error".to_string(),
                details: json!({}),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, details = ?details_of(&self), "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        if matches!(self, Self::Unauthenticated { .. }) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response();
        }

        (status, Json(body)).into_response()
    }
}

fn details_of(err: &AppError) -> &Value {
    match err {
        AppError::Validation { details, .. }
        | AppError::Unauthenticated { details, .. }
        | AppError::NotFound { details, .. }
        | AppError::TokenCollision { details, .. }
        | AppError::StorageUnavailable { details, .. }
        | AppError::Internal { details, .. } => details,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
            && db.constraint() == Some(REDIRECT_TOKEN_CONSTRAINT)
        {
            return AppError::token_collision(
                "Redirect token already in use",
                json!({ "constraint": REDIRECT_TOKEN_CONSTRAINT }),
            );
        }

        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::storage_unavailable(
                    "Storage temporarily unavailable",
                    json!({ "reason": e.to_string() }),
                )
            }
            other => AppError::internal("Database error", json!({ "reason": other.to_string() })),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&e).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Validation failed", details)
    }
}
