//! DTOs for the code management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use validator::Validate;

use crate::domain::entities::Code;

/// Request body for `POST /codes`.
///
/// `count` accepts a JSON number or a numeric string (`3` or `"3"`), which is
/// what HTML forms serialized to JSON tend to send.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCodesRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "target_url must not be empty"))]
    pub target_url: String,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub count: i64,
}

/// Response body for `POST /codes`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCodesResponse {
    pub count: usize,
}

/// Request body for `PATCH /codes/{id}`.
///
/// `null`, an absent field and a blank string all clear the label. The length
/// limit applies to the trimmed label and is enforced by the service.
#[derive(Debug, Deserialize)]
pub struct RenameCodeRequest {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// JSON representation of a code.
#[derive(Debug, Serialize, Deserialize)]
pub struct CodeResponse {
    pub id: i64,
    pub target_url: String,
    pub redirect_token: String,
    pub asset_reference: String,
    /// Path under which the rendered QR image is served.
    pub asset_url: String,
    pub scan_count: i64,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Code> for CodeResponse {
    fn from(code: Code) -> Self {
        Self {
            asset_url: format!("/static/qrs/{}", code.asset_reference),
            id: code.id,
            target_url: code.target_url,
            redirect_token: code.redirect_token,
            asset_reference: code.asset_reference,
            scan_count: code.scan_count,
            display_name: code.display_name,
            created_at: code.created_at,
        }
    }
}

/// Response body for `DELETE /codes/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCodeResponse {
    pub id: i64,
    pub deleted: bool,
}
