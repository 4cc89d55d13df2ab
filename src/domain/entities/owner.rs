//! Owner entity.

use chrono::{DateTime, Utc};

/// An authenticated identity that creates and manages codes.
///
/// The credential is stored only as an HMAC digest and is opaque to the
/// redirect/tracking core.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Owner {
    pub id: i64,
    pub handle: String,
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
}
