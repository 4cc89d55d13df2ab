//! Code entity representing one scannable redirect unit.

use chrono::{DateTime, Utc};

/// A minted redirect code with its live scan counter.
///
/// `redirect_token`, `target_url` and `owner_id` never change after creation.
/// Only `display_name` (by the owner) and `scan_count` (by scan resolution) are
/// mutable.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Code {
    pub id: i64,
    pub owner_id: i64,
    pub target_url: String,
    pub redirect_token: String,
    pub asset_reference: String,
    pub scan_count: i64,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Code {
    /// Returns true if `owner_id` owns this code.
    pub fn is_owned_by(&self, owner_id: i64) -> bool {
        self.owner_id == owner_id
    }
}

/// Per-record input for batch creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCode {
    pub redirect_token: String,
    pub asset_reference: String,
}

/// A batch of codes sharing one owner and one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCodeBatch {
    pub owner_id: i64,
    pub target_url: String,
    pub codes: Vec<NewCode>,
}

impl NewCodeBatch {
    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
