//! Repository trait for code records.

use crate::domain::entities::{Code, NewCodeBatch};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage for codes.
///
/// Every owner-facing method takes the acting `owner_id` and only ever matches
/// rows owned by it. [`Self::find_by_token`] and [`Self::increment_scan`] are
/// unscoped and reserved for scan resolution.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgCodeRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Inserts every record of the batch in a single transaction.
    ///
    /// Either all records become visible or none do.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TokenCollision`] if any token is already taken (the
    /// whole batch is rolled back).
    /// Returns [`AppError::StorageUnavailable`] / [`AppError::Internal`] on database errors.
    async fn create_batch(&self, batch: NewCodeBatch) -> Result<Vec<Code>, AppError>;

    /// Lists the codes of one owner, ordered by id.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Code>, AppError>;

    /// Finds a code by id, but only if it is owned by `owner_id`.
    async fn find_owned(&self, owner_id: i64, code_id: i64) -> Result<Option<Code>, AppError>;

    /// Sets the display name of an owned code.
    ///
    /// Returns `Ok(None)` if no code with `code_id` is owned by `owner_id`.
    async fn rename(
        &self,
        owner_id: i64,
        code_id: i64,
        display_name: Option<String>,
    ) -> Result<Option<Code>, AppError>;

    /// Deletes an owned code and returns the removed record.
    ///
    /// Returns `Ok(None)` if no code with `code_id` is owned by `owner_id`.
    async fn delete(&self, owner_id: i64, code_id: i64) -> Result<Option<Code>, AppError>;

    /// Looks up a code by its public redirect token. No ownership filter.
    async fn find_by_token(&self, token: &str) -> Result<Option<Code>, AppError>;

    /// Atomically increments the scan counter and returns the new value.
    ///
    /// Implementations must perform the increment inside the store (no
    /// read-modify-write in process memory). Returns `Ok(None)` if the code no
    /// longer exists.
    async fn increment_scan(&self, code_id: i64) -> Result<Option<i64>, AppError>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
