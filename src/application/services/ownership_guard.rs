//! Ownership precondition for owner-facing code operations.

use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::Code;
use crate::domain::repositories::CodeRepository;
use crate::error::AppError;

/// Result of an ownership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Allowed(Code),
    Denied,
}

/// Confirms that the acting owner owns a code before it is read or mutated.
///
/// Absence and foreign ownership both come back as [`Authorization::Denied`],
/// and [`OwnershipGuard::require`] turns either into the same `NotFound`.
pub struct OwnershipGuard<C: CodeRepository> {
    repository: Arc<C>,
}

impl<C: CodeRepository> OwnershipGuard<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    pub async fn authorize(&self, owner_id: i64, code_id: i64) -> Result<Authorization, AppError> {
        let code = self.repository.find_owned(owner_id, code_id).await?;

        Ok(match code {
            Some(code) if code.is_owned_by(owner_id) => Authorization::Allowed(code),
            _ => Authorization::Denied,
        })
    }

    /// Like [`Self::authorize`], but denial becomes [`AppError::NotFound`].
    pub async fn require(&self, owner_id: i64, code_id: i64) -> Result<Code, AppError> {
        match self.authorize(owner_id, code_id).await? {
            Authorization::Allowed(code) => Ok(code),
            Authorization::Denied => Err(code_not_found(code_id)),
        }
    }
}

/// The one error shape for "absent" and "owned by someone else".
pub fn code_not_found(code_id: i64) -> AppError {
    AppError::not_found("Code not found", json!({ "id": code_id }))
}
