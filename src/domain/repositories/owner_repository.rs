//! Repository trait for owners.

use crate::domain::entities::Owner;
use crate::error::AppError;
use async_trait::async_trait;

/// Owner storage used by the authentication collaborator and the admin CLI.
///
/// Credentials are never passed in clear text: callers hand in the HMAC digest
/// computed by [`crate::application::services::AuthService`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    /// Registers a new owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the handle is already taken.
    async fn create(&self, handle: &str, credential_hash: &str) -> Result<Owner, AppError>;

    /// Finds the owner whose credential digest matches.
    async fn find_by_credential(&self, credential_hash: &str) -> Result<Option<Owner>, AppError>;

    /// Finds an owner by login handle.
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Owner>, AppError>;

    /// Lists all owners, oldest first.
    async fn list(&self) -> Result<Vec<Owner>, AppError>;
}
