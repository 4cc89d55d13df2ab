//! Storage for rendered visual-code artifacts.

use crate::error::AppError;
use async_trait::async_trait;

/// Renders and stores the scannable image for a redirect token.
///
/// The returned asset reference is an opaque handle (a file name for the
/// filesystem implementation) persisted on the code record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Renders the artifact for `token` and stores it.
    ///
    /// Never overwrites an existing artifact.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TokenCollision`] if an artifact for `token` already exists.
    /// Returns [`AppError::Internal`] if rendering or writing fails.
    async fn render(&self, token: &str) -> Result<String, AppError>;

    /// Removes a stored artifact. Removing a missing artifact is not an error.
    async fn remove(&self, asset_reference: &str) -> Result<(), AppError>;

    /// Returns true if the artifact is present.
    async fn exists(&self, asset_reference: &str) -> bool;
}
