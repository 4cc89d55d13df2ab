//! Owner-facing code management: batch minting, listing, renaming, deletion.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use crate::application::services::ownership_guard::{OwnershipGuard, code_not_found};
use crate::domain::entities::{Code, NewCode, NewCodeBatch};
use crate::domain::repositories::{AssetStore, CodeRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::target_url::validate_target_url;
use crate::utils::token_minter::TokenMinter;

/// Whole-batch attempts before a run of token collisions is reported as
/// [`AppError::StorageUnavailable`].
pub const MAX_MINT_ATTEMPTS: usize = 10;

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Service for the code lifecycle of one owner at a time.
///
/// Every method takes the acting `owner_id` explicitly; there is no ambient
/// notion of a current owner.
///
/// # Batch creation
///
/// Tokens are minted, their QR images rendered, and the records inserted in a
/// single transaction. If any step fails the images rendered by that attempt
/// are removed and nothing becomes visible. Token collisions (reported by the
/// asset store or by the unique constraint) restart the whole batch with fresh
/// tokens, up to [`MAX_MINT_ATTEMPTS`] times.
///
/// # Deletion
///
/// The record is deleted first; its image is then removed best-effort. A
/// failed image removal is logged and leaves an unreferenced file, never a
/// visible record without an image.
pub struct CodeService<C: CodeRepository, A: AssetStore> {
    repository: Arc<C>,
    assets: Arc<A>,
    minter: Arc<dyn TokenMinter>,
    cache: Arc<dyn CacheService>,
    guard: OwnershipGuard<C>,
    max_batch_size: u32,
}

impl<C: CodeRepository, A: AssetStore> CodeService<C, A> {
    pub fn new(
        repository: Arc<C>,
        assets: Arc<A>,
        minter: Arc<dyn TokenMinter>,
        cache: Arc<dyn CacheService>,
        max_batch_size: u32,
    ) -> Self {
        Self {
            guard: OwnershipGuard::new(repository.clone()),
            repository,
            assets,
            minter,
            cache,
            max_batch_size,
        }
    }

    pub fn max_batch_size(&self) -> u32 {
        self.max_batch_size
    }

    /// Verifies the code store is reachable. Used by the health check.
    pub async fn check_storage(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Creates `count` codes redirecting to `target_url`, all owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `count` is outside `1..=max_batch_size`
    /// or `target_url` is not an absolute HTTP(S) URL. Nothing is stored in that case.
    ///
    /// Returns [`AppError::StorageUnavailable`] if every attempt collided, or if
    /// the database cannot be reached.
    pub async fn create_batch(
        &self,
        owner_id: i64,
        target_url: &str,
        count: i64,
    ) -> Result<Vec<Code>, AppError> {
        if count < 1 || count > i64::from(self.max_batch_size) {
            return Err(AppError::bad_request(
                format!("count must be between 1 and {}", self.max_batch_size),
                json!({ "count": count, "max": self.max_batch_size }),
            ));
        }

        validate_target_url(target_url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "target_url": target_url }))
        })?;

        let count = count as usize;

        for attempt in 1..=MAX_MINT_ATTEMPTS {
            match self.try_create_batch(owner_id, target_url, count).await {
                Ok(codes) => {
                    tracing::info!(owner_id, count, attempt, "Code batch created");
                    return Ok(codes);
                }
                Err(AppError::TokenCollision { .. }) => {
                    tracing::warn!(owner_id, count, attempt, "Token collision, re-minting batch");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::storage_unavailable(
            "Could not allocate unique redirect tokens",
            json!({ "attempts": MAX_MINT_ATTEMPTS }),
        ))
    }

    /// One all-or-nothing attempt.
    async fn try_create_batch(
        &self,
        owner_id: i64,
        target_url: &str,
        count: usize,
    ) -> Result<Vec<Code>, AppError> {
        let tokens = self.mint_distinct(count)?;
        let mut rendered: Vec<NewCode> = Vec::with_capacity(count);

        for redirect_token in tokens {
            match self.assets.render(&redirect_token).await {
                Ok(asset_reference) => rendered.push(NewCode {
                    redirect_token,
                    asset_reference,
                }),
                Err(e) => {
                    self.discard_assets(&rendered).await;
                    return Err(e);
                }
            }
        }

        let batch = NewCodeBatch {
            owner_id,
            target_url: target_url.to_string(),
            codes: rendered.clone(),
        };

        match self.repository.create_batch(batch).await {
            Ok(codes) => Ok(codes),
            Err(e) => {
                self.discard_assets(&rendered).await;
                Err(e)
            }
        }
    }

    /// Mints `count` tokens that are distinct from each other.
    ///
    /// A minter that keeps repeating itself is treated like a store collision.
    fn mint_distinct(&self, count: usize) -> Result<Vec<String>, AppError> {
        let mut seen = HashSet::with_capacity(count);
        let mut tokens = Vec::with_capacity(count);

        for _ in 0..count * MAX_MINT_ATTEMPTS {
            if tokens.len() == count {
                break;
            }

            let token = self.minter.mint();
            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        }

        if tokens.len() < count {
            return Err(AppError::token_collision(
                "Minted duplicate tokens within one batch",
                json!({ "requested": count, "distinct": tokens.len() }),
            ));
        }

        Ok(tokens)
    }

    async fn discard_assets(&self, codes: &[NewCode]) {
        for code in codes {
            if let Err(e) = self.assets.remove(&code.asset_reference).await {
                tracing::warn!(
                    asset = %code.asset_reference,
                    error = %e,
                    "Failed to remove QR image of aborted batch"
                );
            }
        }
    }

    /// Lists the owner's codes, ordered by id.
    pub async fn list(&self, owner_id: i64) -> Result<Vec<Code>, AppError> {
        self.repository.list_by_owner(owner_id).await
    }

    /// Sets or clears the display name of an owned code.
    ///
    /// Blank names clear the label.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is longer than
    /// [`MAX_DISPLAY_NAME_LENGTH`] characters.
    /// Returns [`AppError::NotFound`] if the code is absent or owned by someone else.
    pub async fn rename(
        &self,
        owner_id: i64,
        code_id: i64,
        display_name: Option<String>,
    ) -> Result<Code, AppError> {
        let display_name = normalize_display_name(display_name)?;

        self.guard.require(owner_id, code_id).await?;

        let code = self
            .repository
            .rename(owner_id, code_id, display_name)
            .await?
            .ok_or_else(|| code_not_found(code_id))?;

        tracing::info!(owner_id, code_id, "Code renamed");

        Ok(code)
    }

    /// Deletes an owned code, then its QR image, then its cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is absent or owned by someone else.
    pub async fn delete(&self, owner_id: i64, code_id: i64) -> Result<Code, AppError> {
        self.guard.require(owner_id, code_id).await?;

        let code = self
            .repository
            .delete(owner_id, code_id)
            .await?
            .ok_or_else(|| code_not_found(code_id))?;

        if let Err(e) = self.assets.remove(&code.asset_reference).await {
            tracing::warn!(
                code_id,
                asset = %code.asset_reference,
                error = %e,
                "Code deleted but its QR image could not be removed"
            );
        }

        if let Err(e) = self.cache.invalidate(&code.redirect_token).await {
            tracing::warn!(code_id, error = %e, "Failed to invalidate cached code");
        }

        tracing::info!(owner_id, code_id, "Code deleted");

        Ok(code)
    }
}

fn normalize_display_name(display_name: Option<String>) -> Result<Option<String>, AppError> {
    let Some(name) = display_name else {
        return Ok(None);
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AppError::bad_request(
            format!("display_name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"),
            json!({ "max": MAX_DISPLAY_NAME_LENGTH }),
        ));
    }

    Ok(Some(trimmed.to_string()))
}
