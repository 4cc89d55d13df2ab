//! PostgreSQL implementation of the owner repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::Owner;
use crate::domain::repositories::OwnerRepository;
use crate::error::AppError;

/// PostgreSQL repository for owners.
///
/// Stores HMAC digests of credentials only. Raw credentials are never persisted.
pub struct PgOwnerRepository {
    pool: Arc<PgPool>,
}

impl PgOwnerRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn create(&self, handle: &str, credential_hash: &str) -> Result<Owner, AppError> {
        sqlx::query_as::<_, Owner>(
            r#"
            INSERT INTO owners (handle, credential_hash)
            VALUES ($1, $2)
            RETURNING id, handle, credential_hash, created_at
            "#,
        )
        .bind(handle)
        .bind(credential_hash)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());

            if duplicate {
                AppError::bad_request("Handle already taken", json!({ "handle": handle }))
            } else {
                AppError::from(e)
            }
        })
    }

    async fn find_by_credential(&self, credential_hash: &str) -> Result<Option<Owner>, AppError> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, handle, credential_hash, created_at
            FROM owners
            WHERE credential_hash = $1
            "#,
        )
        .bind(credential_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(owner)
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<Owner>, AppError> {
        let owner = sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, handle, credential_hash, created_at
            FROM owners
            WHERE handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(owner)
    }

    async fn list(&self) -> Result<Vec<Owner>, AppError> {
        let owners = sqlx::query_as::<_, Owner>(
            r#"
            SELECT id, handle, credential_hash, created_at
            FROM owners
            ORDER BY id
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(owners)
    }
}
