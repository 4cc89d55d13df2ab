//! PostgreSQL implementation of the code repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Code, NewCodeBatch};
use crate::domain::repositories::CodeRepository;
use crate::error::AppError;

/// PostgreSQL repository for code records.
///
/// Ownership filters live in the SQL itself (`AND owner_id = $n`), so the check
/// and the mutation are one statement. The scan counter is incremented in place
/// by the database; concurrent increments on one row serialize on its row lock
/// while different rows never contend.
pub struct PgCodeRepository {
    pool: Arc<PgPool>,
}

impl PgCodeRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeRepository for PgCodeRepository {
    async fn create_batch(&self, batch: NewCodeBatch) -> Result<Vec<Code>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(batch.len());

        for new_code in &batch.codes {
            let code = sqlx::query_as::<_, Code>(
                r#"
                INSERT INTO codes (owner_id, target_url, redirect_token, asset_reference)
                VALUES ($1, $2, $3, $4)
                RETURNING id, owner_id, target_url, redirect_token, asset_reference,
                          scan_count, display_name, created_at
                "#,
            )
            .bind(batch.owner_id)
            .bind(&batch.target_url)
            .bind(&new_code.redirect_token)
            .bind(&new_code.asset_reference)
            .fetch_one(&mut *tx)
            .await?;

            created.push(code);
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Code>, AppError> {
        let codes = sqlx::query_as::<_, Code>(
            r#"
            SELECT id, owner_id, target_url, redirect_token, asset_reference,
                   scan_count, display_name, created_at
            FROM codes
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(codes)
    }

    async fn find_owned(&self, owner_id: i64, code_id: i64) -> Result<Option<Code>, AppError> {
        let code = sqlx::query_as::<_, Code>(
            r#"
            SELECT id, owner_id, target_url, redirect_token, asset_reference,
                   scan_count, display_name, created_at
            FROM codes
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(code_id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(code)
    }

    async fn rename(
        &self,
        owner_id: i64,
        code_id: i64,
        display_name: Option<String>,
    ) -> Result<Option<Code>, AppError> {
        let code = sqlx::query_as::<_, Code>(
            r#"
            UPDATE codes
            SET display_name = $3
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, target_url, redirect_token, asset_reference,
                      scan_count, display_name, created_at
            "#,
        )
        .bind(code_id)
        .bind(owner_id)
        .bind(display_name)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(code)
    }

    async fn delete(&self, owner_id: i64, code_id: i64) -> Result<Option<Code>, AppError> {
        let code = sqlx::query_as::<_, Code>(
            r#"
            DELETE FROM codes
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, target_url, redirect_token, asset_reference,
                      scan_count, display_name, created_at
            "#,
        )
        .bind(code_id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(code)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Code>, AppError> {
        let code = sqlx::query_as::<_, Code>(
            r#"
            SELECT id, owner_id, target_url, redirect_token, asset_reference,
                   scan_count, display_name, created_at
            FROM codes
            WHERE redirect_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(code)
    }

    async fn increment_scan(&self, code_id: i64) -> Result<Option<i64>, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE codes
            SET scan_count = scan_count + 1
            WHERE id = $1
            RETURNING scan_count
            "#,
        )
        .bind(code_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
