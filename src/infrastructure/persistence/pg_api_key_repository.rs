//! PostgreSQL implementation of the API key repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ApiKey, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;

const KEY_COLUMNS: &str = "id, key_hash, name, rate_limit, is_active, created_at, last_used_at";

/// PostgreSQL repository for the `api_keys` table.
///
/// Stores SHA-256 hashes only. Raw keys are never persisted.
pub struct PgApiKeyRepository {
    pool: Arc<PgPool>,
}

impl PgApiKeyRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        let sql = format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE key_hash = $1 AND is_active");

        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(key_hash)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(key)
    }

    async fn update_last_used(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        let sql = format!(
            "INSERT INTO api_keys (id, key_hash, name, rate_limit) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {KEY_COLUMNS}"
        );

        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_key.key_hash)
            .bind(&new_key.name)
            .bind(new_key.rate_limit)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(key)
    }

    async fn list(&self) -> Result<Vec<ApiKey>, AppError> {
        let sql = format!("SELECT {KEY_COLUMNS} FROM api_keys ORDER BY created_at DESC");

        let keys = sqlx::query_as::<_, ApiKey>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(keys)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiKey>, AppError> {
        let sql = format!("SELECT {KEY_COLUMNS} FROM api_keys WHERE id = $1");

        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(key)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError> {
        let sql = format!(
            "SELECT {KEY_COLUMNS} FROM api_keys WHERE name = $1 ORDER BY created_at DESC LIMIT 1"
        );

        let key = sqlx::query_as::<_, ApiKey>(&sql)
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(key)
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
