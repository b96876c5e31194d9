use sqlx::PgPool;

use crate::error::{AppError, Result};

/// Key/value feature-flag store.
pub struct SystemConfigRepository {
    pool: PgPool,
}

impl SystemConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM system_configs WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        Ok(value)
    }
}
