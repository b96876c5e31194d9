use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Channel;

/// Lookup access to payment-channel rows.
pub struct ChannelRepository {
    pool: PgPool,
}

impl ChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, channel_id: Uuid) -> Result<Option<Channel>> {
        let row = sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, plugin_name, app_id, app_mch_id, app_key, app_secret, config
            FROM channels
            WHERE id = $1
            "#,
        )
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }
}
