use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::models::SettlementOptions;

/// Access to the single-row settlement fee/cycle configuration. Falls back to
/// defaults when the row has never been configured.
pub struct SettlementOptionsRepository {
    pool: PgPool,
}

impl SettlementOptionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<SettlementOptions> {
        let row = sqlx::query_as::<_, SettlementOptions>(
            r#"
            SELECT settle_rate, settle_fee_min, settle_fee_max, min_settle_amount, settle_cycle
            FROM settlement_options
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row.unwrap_or_default())
    }
}
