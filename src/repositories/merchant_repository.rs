use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::MerchantAccount;

/// Repository for merchant accounts. The balance column is only ever written
/// through `update_balance`, inside a transaction that first took the row
/// lock via `find_for_update`.
pub struct MerchantRepository {
    pool: PgPool,
}

impl MerchantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, merchant_id: Uuid) -> Result<Option<MerchantAccount>> {
        let row = sqlx::query_as::<_, MerchantAccount>(
            r#"
            SELECT id, name, api_key, balance, created_at
            FROM merchants
            WHERE id = $1
            "#,
        )
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Reads the merchant row under an exclusive lock. Concurrent callers for
    /// the same merchant serialize here until the owning transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        merchant_id: Uuid,
    ) -> Result<Option<MerchantAccount>> {
        let row = sqlx::query_as::<_, MerchantAccount>(
            r#"
            SELECT id, name, api_key, balance, created_at
            FROM merchants
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(merchant_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Writes a new balance. Caller must hold the row lock.
    pub async fn update_balance(
        conn: &mut PgConnection,
        merchant_id: Uuid,
        new_balance: Decimal,
    ) -> Result<()> {
        sqlx::query("UPDATE merchants SET balance = $2 WHERE id = $1")
            .bind(merchant_id)
            .bind(new_balance)
            .execute(&mut *conn)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }
}
