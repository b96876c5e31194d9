use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{BalanceLog, MovementType};

/// Repository for the append-only merchant balance audit log. Entries are
/// never updated or deleted.
pub struct BalanceLogRepository {
    pool: PgPool,
}

impl BalanceLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends one entry. Caller must be inside the transaction that holds
    /// the merchant row lock and has just written the matching balance.
    #[allow(clippy::too_many_arguments)]
    pub async fn append(
        conn: &mut PgConnection,
        merchant_id: Uuid,
        movement_type: MovementType,
        amount: Decimal,
        before_balance: Decimal,
        after_balance: Decimal,
        related_no: &str,
        remark: &str,
    ) -> Result<BalanceLog> {
        let row = sqlx::query_as::<_, BalanceLog>(
            r#"
            INSERT INTO merchant_balance_logs
                (merchant_id, movement_type, amount, before_balance, after_balance, related_no, remark)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, merchant_id, movement_type, amount, before_balance, after_balance, related_no, remark, created_at
            "#,
        )
        .bind(merchant_id)
        .bind(movement_type)
        .bind(amount)
        .bind(before_balance)
        .bind(after_balance)
        .bind(related_no)
        .bind(remark)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Entries for a merchant in append order (oldest first).
    pub async fn find_by_merchant(
        &self,
        merchant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BalanceLog>> {
        let rows = sqlx::query_as::<_, BalanceLog>(
            r#"
            SELECT id, merchant_id, movement_type, amount, before_balance, after_balance, related_no, remark, created_at
            FROM merchant_balance_logs
            WHERE merchant_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(merchant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    pub async fn count_by_merchant(&self, merchant_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM merchant_balance_logs WHERE merchant_id = $1",
        )
        .bind(merchant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(count)
    }

    /// Sum of all committed deltas for a merchant.
    pub async fn sum_deltas(&self, merchant_id: Uuid) -> Result<Decimal> {
        let sum: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM merchant_balance_logs WHERE merchant_id = $1",
        )
        .bind(merchant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(sum)
    }
}
