use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Order;

const COLUMNS: &str = r#"id, trade_no, merchant_id, money, fee_money, real_money, api_trade_no,
        channel_id, status, refund_status, refund_no, refund_money, refund_reason,
        paid_at, refund_at, created_at"#;

/// Read/patch access to orders. Orders are owned by the payment pipeline;
/// this core only consumes refund-eligibility fields and writes back the
/// refund columns.
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_trade_no(
        &self,
        merchant_id: Uuid,
        trade_no: &str,
    ) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE trade_no = $1 AND merchant_id = $2"
        ))
        .bind(trade_no)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Net income (real_money - fee_money) from orders paid at or after
    /// `since`. This is the frozen amount under a same-day/next-day cycle.
    pub async fn frozen_income_since<'e>(
        executor: impl PgExecutor<'e>,
        merchant_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Decimal> {
        let frozen: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(real_money - fee_money), 0)
            FROM orders
            WHERE merchant_id = $1 AND status = 1 AND paid_at >= $2
            "#,
        )
        .bind(merchant_id)
        .bind(since)
        .fetch_one(executor)
        .await
        .map_err(AppError::Database)?;

        Ok(frozen)
    }

    /// Patches the refund columns after a committed upstream refund. Runs
    /// inside the transaction that debits the clawback.
    pub async fn apply_refund(
        conn: &mut PgConnection,
        order_id: Uuid,
        refund_no: &str,
        new_refund_money: Decimal,
        reason: &str,
    ) -> Result<Order> {
        let row = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET status = 2,
                refund_status = 1,
                refund_no = $2,
                refund_money = $3,
                refund_reason = $4,
                refund_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(refund_no)
        .bind(new_refund_money)
        .bind(reason)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }
}
