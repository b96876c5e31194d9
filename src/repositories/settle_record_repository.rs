use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{SettleRecord, SettleStatus, SettlementAccount, TerminatedBy};

const COLUMNS: &str = r#"id, settle_no, merchant_id, settle_type, amount, fee, real_amount,
        account_name, account_no, bank_name, bank_branch, crypto_network, crypto_address,
        status, terminated_by, remark, processed_by, created_at, processed_at"#;

/// Structured listing criteria for settlement records. Optional fields are
/// translated into SQL by a query builder; no string-assembled filters.
#[derive(Debug, Clone, Default)]
pub struct SettleRecordQuery {
    pub merchant_id: Option<Uuid>,
    pub status: Option<SettleStatus>,
    pub settle_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository for settlement (withdrawal) records.
pub struct SettleRecordRepository {
    pool: PgPool,
}

impl SettleRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new pending record, snapshotting the destination account
    /// fields. Runs inside the apply transaction.
    pub async fn insert_pending(
        conn: &mut PgConnection,
        settle_no: &str,
        merchant_id: Uuid,
        account: &SettlementAccount,
        amount: Decimal,
        fee: Decimal,
        real_amount: Decimal,
    ) -> Result<SettleRecord> {
        let row = sqlx::query_as::<_, SettleRecord>(&format!(
            r#"
            INSERT INTO settle_records
                (settle_no, merchant_id, settle_type, amount, fee, real_amount,
                 account_name, account_no, bank_name, bank_branch, crypto_network, crypto_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(settle_no)
        .bind(merchant_id)
        .bind(&account.settle_type)
        .bind(amount)
        .bind(fee)
        .bind(real_amount)
        .bind(&account.account_name)
        .bind(&account.account_no)
        .bind(&account.bank_name)
        .bind(&account.bank_branch)
        .bind(&account.crypto_network)
        .bind(&account.crypto_address)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn find_by_id(&self, record_id: Uuid) -> Result<Option<SettleRecord>> {
        let row = sqlx::query_as::<_, SettleRecord>(&format!(
            "SELECT {COLUMNS} FROM settle_records WHERE id = $1"
        ))
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Re-reads a record under an exclusive lock. This is the authoritative
    /// state check before any transition; an earlier unlocked read is only a
    /// fast-reject optimization.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        record_id: Uuid,
    ) -> Result<Option<SettleRecord>> {
        let row = sqlx::query_as::<_, SettleRecord>(&format!(
            "SELECT {COLUMNS} FROM settle_records WHERE id = $1 FOR UPDATE"
        ))
        .bind(record_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Marks a record's terminal state. Caller must hold the record lock and
    /// have verified the record is still pending.
    pub async fn update_state(
        conn: &mut PgConnection,
        record_id: Uuid,
        status: SettleStatus,
        terminated_by: Option<TerminatedBy>,
        remark: &str,
        processed_by: Option<Uuid>,
        processed_at: DateTime<Utc>,
    ) -> Result<SettleRecord> {
        let row = sqlx::query_as::<_, SettleRecord>(&format!(
            r#"
            UPDATE settle_records
            SET status = $2, terminated_by = $3, remark = $4, processed_by = $5, processed_at = $6
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(record_id)
        .bind(status)
        .bind(terminated_by)
        .bind(remark)
        .bind(processed_by)
        .bind(processed_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Total amount reserved in still-pending records for a merchant.
    pub async fn pending_total(&self, merchant_id: Uuid) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM settle_records
            WHERE merchant_id = $1 AND status = 'pending'
            "#,
        )
        .bind(merchant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(total)
    }

    /// Count and total amount of all pending records (admin dashboard).
    pub async fn pending_stats(&self) -> Result<(i64, Decimal)> {
        let stats: (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(amount), 0)
            FROM settle_records
            WHERE status = 'pending'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(stats)
    }

    pub async fn search(&self, query: &SettleRecordQuery) -> Result<Vec<SettleRecord>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM settle_records WHERE 1 = 1"));
        Self::push_filters(&mut builder, query);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        let rows = builder
            .build_query_as::<SettleRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(rows)
    }

    pub async fn count(&self, query: &SettleRecordQuery) -> Result<i64> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM settle_records WHERE 1 = 1");
        Self::push_filters(&mut builder, query);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(count)
    }

    fn push_filters(builder: &mut QueryBuilder<Postgres>, query: &SettleRecordQuery) {
        if let Some(merchant_id) = query.merchant_id {
            builder.push(" AND merchant_id = ");
            builder.push_bind(merchant_id);
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        if let Some(settle_type) = &query.settle_type {
            builder.push(" AND settle_type = ");
            builder.push_bind(settle_type.clone());
        }
    }
}
