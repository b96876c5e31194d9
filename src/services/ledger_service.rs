use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{round_money, BalanceLog, MovementType};
use crate::repositories::{BalanceLogRepository, MerchantRepository};

/// The ledger store: the single path through which a merchant balance is
/// mutated. Every committed mutation writes the balance row and appends one
/// audit-log entry atomically; nothing else touches the balance column.
pub struct LedgerService {
    pool: PgPool,
    log_repo: BalanceLogRepository,
}

impl LedgerService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            log_repo: BalanceLogRepository::new(pool.clone()),
            pool,
        }
    }

    /// Applies a signed delta to the merchant balance.
    ///
    /// Must run on a connection inside an open transaction: takes the
    /// merchant row lock, reads the current balance, rounds the delta to
    /// 2 decimals (half up) and derives the new balance from it so the
    /// logged entry always satisfies `after = before + amount`, rejects
    /// debits that would go below zero, writes the balance and appends the
    /// log entry. The caller's commit makes both visible together; its
    /// rollback discards both.
    pub async fn apply_delta(
        conn: &mut PgConnection,
        merchant_id: Uuid,
        delta: Decimal,
        movement_type: MovementType,
        related_no: &str,
        remark: &str,
    ) -> Result<BalanceLog> {
        let merchant = MerchantRepository::find_for_update(conn, merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant '{}' not found", merchant_id)))?;

        let delta = round_money(delta);
        let before = merchant.balance;
        let after = before + delta;

        if after < Decimal::ZERO {
            return Err(AppError::InsufficientBalance(format!(
                "balance {} cannot absorb delta {}",
                before, delta
            )));
        }

        MerchantRepository::update_balance(conn, merchant_id, after).await?;

        let entry = BalanceLogRepository::append(
            conn,
            merchant_id,
            movement_type,
            delta,
            before,
            after,
            related_no,
            remark,
        )
        .await?;

        tracing::debug!(
            merchant_id = %merchant_id,
            ?movement_type,
            %delta,
            %before,
            %after,
            related_no,
            "balance delta applied"
        );

        Ok(entry)
    }

    /// Entries for a merchant in append order.
    pub async fn entries(
        &self,
        merchant_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BalanceLog>> {
        self.log_repo.find_by_merchant(merchant_id, limit, offset).await
    }

    pub async fn count_entries(&self, merchant_id: Uuid) -> Result<i64> {
        self.log_repo.count_by_merchant(merchant_id).await
    }

    /// Sum of all committed deltas for a merchant. The ledger invariant is
    /// `current_balance == opening_balance + sum_deltas`.
    pub async fn sum_deltas(&self, merchant_id: Uuid) -> Result<Decimal> {
        self.log_repo.sum_deltas(merchant_id).await
    }

    /// Verifies the per-merchant chain: every entry's arithmetic holds and
    /// each entry's after_balance equals the next entry's before_balance.
    pub async fn verify_chain(&self, merchant_id: Uuid) -> Result<bool> {
        let count = self.log_repo.count_by_merchant(merchant_id).await?;
        let entries = self.log_repo.find_by_merchant(merchant_id, count.max(1), 0).await?;

        let arithmetic_holds = entries.iter().all(BalanceLog::is_consistent);
        let chain_holds = entries
            .windows(2)
            .all(|pair| pair[0].after_balance == pair[1].before_balance);
        let current = MerchantRepository::new(self.pool.clone())
            .find_by_id(merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant '{}' not found", merchant_id)))?
            .balance;
        let tail_matches = entries
            .last()
            .map(|last| last.after_balance == current)
            .unwrap_or(true);

        Ok(arithmetic_holds && chain_holds && tail_matches)
    }
}
