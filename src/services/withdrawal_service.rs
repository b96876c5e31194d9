use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::NotifySettings;
use crate::error::{AppError, Result};
use crate::models::settle_record::generate_settle_no;
use crate::models::{
    round_money, MovementType, SettleRecord, SettleState, SettlementAccount, SettlementOptions,
};
use crate::notify::{sign_params, Notifier};
use crate::repositories::{
    MerchantRepository, OrderRepository, SettleRecordQuery, SettleRecordRepository,
    SettlementAccountRepository, SettlementOptionsRepository,
};
use crate::services::{LedgerService, MovementStateMachine};

/// Snapshot returned by `withdrawable_info`.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawableInfo {
    pub balance: Decimal,
    pub frozen_amount: Decimal,
    pub available_balance: Decimal,
    pub pending_amount: Decimal,
    pub options: SettlementOptions,
    pub accounts: Vec<SettlementAccount>,
}

/// Per-id outcome counts for a batch approval.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BatchApproveResult {
    pub succeeded: u32,
    pub failed: u32,
}

/// The withdrawal engine: computes withdrawable amounts and drives the
/// settlement-request lifecycle (apply, cancel, approve, reject).
///
/// Funds are reserved on apply: the requested amount leaves the merchant
/// balance when the pending record is created and comes back only on
/// cancellation or rejection. Approval takes no ledger action.
pub struct WithdrawalService {
    pool: PgPool,
    merchant_repo: MerchantRepository,
    settle_repo: SettleRecordRepository,
    account_repo: SettlementAccountRepository,
    options_repo: SettlementOptionsRepository,
    notifier: Option<Arc<dyn Notifier>>,
    notify_settings: NotifySettings,
}

impl WithdrawalService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            merchant_repo: MerchantRepository::new(pool.clone()),
            settle_repo: SettleRecordRepository::new(pool.clone()),
            account_repo: SettlementAccountRepository::new(pool.clone()),
            options_repo: SettlementOptionsRepository::new(pool.clone()),
            notifier: None,
            notify_settings: NotifySettings::default(),
            pool,
        }
    }

    /// Attaches the best-effort admin notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, settings: NotifySettings) -> Self {
        self.notifier = Some(notifier);
        self.notify_settings = settings;
        self
    }

    /// Current balance, frozen amount, available balance, pending-withdrawal
    /// total and fee parameters for a merchant.
    ///
    /// Under a same-day or next-day cycle, net income from orders paid since
    /// the start of the current day is frozen and excluded from the available
    /// balance; under a realtime cycle nothing is frozen. The pending total
    /// is informational only: pending amounts already left the balance at
    /// apply time.
    pub async fn withdrawable_info(&self, merchant_id: Uuid) -> Result<WithdrawableInfo> {
        let merchant = self
            .merchant_repo
            .find_by_id(merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant '{}' not found", merchant_id)))?;

        let options = self.options_repo.get().await?;

        let frozen_amount = if options.settle_cycle.freezes_current_day() {
            OrderRepository::frozen_income_since(&self.pool, merchant_id, start_of_today()).await?
        } else {
            Decimal::ZERO
        };

        let available_balance = (merchant.balance - frozen_amount).max(Decimal::ZERO);
        let pending_amount = self.settle_repo.pending_total(merchant_id).await?;
        let accounts = self.account_repo.list_by_merchant(merchant_id).await?;

        Ok(WithdrawableInfo {
            balance: merchant.balance,
            frozen_amount,
            available_balance,
            pending_amount,
            options,
            accounts,
        })
    }

    /// Applies for a withdrawal, reserving funds immediately.
    ///
    /// The unlocked pre-checks are a fast-reject optimization; the check
    /// performed after taking the merchant row lock is authoritative and
    /// defends against a concurrent apply that passed the same pre-check.
    pub async fn apply(
        &self,
        merchant_id: Uuid,
        amount: Decimal,
        settlement_account_id: Uuid,
    ) -> Result<SettleRecord> {
        let amount = round_money(amount);
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("withdrawal amount must be positive".to_string()));
        }

        let account = self
            .account_repo
            .find_owned(settlement_account_id, merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("settlement account not found".to_string()))?;

        let options = self.options_repo.get().await?;
        if amount < options.min_settle_amount {
            return Err(AppError::Validation(format!(
                "minimum withdrawal amount is {:.2}",
                options.min_settle_amount
            )));
        }

        let merchant = self
            .merchant_repo
            .find_by_id(merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant '{}' not found", merchant_id)))?;

        // Fast reject before paying for a transaction.
        let frozen = if options.settle_cycle.freezes_current_day() {
            OrderRepository::frozen_income_since(&self.pool, merchant_id, start_of_today()).await?
        } else {
            Decimal::ZERO
        };
        if amount > merchant.balance - frozen {
            return Err(AppError::InsufficientBalance(format!(
                "available balance {:.2} is less than requested {:.2}",
                (merchant.balance - frozen).max(Decimal::ZERO),
                amount
            )));
        }

        let fee = options.compute_fee(amount);
        let real_amount = round_money(amount - fee);
        let settle_no = generate_settle_no();

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Authoritative re-check under the row lock.
        let locked = MerchantRepository::find_for_update(&mut tx, merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant '{}' not found", merchant_id)))?;

        let frozen_locked = if options.settle_cycle.freezes_current_day() {
            OrderRepository::frozen_income_since(&mut *tx, merchant_id, start_of_today()).await?
        } else {
            Decimal::ZERO
        };

        if amount > locked.balance - frozen_locked {
            return Err(AppError::InsufficientBalance(format!(
                "available balance {:.2} is less than requested {:.2}",
                (locked.balance - frozen_locked).max(Decimal::ZERO),
                amount
            )));
        }

        LedgerService::apply_delta(
            &mut tx,
            merchant_id,
            -amount,
            MovementType::Withdraw,
            &settle_no,
            "withdrawal applied",
        )
        .await?;

        let record = SettleRecordRepository::insert_pending(
            &mut tx,
            &settle_no,
            merchant_id,
            &account,
            amount,
            fee,
            real_amount,
        )
        .await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            merchant_id = %merchant_id,
            settle_no = %record.settle_no,
            %amount,
            %fee,
            "withdrawal applied"
        );

        // Fire-and-forget: a failed notification never rolls back the
        // committed reservation.
        self.notify_pending(&record, &merchant.name).await;

        Ok(record)
    }

    /// Merchant-initiated cancellation of a still-pending record.
    pub async fn cancel(&self, merchant_id: Uuid, record_id: Uuid) -> Result<SettleRecord> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let record = SettleRecordRepository::find_for_update(&mut tx, record_id)
            .await?
            .filter(|r| r.merchant_id == merchant_id)
            .ok_or_else(|| AppError::NotFound("settlement record not found".to_string()))?;

        MovementStateMachine::transition(record.state(), SettleState::Cancelled)?;

        LedgerService::apply_delta(
            &mut tx,
            merchant_id,
            record.amount,
            MovementType::WithdrawCancel,
            &record.settle_no,
            "withdrawal cancelled",
        )
        .await?;

        let (status, terminated_by) = SettleState::Cancelled.columns();
        let updated = SettleRecordRepository::update_state(
            &mut tx,
            record_id,
            status,
            terminated_by,
            "cancelled by merchant",
            None,
            Utc::now(),
        )
        .await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(settle_no = %updated.settle_no, "withdrawal cancelled");
        Ok(updated)
    }

    /// Administrative approval. No balance change: the amount was reserved at
    /// apply time. The locked state re-check makes a second approval fail
    /// with `AlreadyProcessed` instead of double-processing.
    pub async fn approve(&self, record_id: Uuid, actor: Uuid, remark: &str) -> Result<SettleRecord> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let record = SettleRecordRepository::find_for_update(&mut tx, record_id)
            .await?
            .ok_or_else(|| AppError::NotFound("settlement record not found".to_string()))?;

        MovementStateMachine::transition(record.state(), SettleState::Approved)?;

        let remark = if remark.trim().is_empty() { "approved" } else { remark };
        let (status, terminated_by) = SettleState::Approved.columns();
        let updated = SettleRecordRepository::update_state(
            &mut tx,
            record_id,
            status,
            terminated_by,
            remark,
            Some(actor),
            Utc::now(),
        )
        .await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(settle_no = %updated.settle_no, %actor, "withdrawal approved");
        Ok(updated)
    }

    /// Administrative rejection. Requires a non-empty remark; credits the
    /// reserved amount back in the same transaction as the status update.
    pub async fn reject(&self, record_id: Uuid, actor: Uuid, remark: &str) -> Result<SettleRecord> {
        if remark.trim().is_empty() {
            return Err(AppError::Validation("a rejection reason is required".to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let record = SettleRecordRepository::find_for_update(&mut tx, record_id)
            .await?
            .ok_or_else(|| AppError::NotFound("settlement record not found".to_string()))?;

        MovementStateMachine::transition(record.state(), SettleState::Rejected)?;

        LedgerService::apply_delta(
            &mut tx,
            record.merchant_id,
            record.amount,
            MovementType::WithdrawReject,
            &record.settle_no,
            &format!("withdrawal rejected: {}", remark),
        )
        .await?;

        let (status, terminated_by) = SettleState::Rejected.columns();
        let updated = SettleRecordRepository::update_state(
            &mut tx,
            record_id,
            status,
            terminated_by,
            remark,
            Some(actor),
            Utc::now(),
        )
        .await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(settle_no = %updated.settle_no, %actor, "withdrawal rejected");
        Ok(updated)
    }

    /// Approves each id independently; one failure does not abort the rest.
    pub async fn batch_approve(&self, record_ids: &[Uuid], actor: Uuid) -> Result<BatchApproveResult> {
        if record_ids.is_empty() {
            return Err(AppError::Validation("no records selected".to_string()));
        }

        let mut result = BatchApproveResult { succeeded: 0, failed: 0 };

        for &record_id in record_ids {
            match self.approve(record_id, actor, "batch approved").await {
                Ok(_) => result.succeeded += 1,
                Err(err) => {
                    tracing::warn!(%record_id, %err, "batch approval skipped record");
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }

    pub async fn find_record(&self, record_id: Uuid) -> Result<Option<SettleRecord>> {
        self.settle_repo.find_by_id(record_id).await
    }

    /// Filtered, paginated record listing.
    pub async fn list_records(&self, query: &SettleRecordQuery) -> Result<(Vec<SettleRecord>, i64)> {
        let total = self.settle_repo.count(query).await?;
        let records = self.settle_repo.search(query).await?;
        Ok((records, total))
    }

    /// Count and total amount of pending requests across all merchants.
    pub async fn pending_stats(&self) -> Result<(i64, Decimal)> {
        self.settle_repo.pending_stats().await
    }

    async fn notify_pending(&self, record: &SettleRecord, merchant_name: &str) {
        let (Some(notifier), Some(url)) = (&self.notifier, &self.notify_settings.admin_url) else {
            return;
        };

        let mut params = vec![
            ("settle_no".to_string(), record.settle_no.clone()),
            ("merchant_id".to_string(), record.merchant_id.to_string()),
            ("merchant_name".to_string(), merchant_name.to_string()),
            ("amount".to_string(), format!("{:.2}", record.amount)),
            ("settle_type".to_string(), record.settle_type.clone()),
        ];
        if let Some(key) = &self.notify_settings.sign_key {
            let sign = sign_params(&params, key);
            params.push(("sign".to_string(), sign));
            params.push(("sign_type".to_string(), "SHA256".to_string()));
        }

        let timeout = Duration::from_secs(self.notify_settings.timeout_secs);
        match tokio::time::timeout(timeout, notifier.deliver(url, &params)).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(settle_no = %record.settle_no, "pending-withdrawal notification not acknowledged");
            }
            Err(_) => {
                tracing::warn!(settle_no = %record.settle_no, "pending-withdrawal notification timed out");
            }
        }
    }
}

/// Start of the current calendar day (UTC), the frozen-income boundary.
fn start_of_today() -> DateTime<Utc> {
    Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_today_is_midnight() {
        let start = start_of_today();
        assert_eq!(start.time(), NaiveTime::MIN);
        assert!(start <= Utc::now());
    }
}
