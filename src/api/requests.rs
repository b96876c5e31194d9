use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to apply for a withdrawal.
///
/// Authentication middleware lives outside this service; the caller identity
/// arrives as an explicit `merchant_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawApplyRequest {
    pub merchant_id: Uuid,
    pub amount: Decimal,
    pub settlement_account_id: Uuid,
}

impl WithdrawApplyRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("amount must be positive".to_string());
        }
        Ok(())
    }
}

/// Request to cancel a pending withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawCancelRequest {
    pub merchant_id: Uuid,
    pub record_id: Uuid,
}

/// Request to refund (part of) a paid order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub merchant_id: Uuid,
    pub trade_no: String,
    pub money: Decimal,
    pub reason: Option<String>,
}

impl RefundRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trade_no.trim().is_empty() {
            return Err("trade_no cannot be empty".to_string());
        }
        if self.money <= Decimal::ZERO {
            return Err("refund amount must be positive".to_string());
        }
        Ok(())
    }
}

/// Request for a refund-eligibility lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundQueryRequest {
    pub merchant_id: Uuid,
    pub trade_no: String,
}

impl RefundQueryRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.trade_no.trim().is_empty() {
            return Err("trade_no cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Admin approval of a single pending withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub record_id: Uuid,
    pub actor: Uuid,
    pub remark: Option<String>,
}

/// Admin rejection; the remark is mandatory and is shown to the merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    pub record_id: Uuid,
    pub actor: Uuid,
    pub remark: String,
}

impl RejectRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.remark.trim().is_empty() {
            return Err("a rejection reason is required".to_string());
        }
        Ok(())
    }
}

/// Admin approval of a set of pending withdrawals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchApproveRequest {
    pub record_ids: Vec<Uuid>,
    pub actor: Uuid,
}

impl BatchApproveRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.record_ids.is_empty() {
            return Err("record_ids cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Query parameters for the merchant withdrawable-info lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantQuery {
    pub merchant_id: Uuid,
}

/// Query parameters for merchant-scoped record listings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListRecordsQuery {
    pub merchant_id: Option<Uuid>,
    pub status: Option<String>,
    pub settle_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the merchant ledger listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListLedgerQuery {
    pub merchant_id: Uuid,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
