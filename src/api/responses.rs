use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BalanceLog, MovementType, SettleRecord, SettlementAccount, TerminatedBy};
use crate::services::{BatchApproveResult, RefundInfo, RefundResult, WithdrawableInfo};

/// Uniform response envelope. Business outcomes, success or failure, ride in
/// HTTP 200; `code` 0 means success, -1 carries the rejection message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: None,
            data: Some(data),
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            code: -1,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: bool,
}

/// Settlement account summary shown on the withdrawal form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementAccountResponse {
    pub id: Uuid,
    pub settle_type: String,
    pub account_name: Option<String>,
    pub account_no: Option<String>,
    pub bank_name: Option<String>,
    pub crypto_network: Option<String>,
}

impl From<SettlementAccount> for SettlementAccountResponse {
    fn from(account: SettlementAccount) -> Self {
        Self {
            id: account.id,
            settle_type: account.settle_type,
            account_name: account.account_name,
            account_no: account.account_no,
            bank_name: account.bank_name,
            crypto_network: account.crypto_network,
        }
    }
}

/// Withdrawable-info DTO. Monetary fields are fixed 2-decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawableInfoResponse {
    pub balance: String,
    pub frozen_amount: String,
    pub available_balance: String,
    pub pending_amount: String,
    pub settle_rate: String,
    pub settle_fee_min: String,
    pub settle_fee_max: String,
    pub min_settle_amount: String,
    pub settle_cycle: i16,
    pub accounts: Vec<SettlementAccountResponse>,
}

impl From<WithdrawableInfo> for WithdrawableInfoResponse {
    fn from(info: WithdrawableInfo) -> Self {
        Self {
            balance: format!("{:.2}", info.balance),
            frozen_amount: format!("{:.2}", info.frozen_amount),
            available_balance: format!("{:.2}", info.available_balance),
            pending_amount: format!("{:.2}", info.pending_amount),
            settle_rate: info.options.settle_rate.to_string(),
            settle_fee_min: format!("{:.2}", info.options.settle_fee_min),
            settle_fee_max: format!("{:.2}", info.options.settle_fee_max),
            min_settle_amount: format!("{:.2}", info.options.min_settle_amount),
            settle_cycle: info.options.settle_cycle as i16,
            accounts: info
                .accounts
                .into_iter()
                .map(SettlementAccountResponse::from)
                .collect(),
        }
    }
}

/// Settlement record DTO. `status` keeps the historical numeric codes
/// (0 pending, 1 approved, 3 terminated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleRecordResponse {
    pub id: Uuid,
    pub settle_no: String,
    pub merchant_id: Uuid,
    pub settle_type: String,
    pub amount: String,
    pub fee: String,
    pub real_amount: String,
    pub account_name: Option<String>,
    pub account_no: Option<String>,
    pub bank_name: Option<String>,
    pub status: i16,
    pub terminated_by: Option<TerminatedBy>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<SettleRecord> for SettleRecordResponse {
    fn from(record: SettleRecord) -> Self {
        let status = record.legacy_status_code();
        Self {
            id: record.id,
            settle_no: record.settle_no,
            merchant_id: record.merchant_id,
            settle_type: record.settle_type,
            amount: format!("{:.2}", record.amount),
            fee: format!("{:.2}", record.fee),
            real_amount: format!("{:.2}", record.real_amount),
            account_name: record.account_name,
            account_no: record.account_no,
            bank_name: record.bank_name,
            status,
            terminated_by: record.terminated_by,
            remark: record.remark,
            created_at: record.created_at,
            processed_at: record.processed_at,
        }
    }
}

/// Refund eligibility DTO. `money` is the settled amount of the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundInfoResponse {
    pub trade_no: String,
    pub money: String,
    pub refunded_money: String,
    pub max_refund: String,
}

impl From<RefundInfo> for RefundInfoResponse {
    fn from(info: RefundInfo) -> Self {
        Self {
            trade_no: info.trade_no,
            money: format!("{:.2}", info.money),
            refunded_money: format!("{:.2}", info.refunded_money),
            max_refund: format!("{:.2}", info.max_refund),
        }
    }
}

/// Committed refund DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundResponse {
    pub trade_no: String,
    pub refund_no: String,
    pub refund_money: String,
    pub reduce_money: String,
}

impl From<RefundResult> for RefundResponse {
    fn from(result: RefundResult) -> Self {
        Self {
            trade_no: result.trade_no,
            refund_no: result.refund_no,
            refund_money: format!("{:.2}", result.refund_money),
            reduce_money: format!("{:.2}", result.reduce_money),
        }
    }
}

/// Balance-log entry DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceLogResponse {
    pub id: i64,
    pub movement_type: MovementType,
    pub amount: String,
    pub before_balance: String,
    pub after_balance: String,
    pub related_no: String,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

impl From<BalanceLog> for BalanceLogResponse {
    fn from(entry: BalanceLog) -> Self {
        Self {
            id: entry.id,
            movement_type: entry.movement_type,
            amount: format!("{:.2}", entry.amount),
            before_balance: format!("{:.2}", entry.before_balance),
            after_balance: format!("{:.2}", entry.after_balance),
            related_no: entry.related_no,
            remark: entry.remark,
            created_at: entry.created_at,
        }
    }
}

/// Batch approval outcome DTO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchApproveResponse {
    pub success: u32,
    pub fail: u32,
}

impl From<BatchApproveResult> for BatchApproveResponse {
    fn from(result: BatchApproveResult) -> Self {
        Self {
            success: result.succeeded,
            fail: result.failed,
        }
    }
}

/// Admin record listing: the paginated page plus the platform-wide pending
/// backlog shown on the approval dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecordListResponse {
    pub items: Vec<SettleRecordResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub pending_count: i64,
    pub pending_amount: String,
}

/// Paginated list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_envelope_shapes() {
        let ok = ApiResponse::success(1);
        assert_eq!(ok.code, 0);
        assert!(ok.msg.is_none());

        let err = ApiResponse::<()>::failure("insufficient balance");
        assert_eq!(err.code, -1);
        assert_eq!(err.msg.as_deref(), Some("insufficient balance"));
        assert!(err.data.is_none());
    }

    #[test]
    fn test_money_formatted_to_two_decimals() {
        let result = RefundResult {
            trade_no: "T1".to_string(),
            refund_no: "R1".to_string(),
            refund_money: dec!(50),
            reduce_money: dec!(47.5),
        };
        let response = RefundResponse::from(result);
        assert_eq!(response.refund_money, "50.00");
        assert_eq!(response.reduce_money, "47.50");
    }
}
