use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The kind of balance movement a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Reservation debit when a withdrawal is applied.
    Withdraw,
    /// Compensating credit when the merchant cancels a pending withdrawal.
    WithdrawCancel,
    /// Compensating credit when an admin rejects a pending withdrawal.
    WithdrawReject,
    /// Clawback debit when a paid order is refunded.
    RefundDeduct,
}

impl MovementType {
    /// True for movements that credit the balance back.
    pub fn is_compensating(&self) -> bool {
        matches!(self, MovementType::WithdrawCancel | MovementType::WithdrawReject)
    }
}

/// One immutable entry in a merchant's balance audit log.
///
/// Entries are append-only and strictly ordered per merchant:
/// `after_balance = before_balance + amount`, and each entry's
/// `after_balance` equals the next entry's `before_balance`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BalanceLog {
    pub id: i64,
    pub merchant_id: Uuid,
    pub movement_type: MovementType,
    /// Signed delta applied to the balance.
    pub amount: Decimal,
    pub before_balance: Decimal,
    pub after_balance: Decimal,
    /// Correlation id: the related settle_no or refund_no.
    pub related_no: String,
    pub remark: String,
    pub created_at: DateTime<Utc>,
}

impl BalanceLog {
    /// Checks the internal arithmetic invariant of a single entry.
    pub fn is_consistent(&self) -> bool {
        self.after_balance == self.before_balance + self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(amount: Decimal, before: Decimal, after: Decimal) -> BalanceLog {
        BalanceLog {
            id: 1,
            merchant_id: Uuid::new_v4(),
            movement_type: MovementType::Withdraw,
            amount,
            before_balance: before,
            after_balance: after,
            related_no: "S1".to_string(),
            remark: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entry_consistency() {
        assert!(entry(dec!(-30.00), dec!(100.00), dec!(70.00)).is_consistent());
        assert!(!entry(dec!(-30.00), dec!(100.00), dec!(71.00)).is_consistent());
    }

    #[test]
    fn test_compensating_types() {
        assert!(MovementType::WithdrawCancel.is_compensating());
        assert!(MovementType::WithdrawReject.is_compensating());
        assert!(!MovementType::Withdraw.is_compensating());
        assert!(!MovementType::RefundDeduct.is_compensating());
    }
}
