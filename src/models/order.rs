use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Order lifecycle codes, persisted as SMALLINT. Orders are owned by the
/// payment pipeline; this core only reads refund-eligibility fields and
/// patches the refund columns back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum OrderStatus {
    Unpaid = 0,
    Paid = 1,
    /// Refunded at least once; may still have a refundable remainder.
    Refunded = 2,
    /// Funds collected but not released to the merchant.
    Frozen = 3,
}

impl OrderStatus {
    /// Orders in these states may be refunded through the original channel.
    pub fn is_refundable(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Refunded | OrderStatus::Frozen)
    }
}

/// An order as seen by the refund orchestrator and the frozen-amount query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub trade_no: String,
    pub merchant_id: Uuid,
    /// Gross amount the payer was charged.
    pub money: Decimal,
    /// Platform fee taken out of the gross amount.
    pub fee_money: Decimal,
    /// Settled amount; the refundable base.
    pub real_money: Decimal,
    /// Upstream (channel-side) trade reference; required for in-place refund.
    pub api_trade_no: Option<String>,
    pub channel_id: Option<Uuid>,
    pub status: OrderStatus,
    pub refund_status: i16,
    pub refund_no: Option<String>,
    /// Cumulative refunded amount.
    pub refund_money: Decimal,
    pub refund_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub refund_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Net amount the merchant received for this order.
    pub fn merchant_received(&self) -> Decimal {
        self.money - self.fee_money
    }

    /// Remaining refundable amount given the current cumulative refund.
    pub fn max_refundable(&self) -> Decimal {
        if self.status == OrderStatus::Refunded {
            (self.real_money - self.refund_money).max(Decimal::ZERO)
        } else {
            self.real_money
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus, money: Decimal, fee: Decimal, refunded: Decimal) -> Order {
        Order {
            id: Uuid::new_v4(),
            trade_no: "T1".to_string(),
            merchant_id: Uuid::new_v4(),
            money,
            fee_money: fee,
            real_money: money,
            api_trade_no: Some("UP1".to_string()),
            channel_id: Some(Uuid::new_v4()),
            status,
            refund_status: 0,
            refund_no: None,
            refund_money: refunded,
            refund_reason: None,
            paid_at: Some(Utc::now()),
            refund_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_refundable_states() {
        assert!(OrderStatus::Paid.is_refundable());
        assert!(OrderStatus::Refunded.is_refundable());
        assert!(OrderStatus::Frozen.is_refundable());
        assert!(!OrderStatus::Unpaid.is_refundable());
    }

    #[test]
    fn test_max_refundable_partial() {
        let o = order(OrderStatus::Refunded, dec!(100.00), dec!(5.00), dec!(40.00));
        assert_eq!(o.max_refundable(), dec!(60.00));
    }

    #[test]
    fn test_max_refundable_untouched() {
        let o = order(OrderStatus::Paid, dec!(100.00), dec!(5.00), dec!(0));
        assert_eq!(o.max_refundable(), dec!(100.00));
    }

    #[test]
    fn test_max_refundable_never_negative() {
        let o = order(OrderStatus::Refunded, dec!(100.00), dec!(5.00), dec!(120.00));
        assert_eq!(o.max_refundable(), dec!(0));
    }

    #[test]
    fn test_merchant_received() {
        let o = order(OrderStatus::Paid, dec!(100.00), dec!(5.00), dec!(0));
        assert_eq!(o.merchant_received(), dec!(95.00));
    }
}
