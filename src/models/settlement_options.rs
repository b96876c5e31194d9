use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::round_money;

/// Settlement cycle governing the frozen-amount rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
pub enum SettleCycle {
    /// Income is withdrawable immediately; frozen amount is always zero.
    Realtime = -1,
    /// D+0: today's income is frozen until the day boundary passes.
    SameDay = 0,
    /// D+1: today's income is frozen until the next day.
    NextDay = 1,
}

impl SettleCycle {
    /// True when income paid since the start of the current day is frozen.
    pub fn freezes_current_day(&self) -> bool {
        matches!(self, SettleCycle::SameDay | SettleCycle::NextDay)
    }
}

/// Platform-wide withdrawal fee and cycle parameters. A single row; defaults
/// apply when the row has never been configured.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SettlementOptions {
    /// Fee rate as a decimal fraction (0.01 = 1%).
    pub settle_rate: Decimal,
    pub settle_fee_min: Decimal,
    pub settle_fee_max: Decimal,
    pub min_settle_amount: Decimal,
    pub settle_cycle: SettleCycle,
}

impl Default for SettlementOptions {
    fn default() -> Self {
        Self {
            settle_rate: Decimal::ZERO,
            settle_fee_min: Decimal::ZERO,
            settle_fee_max: Decimal::ZERO,
            min_settle_amount: Decimal::from(10),
            settle_cycle: SettleCycle::NextDay,
        }
    }
}

impl SettlementOptions {
    /// Withdrawal fee for `amount`: round2(amount × rate), clamped to
    /// [fee_min, fee_max] when those bounds are configured (nonzero).
    pub fn compute_fee(&self, amount: Decimal) -> Decimal {
        if self.settle_rate <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let mut fee = round_money(amount * self.settle_rate);
        if self.settle_fee_min > Decimal::ZERO && fee < self.settle_fee_min {
            fee = self.settle_fee_min;
        }
        if self.settle_fee_max > Decimal::ZERO && fee > self.settle_fee_max {
            fee = self.settle_fee_max;
        }
        fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn options(rate: Decimal, min: Decimal, max: Decimal) -> SettlementOptions {
        SettlementOptions {
            settle_rate: rate,
            settle_fee_min: min,
            settle_fee_max: max,
            ..Default::default()
        }
    }

    #[test]
    fn test_fee_zero_rate() {
        assert_eq!(options(dec!(0), dec!(1), dec!(5)).compute_fee(dec!(100)), dec!(0));
    }

    #[test]
    fn test_fee_plain_rate() {
        assert_eq!(options(dec!(0.01), dec!(0), dec!(0)).compute_fee(dec!(123.45)), dec!(1.23));
    }

    #[test]
    fn test_fee_rounds_half_up() {
        // 123.50 * 0.01 = 1.235 -> 1.24
        assert_eq!(options(dec!(0.01), dec!(0), dec!(0)).compute_fee(dec!(123.50)), dec!(1.24));
    }

    #[test]
    fn test_fee_clamped_to_min() {
        assert_eq!(options(dec!(0.01), dec!(2.00), dec!(0)).compute_fee(dec!(100)), dec!(2.00));
    }

    #[test]
    fn test_fee_clamped_to_max() {
        assert_eq!(options(dec!(0.01), dec!(0), dec!(5.00)).compute_fee(dec!(10000)), dec!(5.00));
    }

    #[test]
    fn test_unconfigured_bounds_ignored() {
        assert_eq!(options(dec!(0.01), dec!(0), dec!(0)).compute_fee(dec!(10000)), dec!(100.00));
    }

    #[test]
    fn test_cycle_freezing() {
        assert!(SettleCycle::NextDay.freezes_current_day());
        assert!(SettleCycle::SameDay.freezes_current_day());
        assert!(!SettleCycle::Realtime.freezes_current_day());
    }
}
