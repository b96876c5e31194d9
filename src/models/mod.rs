pub mod balance_log;
pub mod channel;
pub mod merchant;
pub mod order;
pub mod settle_record;
pub mod settlement_account;
pub mod settlement_options;

pub use balance_log::{BalanceLog, MovementType};
pub use channel::Channel;
pub use merchant::MerchantAccount;
pub use order::{Order, OrderStatus};
pub use settle_record::{SettleRecord, SettleState, SettleStatus, TerminatedBy};
pub use settlement_account::SettlementAccount;
pub use settlement_options::{SettleCycle, SettlementOptions};

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to 2 decimal places, half away from zero.
///
/// Applied at the point of persistence, never at display time, so repeated
/// operations cannot drift.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec!(47.505)), dec!(47.51));
        assert_eq!(round_money(dec!(47.504)), dec!(47.50));
        assert_eq!(round_money(dec!(-47.505)), dec!(-47.51));
    }

    #[test]
    fn test_round_money_no_truncation() {
        // 50 / 100 * 95 must stay 47.50 exactly.
        let clawback = dec!(50.00) / dec!(100.00) * dec!(95.00);
        assert_eq!(round_money(clawback), dec!(47.50));
    }
}
