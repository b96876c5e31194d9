use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A merchant account. `balance` is the current available monetary value and
/// is mutated exclusively through the ledger's apply-delta path; at any point
/// it equals the sum of all committed balance-log deltas for the merchant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MerchantAccount {
    pub id: Uuid,
    pub name: String,
    pub api_key: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl MerchantAccount {
    pub fn has_sufficient_balance(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}
