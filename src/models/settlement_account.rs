use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A merchant's configured destination account for withdrawals. Bank and
/// crypto fields are populated depending on `settle_type`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SettlementAccount {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub settle_type: String,
    pub account_name: Option<String>,
    pub account_no: Option<String>,
    pub bank_name: Option<String>,
    pub bank_branch: Option<String>,
    pub crypto_network: Option<String>,
    pub crypto_address: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}
