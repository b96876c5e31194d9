use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted status of a settlement record.
///
/// The legacy schema overloaded code `3` for both admin-rejected and
/// self-cancelled; here a record is `Terminated` and the actor lives in the
/// separate `terminated_by` column. `legacy_status_code` keeps the external
/// 0/1/3 codes stable for API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "settle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SettleStatus {
    Pending,
    Approved,
    Terminated,
}

/// Who terminated a settlement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "terminated_by", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TerminatedBy {
    Admin,
    Merchant,
}

/// The four-way logical state of a money-moving record, reconstructed from
/// the status/terminated_by column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleState {
    Pending,
    Approved,
    /// Terminated by the merchant before processing.
    Cancelled,
    /// Terminated by an admin with a reason.
    Rejected,
}

impl SettleState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SettleState::Pending)
    }

    /// The (status, terminated_by) pair this state persists as.
    pub fn columns(&self) -> (SettleStatus, Option<TerminatedBy>) {
        match self {
            SettleState::Pending => (SettleStatus::Pending, None),
            SettleState::Approved => (SettleStatus::Approved, None),
            SettleState::Cancelled => (SettleStatus::Terminated, Some(TerminatedBy::Merchant)),
            SettleState::Rejected => (SettleStatus::Terminated, Some(TerminatedBy::Admin)),
        }
    }
}

/// A merchant's request to move reserved balance to an external account.
///
/// The requested `amount` is deducted from the merchant balance when the
/// record is created (reservation-on-apply), and re-credited only if the
/// record terminates as cancelled or rejected.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SettleRecord {
    pub id: Uuid,
    pub settle_no: String,
    pub merchant_id: Uuid,
    pub settle_type: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub real_amount: Decimal,
    pub account_name: Option<String>,
    pub account_no: Option<String>,
    pub bank_name: Option<String>,
    pub bank_branch: Option<String>,
    pub crypto_network: Option<String>,
    pub crypto_address: Option<String>,
    pub status: SettleStatus,
    pub terminated_by: Option<TerminatedBy>,
    pub remark: Option<String>,
    pub processed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl SettleRecord {
    /// Logical state reconstructed from the persisted column pair.
    pub fn state(&self) -> SettleState {
        match (self.status, self.terminated_by) {
            (SettleStatus::Pending, _) => SettleState::Pending,
            (SettleStatus::Approved, _) => SettleState::Approved,
            (SettleStatus::Terminated, Some(TerminatedBy::Admin)) => SettleState::Rejected,
            (SettleStatus::Terminated, _) => SettleState::Cancelled,
        }
    }

    /// Numeric code exposed to API consumers of the legacy schema.
    pub fn legacy_status_code(&self) -> i16 {
        match self.status {
            SettleStatus::Pending => 0,
            SettleStatus::Approved => 1,
            SettleStatus::Terminated => 3,
        }
    }
}

/// Generates an externally visible settlement number.
pub fn generate_settle_no() -> String {
    generate_no('S')
}

/// Generates an externally visible refund number.
pub fn generate_refund_no() -> String {
    generate_no('R')
}

fn generate_no(prefix: char) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("{}{}{}", prefix, Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_columns() {
        let mut record = SettleRecord {
            id: Uuid::new_v4(),
            settle_no: "S1".to_string(),
            merchant_id: Uuid::new_v4(),
            settle_type: "bank".to_string(),
            amount: Default::default(),
            fee: Default::default(),
            real_amount: Default::default(),
            account_name: None,
            account_no: None,
            bank_name: None,
            bank_branch: None,
            crypto_network: None,
            crypto_address: None,
            status: SettleStatus::Pending,
            terminated_by: None,
            remark: None,
            processed_by: None,
            created_at: Utc::now(),
            processed_at: None,
        };
        assert_eq!(record.state(), SettleState::Pending);
        assert_eq!(record.legacy_status_code(), 0);

        record.status = SettleStatus::Approved;
        assert_eq!(record.state(), SettleState::Approved);
        assert_eq!(record.legacy_status_code(), 1);

        record.status = SettleStatus::Terminated;
        record.terminated_by = Some(TerminatedBy::Admin);
        assert_eq!(record.state(), SettleState::Rejected);
        assert_eq!(record.legacy_status_code(), 3);

        record.terminated_by = Some(TerminatedBy::Merchant);
        assert_eq!(record.state(), SettleState::Cancelled);
        assert_eq!(record.legacy_status_code(), 3);
    }

    #[test]
    fn test_state_round_trips_through_columns() {
        for state in [
            SettleState::Pending,
            SettleState::Approved,
            SettleState::Cancelled,
            SettleState::Rejected,
        ] {
            let (status, terminated_by) = state.columns();
            let reconstructed = match (status, terminated_by) {
                (SettleStatus::Pending, _) => SettleState::Pending,
                (SettleStatus::Approved, _) => SettleState::Approved,
                (SettleStatus::Terminated, Some(TerminatedBy::Admin)) => SettleState::Rejected,
                (SettleStatus::Terminated, _) => SettleState::Cancelled,
            };
            assert_eq!(reconstructed, state);
        }
    }

    #[test]
    fn test_settle_no_shape() {
        let no = generate_settle_no();
        assert!(no.starts_with('S'));
        assert!(no.len() > 14);
        assert!(generate_refund_no().starts_with('R'));
    }
}
