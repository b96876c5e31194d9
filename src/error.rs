use thiserror::Error;

/// Application-level error taxonomy.
///
/// Every variant except `Database` and `Config` is a business-rule rejection
/// that is returned to the caller inside the normal `{ code: -1 }` response
/// envelope. `Database` means the transaction itself failed and is surfaced
/// as a generic transport-level failure after a full rollback.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Referenced record does not exist (or is not owned by the caller).
    #[error("{0}")]
    NotFound(String),

    /// Order is not in a refundable state.
    #[error("{0}")]
    InvalidOrderState(String),

    /// Order has no remaining refundable amount.
    #[error("{0}")]
    FullyRefunded(String),

    /// Debit would take the merchant balance below zero.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Requested amount exceeds the remaining refundable cap.
    #[error("{0}")]
    ExceedsCap(String),

    /// Transition attempted on a record no longer in the Pending state.
    #[error("{0}")]
    AlreadyProcessed(String),

    /// Operation is gated behind an administratively disabled feature flag.
    #[error("{0}")]
    FeatureDisabled(String),

    /// The payment channel does not expose a refund capability.
    #[error("{0}")]
    RefundUnsupported(String),

    /// The external plugin returned failure or timed out. No local mutation
    /// has been performed when this is raised.
    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("configuration error: {0}")]
    Config(config::ConfigError),
}

impl AppError {
    /// True for errors that belong in the normal response envelope rather
    /// than a transport-level failure.
    pub fn is_business_error(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
