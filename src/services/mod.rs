pub mod config_provider;
pub mod ledger_service;
pub mod refund_service;
pub mod state_machine;
pub mod withdrawal_service;

pub use config_provider::{ConfigProvider, DbConfigProvider};
pub use ledger_service::LedgerService;
pub use refund_service::{RefundInfo, RefundResult, RefundService};
pub use state_machine::MovementStateMachine;
pub use withdrawal_service::{
    BatchApproveResult, WithdrawableInfo, WithdrawalService,
};
