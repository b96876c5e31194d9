pub mod balance_log_repository;
pub mod channel_repository;
pub mod merchant_repository;
pub mod order_repository;
pub mod settle_record_repository;
pub mod settlement_account_repository;
pub mod settlement_options_repository;
pub mod system_config_repository;

pub use balance_log_repository::BalanceLogRepository;
pub use channel_repository::ChannelRepository;
pub use merchant_repository::MerchantRepository;
pub use order_repository::OrderRepository;
pub use settle_record_repository::{SettleRecordQuery, SettleRecordRepository};
pub use settlement_account_repository::SettlementAccountRepository;
pub use settlement_options_repository::SettlementOptionsRepository;
pub use system_config_repository::SystemConfigRepository;
