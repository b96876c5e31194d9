use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::repositories::SystemConfigRepository;

/// Narrow configuration-provider capability. Read once per operation; never
/// cached as hidden global state.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn get(&self, key: &str, default: &str) -> Result<String>;
}

/// Feature flag gating merchant self-service refund.
pub const USER_REFUND_KEY: &str = "user_refund";

/// Postgres-backed provider over the `system_configs` table.
pub struct DbConfigProvider {
    repo: SystemConfigRepository,
}

impl DbConfigProvider {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: SystemConfigRepository::new(pool),
        }
    }
}

#[async_trait]
impl ConfigProvider for DbConfigProvider {
    async fn get(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.repo.get(key).await?.unwrap_or_else(|| default.to_string()))
    }
}
