use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::SettlementAccount;

const COLUMNS: &str = r#"id, merchant_id, settle_type, account_name, account_no, bank_name,
        bank_branch, crypto_network, crypto_address, is_default, created_at"#;

/// Lookup access to a merchant's configured settlement destination accounts.
pub struct SettlementAccountRepository {
    pool: PgPool,
}

impl SettlementAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds an account only when it belongs to the requesting merchant.
    pub async fn find_owned(
        &self,
        account_id: Uuid,
        merchant_id: Uuid,
    ) -> Result<Option<SettlementAccount>> {
        let row = sqlx::query_as::<_, SettlementAccount>(&format!(
            "SELECT {COLUMNS} FROM merchant_settlements WHERE id = $1 AND merchant_id = $2"
        ))
        .bind(account_id)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn list_by_merchant(&self, merchant_id: Uuid) -> Result<Vec<SettlementAccount>> {
        let rows = sqlx::query_as::<_, SettlementAccount>(&format!(
            "SELECT {COLUMNS} FROM merchant_settlements WHERE merchant_id = $1 ORDER BY is_default DESC, created_at"
        ))
        .bind(merchant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }
}
