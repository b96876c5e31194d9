#![allow(dead_code)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// Connects to the test database named by DATABASE_URL and applies
/// migrations. Returns None when DATABASE_URL is unset so the suite can be
/// run without a database.
pub async fn try_setup_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub async fn cleanup_test_data(pool: &PgPool) {
    sqlx::query("DELETE FROM merchant_balance_logs").execute(pool).await.ok();
    sqlx::query("DELETE FROM settle_records").execute(pool).await.ok();
    sqlx::query("DELETE FROM orders").execute(pool).await.ok();
    sqlx::query("DELETE FROM merchant_settlements").execute(pool).await.ok();
    sqlx::query("DELETE FROM channels").execute(pool).await.ok();
    sqlx::query("DELETE FROM merchants").execute(pool).await.ok();
    sqlx::query("DELETE FROM settlement_options").execute(pool).await.ok();
    sqlx::query("DELETE FROM system_configs").execute(pool).await.ok();
}

pub async fn create_merchant(pool: &PgPool, balance: Decimal) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO merchants (name, api_key, balance) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(format!("Merchant {}", Uuid::new_v4()))
    .bind(Uuid::new_v4().to_string())
    .bind(balance)
    .fetch_one(pool)
    .await
    .expect("Failed to create merchant")
}

pub async fn merchant_balance(pool: &PgPool, merchant_id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM merchants WHERE id = $1")
        .bind(merchant_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read merchant balance")
}

pub async fn create_settlement_account(pool: &PgPool, merchant_id: Uuid) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO merchant_settlements (merchant_id, settle_type, account_name, account_no, bank_name)
        VALUES ($1, 'bank', 'Holder', '6222000000000000', 'Test Bank')
        RETURNING id
        "#,
    )
    .bind(merchant_id)
    .fetch_one(pool)
    .await
    .expect("Failed to create settlement account")
}

pub async fn set_settlement_options(
    pool: &PgPool,
    rate: Decimal,
    fee_min: Decimal,
    fee_max: Decimal,
    min_amount: Decimal,
    cycle: i16,
) {
    sqlx::query(
        r#"
        INSERT INTO settlement_options (id, settle_rate, settle_fee_min, settle_fee_max, min_settle_amount, settle_cycle)
        VALUES (1, $1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE
        SET settle_rate = $1, settle_fee_min = $2, settle_fee_max = $3,
            min_settle_amount = $4, settle_cycle = $5
        "#,
    )
    .bind(rate)
    .bind(fee_min)
    .bind(fee_max)
    .bind(min_amount)
    .bind(cycle)
    .execute(pool)
    .await
    .expect("Failed to set settlement options");
}

pub async fn set_system_config(pool: &PgPool, key: &str, value: &str) {
    sqlx::query(
        r#"
        INSERT INTO system_configs (key, value) VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .expect("Failed to set system config");
}

pub async fn create_channel(pool: &PgPool, plugin_name: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO channels (plugin_name, app_id, app_key) VALUES ($1, 'APP1', 'KEY1') RETURNING id",
    )
    .bind(plugin_name)
    .fetch_one(pool)
    .await
    .expect("Failed to create channel")
}

#[allow(clippy::too_many_arguments)]
pub async fn create_order(
    pool: &PgPool,
    merchant_id: Uuid,
    channel_id: Option<Uuid>,
    money: Decimal,
    fee_money: Decimal,
    status: i16,
    paid_at: Option<DateTime<Utc>>,
) -> String {
    let trade_no = format!("T{}", Uuid::new_v4().simple());
    sqlx::query(
        r#"
        INSERT INTO orders
            (trade_no, merchant_id, channel_id, money, fee_money, real_money, api_trade_no, status, paid_at)
        VALUES ($1, $2, $3, $4, $5, $4, $6, $7, $8)
        "#,
    )
    .bind(&trade_no)
    .bind(merchant_id)
    .bind(channel_id)
    .bind(money)
    .bind(fee_money)
    .bind(format!("UP{}", Uuid::new_v4().simple()))
    .bind(status)
    .bind(paid_at)
    .execute(pool)
    .await
    .expect("Failed to create order");

    trade_no
}

/// Sets the settled amount apart from the gross, as when the channel took
/// its cut upstream.
pub async fn set_order_real_money(pool: &PgPool, trade_no: &str, real_money: Decimal) {
    sqlx::query("UPDATE orders SET real_money = $2 WHERE trade_no = $1")
        .bind(trade_no)
        .bind(real_money)
        .execute(pool)
        .await
        .expect("Failed to set order real_money");
}

pub async fn clear_order_api_trade_no(pool: &PgPool, trade_no: &str) {
    sqlx::query("UPDATE orders SET api_trade_no = NULL WHERE trade_no = $1")
        .bind(trade_no)
        .execute(pool)
        .await
        .expect("Failed to clear order api_trade_no");
}
