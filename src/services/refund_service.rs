use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::channel::{ChannelPlugin, ChannelRefundRequest, PluginRegistry};
use crate::config::UpstreamSettings;
use crate::error::{AppError, Result};
use crate::models::settle_record::generate_refund_no;
use crate::models::{round_money, Channel, MovementType, Order, OrderStatus};
use crate::repositories::{ChannelRepository, MerchantRepository, OrderRepository};
use crate::services::config_provider::USER_REFUND_KEY;
use crate::services::{ConfigProvider, LedgerService};

/// Refund snapshot for an eligible order. `money` is the settled amount,
/// the base every refund is capped against.
#[derive(Debug, Clone, Serialize)]
pub struct RefundInfo {
    pub trade_no: String,
    pub money: Decimal,
    pub refunded_money: Decimal,
    pub max_refund: Decimal,
}

/// Outcome of a committed refund.
#[derive(Debug, Clone, Serialize)]
pub struct RefundResult {
    pub trade_no: String,
    pub refund_no: String,
    pub refund_money: Decimal,
    /// Amount clawed back from the merchant balance.
    pub reduce_money: Decimal,
}

/// The refund orchestrator: validates eligibility, pushes the refund through
/// the original payment channel, and only then claws back the merchant's
/// share locally.
///
/// Upstream-first ordering is deliberate: an upstream failure or timeout
/// leaves local state untouched, while a local failure after an upstream
/// success is surfaced for manual reconciliation rather than silently
/// retried.
pub struct RefundService {
    pool: PgPool,
    order_repo: OrderRepository,
    merchant_repo: MerchantRepository,
    channel_repo: ChannelRepository,
    registry: Arc<PluginRegistry>,
    config: Arc<dyn ConfigProvider>,
    upstream: UpstreamSettings,
}

impl RefundService {
    pub fn new(
        pool: PgPool,
        registry: Arc<PluginRegistry>,
        config: Arc<dyn ConfigProvider>,
        upstream: UpstreamSettings,
    ) -> Self {
        Self {
            order_repo: OrderRepository::new(pool.clone()),
            merchant_repo: MerchantRepository::new(pool.clone()),
            channel_repo: ChannelRepository::new(pool.clone()),
            registry,
            config,
            upstream,
            pool,
        }
    }

    /// Eligibility lookup for the refund form. Runs the same gate, state and
    /// channel checks as `refund` so the form never offers a refund the
    /// submit path would reject.
    pub async fn refund_info(&self, merchant_id: Uuid, trade_no: &str) -> Result<RefundInfo> {
        self.ensure_refund_enabled().await?;

        let order = self.find_order(merchant_id, trade_no).await?;
        if !order.status.is_refundable() {
            return Err(AppError::InvalidOrderState(format!(
                "order '{}' is not in a refundable state",
                trade_no
            )));
        }

        self.resolve_refund_channel(&order).await?;

        Ok(RefundInfo {
            trade_no: order.trade_no.clone(),
            money: order.real_money,
            refunded_money: order.refund_money,
            max_refund: order.max_refundable(),
        })
    }

    /// Refunds `amount` of an order back through its original channel and
    /// claws back the merchant's proportional share of the net income.
    pub async fn refund(
        &self,
        merchant_id: Uuid,
        trade_no: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<RefundResult> {
        self.ensure_refund_enabled().await?;

        let order = self.find_order(merchant_id, trade_no).await?;
        if !order.status.is_refundable() {
            return Err(AppError::InvalidOrderState(format!(
                "order '{}' is not in a refundable state",
                trade_no
            )));
        }
        if order.status == OrderStatus::Refunded && order.refund_money >= order.real_money {
            return Err(AppError::FullyRefunded(format!(
                "order '{}' is already fully refunded",
                trade_no
            )));
        }

        let amount = round_money(amount);
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("refund amount must be positive".to_string()));
        }
        let max_refund = order.max_refundable();
        if amount > max_refund {
            return Err(AppError::ExceedsCap(format!(
                "refund {:.2} exceeds refundable remainder {:.2}",
                amount, max_refund
            )));
        }

        let (api_trade_no, channel, plugin) = self.resolve_refund_channel(&order).await?;

        let reduce_money = compute_clawback(&order, amount);

        // Verify the clawback can land before touching the upstream; a
        // post-upstream insufficient balance would strand the refund.
        let merchant = self
            .merchant_repo
            .find_by_id(merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant '{}' not found", merchant_id)))?;
        if !merchant.has_sufficient_balance(reduce_money) {
            return Err(AppError::InsufficientBalance(format!(
                "balance {:.2} cannot cover the refund clawback {:.2}",
                merchant.balance, reduce_money
            )));
        }

        let refund_no = generate_refund_no();
        let request = ChannelRefundRequest {
            trade_no: order.trade_no.clone(),
            api_trade_no,
            refund_no: refund_no.clone(),
            refund_money: amount,
            total_money: order.real_money,
        };

        let timeout = Duration::from_secs(self.upstream.refund_timeout_secs);
        let response = tokio::time::timeout(
            timeout,
            plugin.refund(&channel.merged_config(), &request),
        )
        .await
        .map_err(|_| {
            AppError::Upstream(format!(
                "channel '{}' refund timed out after {}s",
                channel.plugin_name, self.upstream.refund_timeout_secs
            ))
        })??;

        if !response.is_success() {
            return Err(AppError::Upstream(
                response
                    .msg
                    .unwrap_or_else(|| "upstream refund rejected".to_string()),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        if reduce_money > Decimal::ZERO {
            LedgerService::apply_delta(
                &mut tx,
                merchant_id,
                -reduce_money,
                MovementType::RefundDeduct,
                &refund_no,
                &format!("refund of order {}", order.trade_no),
            )
            .await?;
        }

        let new_refund_money = round_money(order.refund_money + amount);
        OrderRepository::apply_refund(&mut tx, order.id, &refund_no, new_refund_money, reason)
            .await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            merchant_id = %merchant_id,
            trade_no = %order.trade_no,
            refund_no = %refund_no,
            %amount,
            %reduce_money,
            "refund committed"
        );

        Ok(RefundResult {
            trade_no: order.trade_no,
            refund_no,
            refund_money: amount,
            reduce_money,
        })
    }

    async fn ensure_refund_enabled(&self) -> Result<()> {
        let enabled = self.config.get(USER_REFUND_KEY, "0").await?;
        if enabled != "1" {
            return Err(AppError::FeatureDisabled(
                "merchant self-service refund is disabled".to_string(),
            ));
        }
        Ok(())
    }

    async fn find_order(&self, merchant_id: Uuid, trade_no: &str) -> Result<Order> {
        self.order_repo
            .find_by_trade_no(merchant_id, trade_no)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order '{}' not found", trade_no)))
    }

    /// An in-place refund needs the upstream trade reference and a loaded
    /// channel plugin that exposes the refund capability.
    async fn resolve_refund_channel(
        &self,
        order: &Order,
    ) -> Result<(String, Channel, Arc<dyn ChannelPlugin>)> {
        let api_trade_no = order.api_trade_no.clone().ok_or_else(|| {
            AppError::Validation(format!(
                "order '{}' has no upstream trade number",
                order.trade_no
            ))
        })?;

        let channel_id = order.channel_id.ok_or_else(|| {
            AppError::NotFound(format!("order '{}' has no payment channel", order.trade_no))
        })?;
        let channel = self
            .channel_repo
            .find_by_id(channel_id)
            .await?
            .ok_or_else(|| AppError::NotFound("payment channel not found".to_string()))?;

        let plugin = self
            .registry
            .get(&channel.plugin_name)
            .ok_or_else(|| {
                AppError::NotFound(format!("channel plugin '{}' not loaded", channel.plugin_name))
            })?;
        if !plugin.supports_refund() {
            return Err(AppError::RefundUnsupported(format!(
                "channel '{}' cannot refund through the original payment",
                channel.plugin_name
            )));
        }

        Ok((api_trade_no, channel, plugin))
    }
}

/// Merchant-side clawback for refunding `amount` of `order`.
///
/// Frozen orders clawed back nothing: their income never reached the balance.
/// A full refund claws back exactly the merchant's net income; a partial one
/// claws back the proportional share, rounded to 2 decimals half up.
fn compute_clawback(order: &Order, amount: Decimal) -> Decimal {
    if order.status == OrderStatus::Frozen {
        return Decimal::ZERO;
    }
    let received = order.merchant_received();
    if amount >= order.money {
        received
    } else {
        round_money(amount / order.money * received)
    }
}
