use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::channel::PluginRegistry;
use crate::config::{NotifySettings, UpstreamSettings};
use crate::notify::Notifier;
use crate::services::{DbConfigProvider, RefundService, WithdrawalService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub plugins: Arc<PluginRegistry>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub notify_settings: NotifySettings,
    pub upstream_settings: UpstreamSettings,
}

impl AppState {
    pub fn new(pool: PgPool, plugins: Arc<PluginRegistry>) -> Self {
        Self {
            pool,
            plugins,
            notifier: None,
            notify_settings: NotifySettings::default(),
            upstream_settings: UpstreamSettings::default(),
        }
    }

    /// Adds the admin notifier to the state.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>, settings: NotifySettings) -> Self {
        self.notifier = Some(notifier);
        self.notify_settings = settings;
        self
    }

    /// Sets bounds on external payment-channel calls.
    pub fn with_upstream_settings(mut self, settings: UpstreamSettings) -> Self {
        self.upstream_settings = settings;
        self
    }

    pub fn withdrawal_service(&self) -> WithdrawalService {
        let service = WithdrawalService::new(self.pool.clone());
        match &self.notifier {
            Some(notifier) => {
                service.with_notifier(notifier.clone(), self.notify_settings.clone())
            }
            None => service,
        }
    }

    pub fn refund_service(&self) -> RefundService {
        RefundService::new(
            self.pool.clone(),
            self.plugins.clone(),
            Arc::new(DbConfigProvider::new(self.pool.clone())),
            self.upstream_settings.clone(),
        )
    }
}

/// Creates the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health_check))
        // Merchant endpoints
        .route("/merchant/withdraw/info", get(handlers::withdraw_info))
        .route("/merchant/withdraw/apply", post(handlers::withdraw_apply))
        .route("/merchant/withdraw/cancel", post(handlers::withdraw_cancel))
        .route("/merchant/withdraw/records", get(handlers::merchant_withdraw_records))
        .route("/merchant/ledger", get(handlers::merchant_ledger))
        .route("/merchant/refund", post(handlers::refund))
        .route("/merchant/refund/query", post(handlers::refund_query))
        // Admin endpoints
        .route("/admin/withdraw/approve", post(handlers::withdraw_approve))
        .route("/admin/withdraw/reject", post(handlers::withdraw_reject))
        .route("/admin/withdraw/batch-approve", post(handlers::withdraw_batch_approve))
        .route("/admin/withdraw/records", get(handlers::admin_withdraw_records))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
