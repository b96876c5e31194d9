use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Parameters for an in-place refund through the original payment channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelRefundRequest {
    pub trade_no: String,
    pub api_trade_no: String,
    pub refund_no: String,
    pub refund_money: Decimal,
    pub total_money: Decimal,
}

/// Upstream response. `code == 0` signals success; anything else carries the
/// upstream message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRefundResponse {
    pub code: i32,
    pub msg: Option<String>,
}

impl ChannelRefundResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// External payment-channel capability. The wire protocol behind a plugin is
/// out of scope; implementations receive the merged channel credential map
/// and the refund parameters.
#[async_trait]
pub trait ChannelPlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this plugin can refund back through the original channel.
    fn supports_refund(&self) -> bool {
        false
    }

    async fn refund(
        &self,
        config: &Map<String, Value>,
        request: &ChannelRefundRequest,
    ) -> Result<ChannelRefundResponse>;
}

/// Registry of loaded channel plugins, keyed by plugin name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn ChannelPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn ChannelPlugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ChannelPlugin>> {
        self.plugins.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    struct NoRefundPlugin;

    #[async_trait]
    impl ChannelPlugin for NoRefundPlugin {
        fn name(&self) -> &str {
            "collect_only"
        }

        async fn refund(
            &self,
            _config: &Map<String, Value>,
            _request: &ChannelRefundRequest,
        ) -> Result<ChannelRefundResponse> {
            Err(AppError::RefundUnsupported("refund not implemented".to_string()))
        }
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(NoRefundPlugin));
        assert!(registry.get("collect_only").is_some());
        assert!(registry.get("missing").is_none());
        assert!(!registry.get("collect_only").unwrap().supports_refund());
    }

    #[test]
    fn test_response_success_code() {
        assert!(ChannelRefundResponse { code: 0, msg: None }.is_success());
        assert!(!ChannelRefundResponse { code: 1, msg: Some("denied".into()) }.is_success());
    }
}
