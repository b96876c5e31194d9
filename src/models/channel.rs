use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// A payment channel row: which plugin collects for it plus its credentials.
/// The stored JSON `config` and the credential columns are merged into one
/// opaque key/value map for plugin calls.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Channel {
    pub id: Uuid,
    pub plugin_name: String,
    pub app_id: Option<String>,
    pub app_mch_id: Option<String>,
    pub app_key: Option<String>,
    pub app_secret: Option<String>,
    pub config: Option<Value>,
}

impl Channel {
    /// Merges stored JSON config with the credential columns. Credential
    /// columns win on key collision.
    pub fn merged_config(&self) -> Map<String, Value> {
        let mut merged = match &self.config {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        let creds = [
            ("appid", &self.app_id),
            ("appmchid", &self.app_mch_id),
            ("appkey", &self.app_key),
            ("appsecret", &self.app_secret),
        ];
        for (key, value) in creds {
            if let Some(v) = value {
                merged.insert(key.to_string(), Value::String(v.clone()));
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merged_config_overlays_credentials() {
        let channel = Channel {
            id: Uuid::new_v4(),
            plugin_name: "alipay".to_string(),
            app_id: Some("A1".to_string()),
            app_mch_id: None,
            app_key: Some("K1".to_string()),
            app_secret: None,
            config: Some(json!({"gateway": "https://x", "appid": "stale"})),
        };
        let merged = channel.merged_config();
        assert_eq!(merged["gateway"], json!("https://x"));
        assert_eq!(merged["appid"], json!("A1"));
        assert_eq!(merged["appkey"], json!("K1"));
        assert!(!merged.contains_key("appsecret"));
    }

    #[test]
    fn test_merged_config_handles_missing_json() {
        let channel = Channel {
            id: Uuid::new_v4(),
            plugin_name: "wxpay".to_string(),
            app_id: None,
            app_mch_id: None,
            app_key: None,
            app_secret: None,
            config: None,
        };
        assert!(channel.merged_config().is_empty());
    }
}
