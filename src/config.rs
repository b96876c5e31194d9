use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub port: u16,
    pub log_level: String,
}

/// Outbound notification settings. When `admin_url` is unset the
/// pending-withdrawal notification is skipped entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifySettings {
    pub admin_url: Option<String>,
    pub sign_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            admin_url: None,
            sign_key: None,
            timeout_secs: 5,
        }
    }
}

/// Bounds on external payment-channel calls.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    pub refund_timeout_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            refund_timeout_secs: 15,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        builder.build()?.try_deserialize()
    }
}
