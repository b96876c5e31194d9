use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Best-effort outbound callback capability. Delivery success is recorded by
/// the caller; retry policy lives outside this system.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers signed parameters to `url`. Returns true when the receiver
    /// acknowledged the notification.
    async fn deliver(&self, url: &str, params: &[(String, String)]) -> bool;
}

/// Form-POST notifier. The receiver acknowledges by answering with a body of
/// exactly "success".
pub struct HttpNotifier {
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn deliver(&self, url: &str, params: &[(String, String)]) -> bool {
        let form: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        match self.client.post(url).form(&form).send().await {
            Ok(response) => match response.text().await {
                Ok(body) => body.trim() == "success",
                Err(err) => {
                    tracing::warn!(url, %err, "notification response unreadable");
                    false
                }
            },
            Err(err) => {
                tracing::warn!(url, %err, "notification delivery failed");
                false
            }
        }
    }
}

/// Signs outbound parameters: keys sorted ascending, concatenated as
/// `k=v&...`, secret key appended, SHA-256 hex digest. Empty values and the
/// sign fields themselves are excluded.
pub fn sign_params(params: &[(String, String)], key: &str) -> String {
    let mut sorted: Vec<&(String, String)> = params
        .iter()
        .filter(|(k, v)| !v.is_empty() && k != "sign" && k != "sign_type")
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sign_is_order_independent() {
        let a = sign_params(&params(&[("b", "2"), ("a", "1")]), "secret");
        let b = sign_params(&params(&[("a", "1"), ("b", "2")]), "secret");
        assert_eq!(a, b);
    }

    #[test]
    fn test_sign_excludes_empty_and_sign_fields() {
        let base = sign_params(&params(&[("a", "1")]), "secret");
        let extended = sign_params(
            &params(&[("a", "1"), ("empty", ""), ("sign", "x"), ("sign_type", "SHA256")]),
            "secret",
        );
        assert_eq!(base, extended);
    }

    #[test]
    fn test_sign_depends_on_key() {
        let a = sign_params(&params(&[("a", "1")]), "secret");
        let b = sign_params(&params(&[("a", "1")]), "other");
        assert_ne!(a, b);
    }
}
