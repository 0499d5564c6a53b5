use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the payments module (`modules.payments`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentsConfig {
    /// PayPal gateway endpoint and credentials.
    #[serde(default)]
    pub paypal: PayPalConfig,

    /// Card vault key material.
    #[serde(default)]
    pub cards: CardVaultConfig,
}

/// The `paypal:` block. With empty credentials the client never calls
/// the token endpoint and signs orders with a mock token instead, which
/// keeps local setups working against a stub gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PayPalConfig {
    /// Gateway base URL, sandbox by default.
    #[serde(default = "default_paypal_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Per-call timeout for gateway requests.
    #[serde(default = "default_paypal_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self {
            base_url: default_paypal_base_url(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout: default_paypal_timeout(),
        }
    }
}

fn default_paypal_base_url() -> String {
    "https://api-m.sandbox.paypal.com".to_string()
}

fn default_paypal_timeout() -> Duration {
    Duration::from_secs(10)
}

/// The `cards:` block. The key is base64 of exactly 32 bytes; the
/// baked-in value is a development fallback and real deployments
/// override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardVaultConfig {
    #[serde(default = "default_card_key")]
    pub key: String,
}

impl Default for CardVaultConfig {
    fn default() -> Self {
        Self {
            key: default_card_key(),
        }
    }
}

fn default_card_key() -> String {
    "cGV0Y2FyZS1kZXYtY2FyZC12YXVsdC1rZXktMzItYiE=".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_defaults_apply() {
        let cfg: PaymentsConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.paypal.base_url, "https://api-m.sandbox.paypal.com");
        assert!(cfg.paypal.client_id.is_empty());
        assert_eq!(cfg.paypal.timeout.as_secs(), 10);
        assert!(!cfg.cards.key.is_empty());
    }

    #[test]
    fn overrides_parse() {
        let cfg: PaymentsConfig = serde_json::from_value(serde_json::json!({
            "paypal": {
                "base_url": "https://api-m.paypal.com",
                "client_id": "live-id",
                "client_secret": "live-secret",
                "timeout": "3s"
            },
            "cards": { "key": "AAAA" }
        }))
        .unwrap();
        assert_eq!(cfg.paypal.base_url, "https://api-m.paypal.com");
        assert_eq!(cfg.paypal.client_id, "live-id");
        assert_eq!(cfg.paypal.timeout.as_secs(), 3);
        assert_eq!(cfg.cards.key, "AAAA");
    }
}
