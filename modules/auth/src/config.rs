use apikit::auth::JwtConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the auth module (`modules.auth` in the config file).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Token signing/verification settings shared with the whole server.
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Failed login attempts before the account is locked.
    #[serde(default = "default_max_failed_logins")]
    pub max_failed_logins: i32,

    /// Lifetime of a password reset token.
    #[serde(default = "default_reset_token_ttl", with = "humantime_serde")]
    pub reset_token_ttl: Duration,
}

fn default_max_failed_logins() -> i32 {
    5
}

fn default_reset_token_ttl() -> Duration {
    Duration::from_secs(30 * 60)
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            max_failed_logins: default_max_failed_logins(),
            reset_token_ttl: default_reset_token_ttl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AuthConfig::default();
        assert_eq!(cfg.max_failed_logins, 5);
        assert_eq!(cfg.reset_token_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn deserializes_from_module_bag_json() {
        let cfg: AuthConfig = serde_json::from_value(serde_json::json!({
            "max_failed_logins": 3,
            "reset_token_ttl": "10m",
            "jwt": { "secret": "another-secret-for-testing-only" }
        }))
        .unwrap();
        assert_eq!(cfg.max_failed_logins, 3);
        assert_eq!(cfg.reset_token_ttl, Duration::from_secs(600));
        assert_eq!(cfg.jwt.secret, "another-secret-for-testing-only");
    }
}
