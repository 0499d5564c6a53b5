//! Best-effort client for the auth directory endpoints.
//!
//! Profile modules use this to decorate their responses with account
//! display fields. Lookups never fail the outer request: transport
//! errors, non-2xx answers, and undecodable bodies degrade to "no entry"
//! after a warning.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::TracedClient;

/// `directory:` block of a profile module's config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Base URL of the auth module's HTTP surface.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-call timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(3)
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

/// The slice of the directory answer the profile views need.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub account_locked: bool,
}

#[derive(Clone)]
pub struct DirectoryClient {
    http: TracedClient,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(cfg: &DirectoryConfig) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            http: TracedClient::new(inner),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Single lookup; `None` on any failure.
    pub async fn lookup(&self, user_id: i64) -> Option<DirectoryEntry> {
        let url = format!("{}/api/auth/users/{}", self.base_url, user_id);
        match self.http.get(&url).await {
            Ok(resp) if resp.status().is_success() => match resp.json::<DirectoryEntry>().await {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(user_id, "directory body undecodable: {}", e);
                    None
                }
            },
            Ok(resp) => {
                warn!(user_id, status = %resp.status(), "directory lookup refused");
                None
            }
            Err(e) => {
                warn!(user_id, "directory unreachable: {}", e);
                None
            }
        }
    }

    /// Batch lookup keyed by user id; empty map on any failure so list
    /// rendering degrades to blanks instead of erroring.
    pub async fn lookup_many(&self, ids: &[i64]) -> HashMap<i64, DirectoryEntry> {
        if ids.is_empty() {
            return HashMap::new();
        }
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/api/auth/users?ids={}", self.base_url, joined);

        match self.http.get(&url).await {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<Vec<DirectoryEntry>>().await {
                    Ok(entries) => entries.into_iter().map(|e| (e.id, e)).collect(),
                    Err(e) => {
                        warn!(count = ids.len(), "directory batch undecodable: {}", e);
                        HashMap::new()
                    }
                }
            }
            Ok(resp) => {
                warn!(count = ids.len(), status = %resp.status(), "directory batch refused");
                HashMap::new()
            }
            Err(e) => {
                warn!(count = ids.len(), "directory unreachable: {}", e);
                HashMap::new()
            }
        }
    }
}
