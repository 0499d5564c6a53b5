use apikit::DirectoryConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the clients module (`modules.clients`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientsConfig {
    /// Where to reach the auth directory for display enrichment.
    #[serde(default)]
    pub directory: DirectoryConfig,
}
