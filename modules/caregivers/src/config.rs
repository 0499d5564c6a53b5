use apikit::DirectoryConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the caregivers module (`modules.caregivers`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaregiversConfig {
    /// Where to reach the auth directory for display enrichment.
    #[serde(default)]
    pub directory: DirectoryConfig,
}
