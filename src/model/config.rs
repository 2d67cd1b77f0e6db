use serde::{Deserialize, Serialize};

use crate::ops::context_ops::clean_contexts;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GtdConfig {
    /// Allowed contexts for non-waiting actions
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Ask for a next action for each stalled project during sync.
    /// Default: see src/cli/handlers/init.rs
    #[serde(default = "default_true")]
    pub prompt_next: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig { prompt_next: true }
    }
}

fn default_true() -> bool {
    true
}

impl GtdConfig {
    /// The configured contexts, normalized, deduplicated and sorted.
    pub fn contexts(&self) -> Vec<String> {
        clean_contexts(&self.contexts)
    }
}
