use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_STRUCTURE_LIMIT: usize = 500;
pub const DEFAULT_CONTENT_LIMIT: usize = 12;
pub const DEFAULT_MAX_FILE_CHARS: usize = 50_000;

/// Tunables for one aggregation run. Every field has a default, so an empty
/// YAML/JSON object deserialises to [`AggregatorConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub api_base_url: String,
    pub user_agent: String,
    /// Maximum number of blob paths listed in the structure text.
    pub structure_limit: usize,
    /// Maximum number of files whose content is fetched.
    pub content_limit: usize,
    /// Decoded file text is cut to this many characters.
    pub max_file_chars: usize,
    /// Upper bound on concurrent content requests per repository; `None` fetches all at once.
    pub fetch_concurrency: Option<usize>,
    pub metadata_timeout_secs: u64,
    pub content_timeout_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("repo-lens/", env!("CARGO_PKG_VERSION")).to_string(),
            structure_limit: DEFAULT_STRUCTURE_LIMIT,
            content_limit: DEFAULT_CONTENT_LIMIT,
            max_file_chars: DEFAULT_MAX_FILE_CHARS,
            fetch_concurrency: None,
            metadata_timeout_secs: 10,
            content_timeout_secs: 30,
        }
    }
}

impl AggregatorConfig {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }

    pub fn trace_loaded(&self) {
        info!(
            api_base_url = %self.api_base_url,
            structure_limit = self.structure_limit,
            content_limit = self.content_limit,
            max_file_chars = self.max_file_chars,
            fetch_concurrency = ?self.fetch_concurrency,
            "Loaded AggregatorConfig"
        );
        debug!(?self, "AggregatorConfig loaded (full debug)");
    }
}
