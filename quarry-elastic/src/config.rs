use std::time::Duration;

use quarry_core::{ConfigError, ConfigSection, QuarryConfig, SearchError};

use crate::client::ElasticClient;

/// Engine settings under `search.elastic`.
///
/// ```yaml
/// search:
///   elastic:
///     endpoint: "http://localhost:9200"
///     timeout: 5
///     window: 10000
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticConfig {
    pub endpoint: String,
    /// Per-request timeout in seconds; none when unset.
    pub timeout_secs: Option<u64>,
    /// Result window used when a search sets no size.
    pub max_window: u64,
}

impl ElasticConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:9200";

    /// Build a client for the configured endpoint.
    pub fn client(&self) -> Result<ElasticClient, SearchError> {
        let client = match self.timeout_secs {
            Some(secs) => ElasticClient::with_timeout(&self.endpoint, Duration::from_secs(secs))?,
            None => ElasticClient::new(&self.endpoint)?,
        };
        Ok(client.with_max_window(self.max_window))
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            max_window: ElasticClient::DEFAULT_MAX_WINDOW,
        }
    }
}

impl ConfigSection for ElasticConfig {
    fn prefix() -> &'static str {
        "search.elastic"
    }

    fn from_config(config: &QuarryConfig) -> Result<Self, ConfigError> {
        Ok(ElasticConfig {
            endpoint: config.get_or(&Self::key("endpoint"), Self::DEFAULT_ENDPOINT.to_string())?,
            timeout_secs: config.get_or(&Self::key("timeout"), None)?,
            max_window: config.get_or(&Self::key("window"), ElasticClient::DEFAULT_MAX_WINDOW)?,
        })
    }
}
