use super::{ConfigError, QuarryConfig};

/// A typed group of keys sharing one prefix.
///
/// ```ignore
/// let search: SearchConfig = config.section()?;
/// ```
pub trait ConfigSection: Sized {
    /// Dot-separated prefix every key of the section lives under.
    fn prefix() -> &'static str;

    fn from_config(config: &QuarryConfig) -> Result<Self, ConfigError>;

    /// Full key of `name` inside this section.
    fn key(name: &str) -> String {
        format!("{}.{name}", Self::prefix())
    }
}

/// Process-wide search defaults (`search.*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Default page-size ceiling; `0` means none.
    pub max_size: u64,
    /// Default tracing filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_size: 0,
            log_level: "warn".to_string(),
        }
    }
}

impl ConfigSection for SearchConfig {
    fn prefix() -> &'static str {
        "search"
    }

    fn from_config(config: &QuarryConfig) -> Result<Self, ConfigError> {
        let defaults = SearchConfig::default();
        Ok(SearchConfig {
            max_size: config.get_or(&Self::key("maxsize"), defaults.max_size)?,
            log_level: config.get_or(&Self::key("log.level"), defaults.log_level)?,
        })
    }
}
