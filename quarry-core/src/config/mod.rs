mod loader;
pub mod section;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use section::{ConfigSection, SearchConfig};
pub use value::{ConfigValue, FromConfigValue};

/// Environment variable that selects the active profile.
pub const PROFILE_ENV: &str = "QUARRY_PROFILE";

/// Generic environment-name variable, consulted when [`PROFILE_ENV`] is unset.
pub const FALLBACK_PROFILE_ENV: &str = "env";

/// Profile used when neither the environment nor the caller picks one.
pub const DEFAULT_PROFILE: &str = "local";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Search configuration loaded from YAML files, `.env` files and environment
/// variables.
///
/// Resolution order (lowest to highest priority):
/// 1. `config/app.yaml`
/// 2. `config/app-{profile}.yaml`
/// 3. `.env` then `.env.{profile}` (loaded into the process environment,
///    never overwriting variables that are already set)
/// 4. Environment variables: `SEARCH_MAXSIZE` overrides `search.maxsize`
///
/// The profile is `QUARRY_PROFILE` if set, else `env`, else the argument,
/// else `"local"`.
#[derive(Debug, Clone)]
pub struct QuarryConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl QuarryConfig {
    /// Load configuration for `profile` from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    /// Like [`load`](Self::load), reading files relative to `root`.
    pub fn load_from(root: &Path, profile: &str) -> Result<Self, ConfigError> {
        let from_env = [PROFILE_ENV, FALLBACK_PROFILE_ENV]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.is_empty());
        let active_profile = match from_env {
            Some(from_env) => from_env,
            None if !profile.is_empty() => profile.to_string(),
            None => DEFAULT_PROFILE.to_string(),
        };

        let mut values = HashMap::new();
        let config_dir = root.join("config");
        loader::load_yaml_file(&config_dir.join("app.yaml"), &mut values)?;
        loader::load_yaml_file(
            &config_dir.join(format!("app-{active_profile}.yaml")),
            &mut values,
        )?;

        let _ = dotenvy::from_path(root.join(".env"));
        let _ = dotenvy::from_path(root.join(format!(".env.{active_profile}")));

        for (env_key, env_val) in std::env::vars() {
            let config_key = env_key.to_lowercase().replace('_', ".");
            values.insert(config_key, ConfigValue::String(env_val));
        }

        tracing::debug!(profile = %active_profile, keys = values.len(), "configuration loaded");
        Ok(QuarryConfig {
            values,
            profile: active_profile,
        })
    }

    /// Create a config from a YAML string (useful for testing).
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(QuarryConfig {
            values,
            profile: profile.to_string(),
        })
    }

    pub fn empty() -> Self {
        QuarryConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Get a typed value for the given dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the key does not exist, or
    /// `ConfigError::TypeMismatch` if the value cannot be converted.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get a typed value, falling back to `default` when the key is missing.
    /// A value that is present but malformed is still an error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        match self.get(key) {
            Err(ConfigError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Build a typed section from this config.
    pub fn section<S: ConfigSection>(&self) -> Result<S, ConfigError> {
        S::from_config(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_keys_are_flattened() {
        let config = QuarryConfig::from_yaml_str(
            "search:\n  maxsize: 25\n  log:\n    level: debug\n",
            "test",
        )
        .unwrap();
        assert_eq!(config.get::<u64>("search.maxsize").unwrap(), 25);
        assert_eq!(config.get::<String>("search.log.level").unwrap(), "debug");
        assert!(!config.contains_key("search.log"));
    }

    #[test]
    fn test_get_or_only_defaults_missing_keys() {
        let mut config = QuarryConfig::empty();
        assert_eq!(config.get_or("search.maxsize", 3u64).unwrap(), 3);

        config.set("search.maxsize", ConfigValue::String("lots".into()));
        assert!(matches!(
            config.get_or("search.maxsize", 3u64),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_string_values_convert() {
        let mut config = QuarryConfig::empty();
        config.set("a", ConfigValue::String("42".into()));
        config.set("b", ConfigValue::String("yes".into()));
        config.set("c", ConfigValue::String("x, y".into()));
        config.set("d", ConfigValue::Null);
        assert_eq!(config.get::<i64>("a").unwrap(), 42);
        assert!(config.get::<bool>("b").unwrap());
        assert_eq!(config.get::<Vec<String>>("c").unwrap(), vec!["x", "y"]);
        assert_eq!(config.get::<Option<u64>>("d").unwrap(), None);
    }

    #[test]
    fn test_invalid_yaml_is_a_load_error() {
        let err = QuarryConfig::from_yaml_str("search: [unclosed", "test").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
