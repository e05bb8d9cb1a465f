use tracing_subscriber::EnvFilter;

use crate::config::SearchConfig;

/// Initialise the global `tracing` subscriber with a standard `fmt` layer.
///
/// Respects the `RUST_LOG` environment variable. Falls back to
/// `default_level` (typically `search.log.level`) when `RUST_LOG` is not set.
///
/// Call this once, at the start of `main`. Later calls leave the installed
/// subscriber in place.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// [`init_tracing`] with the level configured in a [`SearchConfig`].
pub fn init_tracing_from(config: &SearchConfig) {
    init_tracing(&config.log_level);
}
