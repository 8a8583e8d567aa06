//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Build the log filter
///
/// `RUST_LOG` wins when set; otherwise the configured `log_level` is used,
/// falling back to `info` when it does not parse.
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber
///
/// JSON output by default; human-readable output when `debug` is set.
pub fn init_tracing(config: &Config) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(config));

    let installed = if config.debug {
        builder.pretty().try_init()
    } else {
        builder.json().try_init()
    };

    installed.map_err(|e| {
        crate::error::Error::Internal(format!("Failed to install tracing subscriber: {}", e))
    })?;

    tracing::info!(debug = config.debug, "Logger initialized successfully");

    Ok(())
}
