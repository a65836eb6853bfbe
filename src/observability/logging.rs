//! # Logging
//!
//! Installs the global `tracing` subscriber.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the configured
//! level. `LOG_FORMAT=json` switches to one JSON object per line for log
//! shippers; anything else produces human-readable text.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(log_level: &str, log_format: &str, enable_color: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("deployment_flipper={}", log_level.to_lowercase()).into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if log_format.eq_ignore_ascii_case("json") {
        builder
            .json()
            .with_current_span(true)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize JSON tracing subscriber: {e}"))
    } else {
        builder
            .with_ansi(enable_color)
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize tracing subscriber: {e}"))
    }
}
