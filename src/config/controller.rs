//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::config::{env_var_or_default, env_var_or_default_bool, env_var_or_default_str};
use crate::constants::{
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_WATCH_ANNOTATION, DEFAULT_WATCH_NAMESPACE,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespaces reconciled on every tick, in order
    pub watch_namespaces: Vec<String>,
    /// Interval between reconciliation ticks (seconds)
    pub poll_interval_secs: u64,
    /// Annotation that opts a Deployment in
    pub watch_annotation: String,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watch_namespaces: vec![DEFAULT_WATCH_NAMESPACE.to_string()],
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            watch_annotation: DEFAULT_WATCH_ANNOTATION.to_string(),
            log_level: "INFO".to_string(),
            log_format: "text".to_string(),
            log_enable_color: false,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            watch_namespaces: parse_namespaces(&env_var_or_default_str(
                "WATCH_NAMESPACES",
                DEFAULT_WATCH_NAMESPACE,
            )),
            poll_interval_secs: env_var_or_default(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            ),
            watch_annotation: env_var_or_default_str("WATCH_ANNOTATION", DEFAULT_WATCH_ANNOTATION),
            log_level: env_var_or_default_str("LOG_LEVEL", "INFO"),
            log_format: env_var_or_default_str("LOG_FORMAT", "text"),
            log_enable_color: env_var_or_default_bool("LOG_ENABLE_COLOR", false),
        }
    }

    /// Get poll interval duration
    ///
    /// Never zero; a zero interval would spin the loop.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Split a comma separated namespace list, dropping blanks and duplicates
///
/// Falls back to the default namespace when nothing remains.
#[must_use]
pub fn parse_namespaces(raw: &str) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();
    for namespace in raw.split(',').map(str::trim).filter(|ns| !ns.is_empty()) {
        if !namespaces.iter().any(|existing| existing == namespace) {
            namespaces.push(namespace.to_string());
        }
    }
    if namespaces.is_empty() {
        namespaces.push(DEFAULT_WATCH_NAMESPACE.to_string());
    }
    namespaces
}
