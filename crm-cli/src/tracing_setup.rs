//! Tracing setup for the crm binary
//!
//! Usage:
//!   crm --debug ...               # Debug logging to console
//!   APP_MODE=release crm serve    # Info level, no targets
//!   RUST_LOG=crm_server=trace crm # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                      # Log filter (overrides the mode default)
//!   APP_MODE                      # `release` selects info, anything else debug

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Debug level unless RUST_LOG says otherwise
    pub debug: bool,
}

impl TracingConfig {
    /// `--debug` wins; otherwise debug unless `APP_MODE=release`.
    pub fn resolve(debug_flag: bool, app_mode: Option<&str>) -> Self {
        Self {
            debug: debug_flag || app_mode != Some("release"),
        }
    }

    fn default_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

/// Initialize console tracing.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_mode_is_quieter() {
        assert_eq!(TracingConfig::resolve(false, Some("release")).default_level(), "info");
        assert_eq!(TracingConfig::resolve(false, None).default_level(), "debug");
        assert_eq!(TracingConfig::resolve(true, Some("release")).default_level(), "debug");
    }
}
