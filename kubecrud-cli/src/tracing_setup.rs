//! Console logging for the kubecrud binary
//!
//! `RUST_LOG` wins when set; otherwise `--debug` picks between the two
//! built-in filters below.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Filter used without `--debug`. sqlx logs every statement at info.
const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Filter used with `--debug`. HTTP client internals stay quiet.
const DEBUG_FILTER: &str = "debug,hyper=info,hyper_util=info,rustls=info,tower=info";

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    pub debug: bool,
}

impl TracingConfig {
    fn fallback_filter(&self) -> &'static str {
        if self.debug {
            DEBUG_FILTER
        } else {
            DEFAULT_FILTER
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.fallback_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_selects_filter() {
        assert_eq!(TracingConfig::default().fallback_filter(), DEFAULT_FILTER);
        assert_eq!(TracingConfig { debug: true }.fallback_filter(), DEBUG_FILTER);
    }

    #[test]
    fn fallback_filters_parse() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new(DEBUG_FILTER).is_ok());
    }
}
