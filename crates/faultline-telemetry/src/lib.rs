//! Log output for fault translation
//!
//! Installs a `tracing-subscriber` registry that renders the events emitted
//! by the translator's log sink as text or JSON lines.

use faultline_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured filter
pub const FILTER_ENV: &str = "RUST_LOG";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter `{filter}`: {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Initialize logging from configuration
///
/// `RUST_LOG` takes precedence over `logging.filter` when it is set.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber
/// was installed before
pub fn init(config: &LoggingConfig) -> Result<(), TelemetryError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = build_filter(config)?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json().flatten_event(true))
            .try_init()
    } else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
    };

    result.map_err(|_| TelemetryError::AlreadyInitialized)
}

/// Filter for `config`, honouring `RUST_LOG`
///
/// # Errors
///
/// Returns an error if the effective filter does not parse
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    let directives = std::env::var(FILTER_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone());

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::InvalidFilter {
        filter: directives,
        source,
    })
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    fn logging(filter: &str) -> LoggingConfig {
        LoggingConfig {
            filter: filter.to_owned(),
            json: false,
        }
    }

    #[test]
    fn configured_filter_is_used() {
        temp_env::with_var_unset(FILTER_ENV, || {
            let filter = build_filter(&logging("faultline_core=debug,warn")).unwrap();
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
        });
    }

    #[test]
    fn environment_overrides_config() {
        temp_env::with_var(FILTER_ENV, Some("error"), || {
            let filter = build_filter(&logging("debug")).unwrap();
            assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
        });
    }

    #[test]
    fn global_subscriber_installs_once() {
        let config = LoggingConfig {
            filter: "info".to_owned(),
            json: true,
        };
        init(&config).unwrap();
        assert!(matches!(init(&config), Err(TelemetryError::AlreadyInitialized)));
    }

    #[test]
    fn invalid_filter_is_reported() {
        temp_env::with_var_unset(FILTER_ENV, || {
            let err = build_filter(&logging("faultline=notalevel")).unwrap_err();
            assert!(matches!(err, TelemetryError::InvalidFilter { ref filter, .. } if filter == "faultline=notalevel"));
        });
    }
}
