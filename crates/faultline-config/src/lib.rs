#![allow(clippy::must_use_candidate)]

pub mod digest;
mod env;
mod error;
pub mod handlers;
mod loader;
pub mod logging;

use serde::Deserialize;

pub use digest::*;
pub use error::ConfigError;
pub use handlers::*;
pub use logging::*;

/// Top-level fault translation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Transport adapter switches
    #[serde(default)]
    pub handlers: HandlersConfig,
    /// Stack digest settings
    #[serde(default)]
    pub digest: DigestConfig,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Configuration with default switches and the given own-code prefix
    pub fn with_own_code_prefix(prefix: impl Into<String>) -> Self {
        Self {
            digest: DigestConfig::new(prefix),
            ..Self::default()
        }
    }
}
