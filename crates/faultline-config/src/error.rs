use thiserror::Error;

/// Reasons a configuration is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable not found: `{0}`")]
    MissingVariable(String),

    #[error("unterminated placeholder on line {line}")]
    UnterminatedPlaceholder { line: usize },

    #[error("digest.own-code-prefix must not be empty")]
    EmptyOwnCodePrefix,

    #[error("digest.kept-frames must be greater than 0")]
    NoKeptFrames,

    #[error("digest.search-window ({search_window}) must not be smaller than digest.kept-frames ({kept_frames})")]
    SearchWindowTooSmall { kept_frames: usize, search_window: usize },

    #[error("logging.filter must not be empty")]
    EmptyLogFilter,
}
