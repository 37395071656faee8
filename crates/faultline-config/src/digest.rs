use serde::Deserialize;

/// Stack digest limits
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct DigestConfig {
    /// Symbol prefix identifying this service's own frames
    #[serde(default)]
    pub own_code_prefix: String,
    #[serde(default = "default_kept_frames")]
    pub kept_frames: usize,
    #[serde(default = "default_search_window")]
    pub search_window: usize,
}

impl DigestConfig {
    pub fn new(own_code_prefix: impl Into<String>) -> Self {
        Self {
            own_code_prefix: own_code_prefix.into(),
            ..Self::default()
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            own_code_prefix: String::new(),
            kept_frames: default_kept_frames(),
            search_window: default_search_window(),
        }
    }
}

const fn default_kept_frames() -> usize {
    15
}

const fn default_search_window() -> usize {
    100
}
