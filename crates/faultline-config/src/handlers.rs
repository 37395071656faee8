use serde::Deserialize;

/// Which transport adapters register with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct HandlersConfig {
    /// Handlers returning `Result<_, HandlerError>`
    #[serde(default = "default_blocking")]
    pub enable_blocking_style: bool,
    /// Responses carrying a fault in their extensions
    #[serde(default)]
    pub enable_reactive_style: bool,
    /// Extractor rejections from `ValidJson` / `ValidQuery`
    #[serde(default)]
    pub enable_annotated_style: bool,
}

impl HandlersConfig {
    /// Whether any adapter is switched on
    pub const fn any_enabled(&self) -> bool {
        self.enable_blocking_style || self.enable_reactive_style || self.enable_annotated_style
    }
}

impl Default for HandlersConfig {
    fn default() -> Self {
        Self {
            enable_blocking_style: true,
            enable_reactive_style: false,
            enable_annotated_style: false,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_blocking() -> bool {
    true
}
