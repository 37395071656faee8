//! Builder for test configurations

use faultline_config::Config;

/// Own-code prefix of the routes under test
///
/// The harness is compiled into each test binary, so handler symbols read
/// `<binary>::harness::routes::…`.
pub const OWN_CODE_PREFIX: &str = "harness::routes";

/// Fluent builder producing a validated [`Config`]
///
/// Renders TOML and goes through the regular parser so tests exercise the
/// same path a service does at startup.
pub struct ConfigBuilder {
    blocking: bool,
    reactive: bool,
    annotated: bool,
    kept_frames: usize,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            blocking: true,
            reactive: false,
            annotated: false,
            kept_frames: 15,
        }
    }

    /// Enable every adapter
    pub fn all_styles() -> Self {
        Self::new().with_reactive().with_annotated()
    }

    pub fn without_blocking(mut self) -> Self {
        self.blocking = false;
        self
    }

    pub fn with_reactive(mut self) -> Self {
        self.reactive = true;
        self
    }

    pub fn with_annotated(mut self) -> Self {
        self.annotated = true;
        self
    }

    pub fn with_kept_frames(mut self, kept_frames: usize) -> Self {
        self.kept_frames = kept_frames;
        self
    }

    pub fn build(self) -> Config {
        let toml = format!(
            r#"
            [handlers]
            enable-blocking-style = {}
            enable-reactive-style = {}
            enable-annotated-style = {}

            [digest]
            own-code-prefix = "{OWN_CODE_PREFIX}"
            kept-frames = {}
            "#,
            self.blocking, self.reactive, self.annotated, self.kept_frames
        );

        Config::parse(&toml).expect("test config must be valid")
    }
}
