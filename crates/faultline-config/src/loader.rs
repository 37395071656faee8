use std::path::Path;

use crate::{Config, ConfigError};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `${VAR}` placeholders, then deserializes and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::parse(&raw)?;
        tracing::debug!(path = %path.display(), "loaded fault translation config");

        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns the first rule the configuration breaks
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.digest.own_code_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyOwnCodePrefix);
        }

        if self.digest.kept_frames == 0 {
            return Err(ConfigError::NoKeptFrames);
        }

        if self.digest.search_window < self.digest.kept_frames {
            return Err(ConfigError::SearchWindowTooSmall {
                kept_frames: self.digest.kept_frames,
                search_window: self.digest.search_window,
            });
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }

        if !self.handlers.any_enabled() {
            tracing::warn!("no fault translation adapter is enabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn full_document() {
        let config = Config::parse(
            r#"
            [handlers]
            enable-blocking-style = false
            enable-reactive-style = true
            enable-annotated-style = true

            [digest]
            own-code-prefix = "orders_api"
            kept-frames = 10
            search-window = 50

            [logging]
            filter = "faultline=debug"
            json = true
            "#,
        )
        .unwrap();

        assert!(!config.handlers.enable_blocking_style);
        assert!(config.handlers.enable_reactive_style);
        assert!(config.handlers.enable_annotated_style);
        assert_eq!(config.digest.own_code_prefix, "orders_api");
        assert_eq!(config.digest.kept_frames, 10);
        assert_eq!(config.digest.search_window, 50);
        assert_eq!(config.logging.filter, "faultline=debug");
        assert!(config.logging.json);
    }

    #[test]
    fn defaults_apply() {
        let config = Config::parse("[digest]\nown-code-prefix = \"orders_api\"\n").unwrap();
        assert!(config.handlers.enable_blocking_style);
        assert!(!config.handlers.enable_reactive_style);
        assert!(!config.handlers.enable_annotated_style);
        assert_eq!(config.digest.kept_frames, 15);
        assert_eq!(config.digest.search_window, 100);
        assert_eq!(config.logging.filter, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse("[handlers]\nenable-soap-style = true\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        assert_eq!(Config::default().validate(), Err(ConfigError::EmptyOwnCodePrefix));
    }

    #[test]
    fn zero_kept_frames_is_rejected() {
        let mut config = Config::with_own_code_prefix("orders_api");
        config.digest.kept_frames = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoKeptFrames));
    }

    #[test]
    fn window_smaller_than_kept_is_rejected() {
        let mut config = Config::with_own_code_prefix("orders_api");
        config.digest.search_window = 5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::SearchWindowTooSmall {
                kept_frames: 15,
                search_window: 5
            })
        );
    }

    #[test]
    fn prefix_from_environment() {
        temp_env::with_var("FL_OWN_CODE", Some("billing_svc"), || {
            let config = Config::parse("[digest]\nown-code-prefix = \"${FL_OWN_CODE}\"\n").unwrap();
            assert_eq!(config.digest.own_code_prefix, "billing_svc");
        });
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[digest]\nown-code-prefix = \"orders_api\"\n[handlers]\nenable-reactive-style = true").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.handlers.enable_reactive_style);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Config::load(Path::new("/nonexistent/faultline.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/faultline.toml"));
    }
}
