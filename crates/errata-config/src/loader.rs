use std::path::Path;

use crate::{Config, ErrorFormat};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, or
    /// validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the view format has no template, the negotiation
    /// body limit is zero, or the request timeout is invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_errors_config()?;
        self.validate_negotiation_config()?;
        Ok(())
    }

    fn validate_errors_config(&self) -> anyhow::Result<()> {
        if self.errors.format == ErrorFormat::View {
            let has_template = self
                .errors
                .view
                .template
                .as_deref()
                .is_some_and(|template| !template.trim().is_empty());

            if !has_template {
                anyhow::bail!("errors.view.template is required when errors.format is \"view\"");
            }
        }

        self.errors.request_timeout()?;

        Ok(())
    }

    fn validate_negotiation_config(&self) -> anyhow::Result<()> {
        if self.negotiation.enabled && self.negotiation.max_body_bytes == 0 {
            anyhow::bail!("negotiation.max_body_bytes must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;

    use crate::{Config, ErrorFormat, ErrorShape, LogFormat};

    #[test]
    fn empty_config_is_valid() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.errors.format, ErrorFormat::Json);
        assert!(config.negotiation.enabled);
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.log.format, LogFormat::Pretty);
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml_str(indoc! {r#"
            [errors]
            format = "json"
            shape = "envelope"
            request_timeout = "30s"

            [negotiation]
            max_body_bytes = 65536

            [log]
            filter = "errata_server=debug,info"
            format = "json"
        "#})
        .unwrap();

        assert_eq!(config.errors.shape, ErrorShape::Envelope);
        assert_eq!(
            config.errors.request_timeout().unwrap(),
            Some(std::time::Duration::from_secs(30))
        );
        assert_eq!(config.negotiation.max_body_bytes, 65_536);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn view_format_requires_template() {
        let err = Config::from_toml_str(indoc! {r#"
            [errors]
            format = "view"
        "#})
        .unwrap_err();
        assert!(err.to_string().contains("errors.view.template is required"));

        let err = Config::from_toml_str(indoc! {r#"
            [errors]
            format = "view"

            [errors.view]
            template = "  "
        "#})
        .unwrap_err();
        assert!(err.to_string().contains("errors.view.template is required"));
    }

    #[test]
    fn zero_body_limit_is_rejected() {
        let err = Config::from_toml_str(indoc! {r#"
            [negotiation]
            max_body_bytes = 0
        "#})
        .unwrap_err();
        assert!(err.to_string().contains("max_body_bytes"));

        // A disabled negotiator never buffers, so the limit is irrelevant
        let config = Config::from_toml_str(indoc! {r#"
            [negotiation]
            enabled = false
            max_body_bytes = 0
        "#});
        assert!(config.is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml_str("[errors]\ntemplate = \"x\"").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[errors]\nshape = \"envelope\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.errors.shape, ErrorShape::Envelope);
    }

    #[test]
    fn load_missing_file() {
        let err = Config::load(std::path::Path::new("/nonexistent/errata.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
