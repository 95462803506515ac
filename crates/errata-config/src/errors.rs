use std::time::Duration;

use serde::Deserialize;

/// Error response configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorsConfig {
    /// Body format for error responses
    #[serde(default)]
    pub format: ErrorFormat,
    /// JSON layout, used when `format` is `json`
    #[serde(default)]
    pub shape: ErrorShape,
    /// Template settings, used when `format` is `view`
    #[serde(default)]
    pub view: ViewConfig,
    /// Deadline for a whole request (e.g. "30s"); elapsed requests get 408
    #[serde(default)]
    pub request_timeout: Option<String>,
}

impl ErrorsConfig {
    /// Parsed request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the duration string cannot be parsed or is zero
    pub fn request_timeout(&self) -> anyhow::Result<Option<Duration>> {
        let Some(ref raw) = self.request_timeout else {
            return Ok(None);
        };

        let timeout = duration_str::parse(raw)
            .map_err(|e| anyhow::anyhow!("invalid errors.request_timeout '{raw}': {e}"))?;

        if timeout.is_zero() {
            anyhow::bail!("errors.request_timeout must be greater than zero");
        }

        Ok(Some(timeout))
    }
}

/// Error body format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFormat {
    /// Serialized JSON payload
    #[default]
    Json,
    /// Rendered template with a plain-text fallback
    View,
}

/// JSON error body layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorShape {
    /// `{"message": ..., "code": ...}`
    #[default]
    Flat,
    /// `{"error": {"message": ..., "code": ...}}`
    Envelope,
}

/// Error view template settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    /// Template identifier handed to the renderer
    #[serde(default)]
    pub template: Option<String>,
    /// Layout identifiers, passed through in order
    #[serde(default)]
    pub layouts: Vec<String>,
}
