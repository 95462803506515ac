use serde_json::Value;
use thiserror::Error;

/// Template rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template registered under the given identifier
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The template engine failed while rendering
    #[error("render failed: {0}")]
    Failed(String),
}

/// Template engine used by the view terminator
///
/// `data` always holds `error` (the client-facing message) and `code` (the
/// status). Layouts are passed through in configuration order.
pub trait ViewRenderer: Send + Sync {
    /// Render `template` to an HTML string
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or rendering fails
    fn render(&self, template: &str, data: &Value, layouts: &[String]) -> Result<String, RenderError>;
}

impl<F> ViewRenderer for F
where
    F: Fn(&str, &Value, &[String]) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, template: &str, data: &Value, layouts: &[String]) -> Result<String, RenderError> {
        self(template, data, layouts)
    }
}
