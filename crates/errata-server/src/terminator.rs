//! Final stage turning a handler error into the response sent to the client

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use errata_core::status::INTERNAL_SERVER_ERROR_MESSAGE;
use errata_core::{ErrorFormatter, ErrorPayload, classify};
use http::StatusCode;
use http::header::{self, HeaderValue};
use thiserror::Error;

use crate::APPLICATION_JSON;
use crate::failure::PendingFailure;
use crate::render::ViewRenderer;

/// Failure to produce the error response itself
#[derive(Debug, Error)]
pub enum TerminateError {
    /// The formatter's payload could not be serialized
    #[error("failed to encode error body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for TerminateError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "failed to write error response");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_MESSAGE).into_response()
    }
}

type Encoder = dyn Fn(&(dyn StdError + 'static), u16) -> serde_json::Result<Vec<u8>> + Send + Sync;

/// Writes errors as JSON
///
/// Without a formatter the body is the flat `{"message", "code"}` payload.
#[derive(Clone, Default)]
pub struct JsonTerminator {
    formatter: Option<Arc<Encoder>>,
}

impl JsonTerminator {
    /// Terminator using the flat payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminator serializing whatever `formatter` returns
    pub fn with_formatter<F: ErrorFormatter>(formatter: F) -> Self {
        let encode = move |err: &(dyn StdError + 'static), status: u16| serde_json::to_vec(&formatter.format(err, status));

        Self {
            formatter: Some(Arc::new(encode)),
        }
    }

    /// Classify `err` and build the JSON response
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized
    pub fn respond(&self, err: &(dyn StdError + 'static)) -> Result<Response, TerminateError> {
        let classified = classify(err);
        let status = classified.status_code();

        let body = match self.formatter {
            Some(ref encode) => encode(err, classified.status)?,
            None => serde_json::to_vec(&ErrorPayload::new(classified.message, classified.status))?,
        };

        let content_type = [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))];
        Ok((status, content_type, body).into_response())
    }
}

impl fmt::Debug for JsonTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonTerminator")
            .field("custom_formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Writes errors through a template, falling back to plain text
#[derive(Clone)]
pub struct ViewTerminator {
    renderer: Arc<dyn ViewRenderer>,
    template: String,
    layouts: Vec<String>,
}

impl ViewTerminator {
    /// Terminator rendering `template` inside `layouts`
    pub fn new(renderer: Arc<dyn ViewRenderer>, template: impl Into<String>, layouts: Vec<String>) -> Self {
        Self {
            renderer,
            template: template.into(),
            layouts,
        }
    }

    /// Classify `err` and render the error view
    ///
    /// A render failure is logged and answered with the message as plain
    /// text under the same status; it never reaches the caller.
    pub fn respond(&self, err: &(dyn StdError + 'static)) -> Response {
        let classified = classify(err);
        let status = classified.status_code();

        let data = serde_json::json!({
            "error": classified.message,
            "code": classified.status,
        });

        match self.renderer.render(&self.template, &data, &self.layouts) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(render_err) => {
                tracing::error!(
                    error = %render_err,
                    template = %self.template,
                    code = classified.status,
                    "failed to render error view"
                );
                (status, classified.message).into_response()
            }
        }
    }
}

impl fmt::Debug for ViewTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTerminator")
            .field("template", &self.template)
            .field("layouts", &self.layouts)
            .finish_non_exhaustive()
    }
}

/// The configured way of answering failed requests
#[derive(Debug, Clone)]
pub enum Terminator {
    /// JSON body
    Json(JsonTerminator),
    /// Rendered template
    View(ViewTerminator),
}

impl Terminator {
    /// Build the final response for `err`
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON payload cannot be serialized
    pub fn respond(&self, err: &(dyn StdError + 'static)) -> Result<Response, TerminateError> {
        match self {
            Self::Json(json) => json.respond(err),
            Self::View(view) => Ok(view.respond(err)),
        }
    }
}

impl Default for Terminator {
    fn default() -> Self {
        Self::Json(JsonTerminator::new())
    }
}

/// Middleware replacing handler failures with the terminator's response
///
/// Responses without a pending failure pass through untouched. The `Allow`
/// header axum sets on 405 placeholders is carried over.
pub async fn terminate(
    State(terminator): State<Arc<Terminator>>,
    request: Request,
    next: Next,
) -> Result<Response, TerminateError> {
    let mut response = next.run(request).await;

    let Some(pending) = response.extensions_mut().remove::<PendingFailure>() else {
        return Ok(response);
    };

    let mut terminated = terminator.respond(pending.error())?;
    if let Some(allow) = response.headers_mut().remove(header::ALLOW) {
        terminated.headers_mut().insert(header::ALLOW, allow);
    }

    Ok(terminated)
}
