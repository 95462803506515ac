//! Wire shapes for error bodies and the formatter strategy that produces them

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::message_for;

/// Flat error body: `{"message": "...", "code": 404, "details": ...}`
///
/// `code` is omitted when zero and `details` when absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Client-facing message
    pub message: String,
    /// HTTP status code
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: u16,
    /// Arbitrary structured context
    #[serde(default, skip_serializing_if = "is_empty")]
    pub details: Option<Value>,
}

impl ErrorPayload {
    /// Payload without details
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Nested error body: `{"error": {"message": "...", "code": 404}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Wrapped payload
    pub error: ErrorPayload,
}

impl From<ErrorPayload> for ErrorEnvelope {
    fn from(error: ErrorPayload) -> Self {
        Self { error }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(code: &u16) -> bool {
    *code == 0
}

#[allow(clippy::ref_option)]
const fn is_empty(details: &Option<Value>) -> bool {
    matches!(details, None | Some(Value::Null))
}

/// Strategy turning an error and its resolved status into a response body
///
/// Closures of the form `|err: &(dyn Error + 'static), code: u16| payload`
/// implement this trait, so hosts can plug in their own wire format.
pub trait ErrorFormatter: Send + Sync + 'static {
    /// Serializable body
    type Payload: Serialize;

    /// Build the body for `err`, already classified as `status`
    fn format(&self, err: &(dyn StdError + 'static), status: u16) -> Self::Payload;
}

impl<F, P> ErrorFormatter for F
where
    F: Fn(&(dyn StdError + 'static), u16) -> P + Send + Sync + 'static,
    P: Serialize,
{
    type Payload = P;

    fn format(&self, err: &(dyn StdError + 'static), status: u16) -> P {
        self(err, status)
    }
}

/// Produces the flat [`ErrorPayload`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl ErrorFormatter for DefaultFormatter {
    type Payload = ErrorPayload;

    fn format(&self, err: &(dyn StdError + 'static), status: u16) -> ErrorPayload {
        ErrorPayload::new(message_for(err, status), status)
    }
}

/// Produces the nested [`ErrorEnvelope`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeFormatter;

impl ErrorFormatter for EnvelopeFormatter {
    type Payload = ErrorEnvelope;

    fn format(&self, err: &(dyn StdError + 'static), status: u16) -> ErrorEnvelope {
        DefaultFormatter.format(err, status).into()
    }
}
