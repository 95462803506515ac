use std::error::Error as StdError;

use http::StatusCode;

use crate::StatusError;
use crate::sentinel::{self, is_cancellation, is_deadline_exceeded};
use crate::status::{
    CLIENT_CLOSED_REQUEST, CLIENT_CLOSED_REQUEST_MESSAGE, INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_MESSAGE,
    REQUEST_TIMEOUT, REQUEST_TIMEOUT_MESSAGE, canonical_text, to_status_code,
};

/// Outcome of classifying a handler error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    /// Resolved status code
    pub status: u16,
    /// Message safe to send to the client
    pub message: String,
    /// Whether the error is a server fault worth logging
    pub should_log: bool,
}

impl ClassifiedError {
    /// Classify without emitting anything
    #[must_use]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let status = resolve_status(err);

        Self {
            status,
            message: message_for(err, status),
            should_log: wire_status(status) >= INTERNAL_SERVER_ERROR,
        }
    }

    /// Status to put on the wire
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        to_status_code(self.status)
    }
}

/// Classify an error and log it when it is a server fault
///
/// Exactly one error event is emitted for statuses of 500 and above;
/// anything lower is considered client-caused and stays quiet.
pub fn classify(err: &(dyn StdError + 'static)) -> ClassifiedError {
    let classified = ClassifiedError::from_error(err);

    if classified.should_log {
        tracing::error!(error = %err, code = classified.status, "http handler error");
    }

    classified
}

/// Client-facing message for `err` once its status is known
///
/// Server errors never expose the error text. Codes with no wire
/// representation go out as 500 and are treated as server errors here too.
///
/// Client errors use the outermost `Display` text only. Context layers and
/// sources are not joined in, so a `StatusError` built with
/// [`StatusError::with_source`] never leaks its cause.
#[must_use]
pub fn message_for(err: &(dyn StdError + 'static), status: u16) -> String {
    match wire_status(status) {
        CLIENT_CLOSED_REQUEST => CLIENT_CLOSED_REQUEST_MESSAGE.to_owned(),
        REQUEST_TIMEOUT => canonical_text(status).unwrap_or(REQUEST_TIMEOUT_MESSAGE).to_owned(),
        code if code >= INTERNAL_SERVER_ERROR => canonical_text(code).unwrap_or(INTERNAL_SERVER_ERROR_MESSAGE).to_owned(),
        _ => err.to_string(),
    }
}

fn wire_status(status: u16) -> u16 {
    to_status_code(status).as_u16()
}

fn resolve_status(err: &(dyn StdError + 'static)) -> u16 {
    // Sentinels outrank any code embedded further up the chain
    if is_cancellation(err) {
        return CLIENT_CLOSED_REQUEST;
    }

    if is_deadline_exceeded(err) {
        return REQUEST_TIMEOUT;
    }

    sentinel::chain(err)
        .find_map(|link| link.downcast_ref::<StatusError>())
        .map_or(INTERNAL_SERVER_ERROR, StatusError::code)
}
