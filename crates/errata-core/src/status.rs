//! Status codes and fallback messages used by error classification

use http::StatusCode;

/// Non-standard status for a client that went away before the response was ready
///
/// Popularised by nginx; not registered with IANA, so `http` has no reason
/// phrase for it.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Status assigned when an upstream deadline elapsed
pub const REQUEST_TIMEOUT: u16 = StatusCode::REQUEST_TIMEOUT.as_u16();

/// Default status for errors that carry no explicit code
pub const INTERNAL_SERVER_ERROR: u16 = StatusCode::INTERNAL_SERVER_ERROR.as_u16();

/// Message sent for [`CLIENT_CLOSED_REQUEST`]
pub const CLIENT_CLOSED_REQUEST_MESSAGE: &str = "client closed request";

/// Message sent for [`REQUEST_TIMEOUT`] when no reason phrase is known
pub const REQUEST_TIMEOUT_MESSAGE: &str = "request timeout";

/// Message sent for server errors when no reason phrase is known
pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

/// Canonical reason phrase for a status code, if one is registered
#[must_use]
pub fn canonical_text(code: u16) -> Option<&'static str> {
    StatusCode::from_u16(code).ok().and_then(|status| status.canonical_reason())
}

/// Convert a classified code into a wire status
///
/// `http` accepts 100..=999; anything outside that range is sent as 500.
#[must_use]
pub fn to_status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
