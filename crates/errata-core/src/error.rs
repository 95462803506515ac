use std::error::Error as StdError;

use http::StatusCode;
use thiserror::Error;

use crate::status;

/// Trait for domain errors that know their own HTTP status
///
/// Implemented by application error types so they can be lifted into a
/// [`StatusError`] without the domain crate depending on axum.
pub trait HttpError: StdError {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// Error carrying an explicit HTTP status code
///
/// The code is taken as-is; it is only compared against the timeout,
/// client-closed and server-error thresholds during classification.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StatusError {
    code: u16,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl StatusError {
    /// Create an error with the given status code and client-facing message
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error whose message is the reason phrase of `code`
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        Self::new(code, status::canonical_text(code).unwrap_or("unknown status"))
    }

    /// Lift a domain error, keeping it as the source
    pub fn from_http<E>(err: E) -> Self
    where
        E: HttpError + Send + Sync + 'static,
    {
        Self {
            code: err.status_code().as_u16(),
            message: err.client_message(),
            source: Some(Box::new(err)),
        }
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST.as_u16(), message)
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED.as_u16(), message)
    }

    /// 403 Forbidden
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN.as_u16(), message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND.as_u16(), message)
    }

    /// 409 Conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT.as_u16(), message)
    }

    /// 422 Unprocessable Entity
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY.as_u16(), message)
    }

    /// 429 Too Many Requests
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS.as_u16(), message)
    }

    /// 503 Service Unavailable
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE.as_u16(), message)
    }

    /// Status code carried by this error
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Client-facing message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
