use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use errata_core::{Canceled, ClassifiedError, DeadlineExceeded, HttpError, StatusError};

/// Error returned by handlers
///
/// Anything convertible into `anyhow::Error` converts into a `Failure`, so
/// `?` works on any error type. The response it produces is a placeholder
/// carrying the classified status; the terminator layer swaps in the real
/// body.
pub struct Failure(anyhow::Error);

impl Failure {
    /// Failure with an explicit status and client-facing message
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self(StatusError::new(code, message).into())
    }

    /// The client went away before the handler finished
    pub fn canceled() -> Self {
        Self(Canceled.into())
    }

    /// The handler ran past its deadline
    pub fn deadline_exceeded() -> Self {
        Self(DeadlineExceeded.into())
    }

    /// Lift a domain error that knows its own status
    pub fn http<E>(err: E) -> Self
    where
        E: HttpError + Send + Sync + 'static,
    {
        Self(StatusError::from_http(err).into())
    }

    /// Lift an extractor rejection, keeping its status and text
    ///
    /// Take the extractor as `Result<T, T::Rejection>` and map the error
    /// with this so malformed requests are answered by the terminator.
    pub fn rejection<R>(rejection: R) -> Self
    where
        R: IntoResponse + fmt::Display,
    {
        let message = rejection.to_string();
        let status = rejection.into_response().status();

        Self::status(status.as_u16(), message)
    }

    /// Borrow the underlying error
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }

    /// Unwrap into the underlying `anyhow::Error`
    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}

impl<E> From<E> for Failure
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = ClassifiedError::from_error(self.as_error()).status_code();

        let mut response = status.into_response();
        response.extensions_mut().insert(PendingFailure(Arc::new(self.0)));
        response
    }
}

/// Handler error waiting in response extensions for the terminator
#[derive(Clone)]
pub(crate) struct PendingFailure(pub(crate) Arc<anyhow::Error>);

impl PendingFailure {
    pub(crate) fn error(&self) -> &(dyn StdError + 'static) {
        &**self.0
    }
}
