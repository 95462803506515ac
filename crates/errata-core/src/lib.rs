//! Error classification for HTTP responses
//!
//! Resolves an arbitrary error into a status code and a client-safe message,
//! detects cancellation and deadline conditions anywhere in the error chain,
//! and defines the JSON shapes used for error bodies.

#![allow(clippy::must_use_candidate)]

mod classify;
mod error;
pub mod payload;
pub mod sentinel;
pub mod status;

pub use classify::{ClassifiedError, classify, message_for};
pub use error::{HttpError, StatusError};
pub use payload::{DefaultFormatter, EnvelopeFormatter, ErrorEnvelope, ErrorFormatter, ErrorPayload};
pub use sentinel::{Canceled, DeadlineExceeded, is_cancellation, is_deadline_exceeded};
