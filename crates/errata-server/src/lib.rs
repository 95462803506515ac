//! Axum middleware normalizing how responses leave the application
//!
//! Handlers return [`Failure`] on error. The [`terminate`] layer classifies
//! it and writes the final JSON or HTML body, and [`negotiate_json`] marks
//! JSON bodies of successful responses with the right content type.
//! [`Normalizer`] wires both, plus an optional request deadline, from
//! configuration.

#![allow(clippy::must_use_candidate)]

mod failure;
mod negotiate;
mod render;
mod terminator;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use errata_config::{Config, ErrorFormat, ErrorShape};
use errata_core::{EnvelopeFormatter, StatusError};
use http::StatusCode;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};

pub use failure::Failure;
pub use negotiate::{NegotiationLimits, negotiate_json};
pub use render::{RenderError, ViewRenderer};
pub use terminator::{JsonTerminator, TerminateError, Terminator, ViewTerminator, terminate};

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Response normalization stack for a router
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    terminator: Arc<Terminator>,
    negotiation: Option<NegotiationLimits>,
    request_timeout: Option<Duration>,
}

impl Normalizer {
    /// Stack with only the given terminator
    pub fn new(terminator: Terminator) -> Self {
        Self {
            terminator: Arc::new(terminator),
            negotiation: None,
            request_timeout: None,
        }
    }

    /// Run the JSON content negotiator inside the terminator
    #[must_use]
    pub const fn with_negotiation(mut self, limits: NegotiationLimits) -> Self {
        self.negotiation = Some(limits);
        self
    }

    /// Abort requests running longer than `timeout` with a 408 error response
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the stack described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the view format is selected without a renderer or
    /// template, or if the request timeout is invalid
    pub fn from_config(config: &Config, renderer: Option<Arc<dyn ViewRenderer>>) -> anyhow::Result<Self> {
        let terminator = match config.errors.format {
            ErrorFormat::Json => match config.errors.shape {
                ErrorShape::Flat => Terminator::Json(JsonTerminator::new()),
                ErrorShape::Envelope => Terminator::Json(JsonTerminator::with_formatter(EnvelopeFormatter)),
            },
            ErrorFormat::View => {
                let Some(renderer) = renderer else {
                    anyhow::bail!("errors.format is 'view' but no view renderer was provided");
                };
                let Some(ref template) = config.errors.view.template else {
                    anyhow::bail!("errors.view.template is required when errors.format is 'view'");
                };

                Terminator::View(ViewTerminator::new(
                    renderer,
                    template.clone(),
                    config.errors.view.layouts.clone(),
                ))
            }
        };

        let mut normalizer = Self::new(terminator);

        if config.negotiation.enabled {
            normalizer = normalizer.with_negotiation(NegotiationLimits {
                max_body_bytes: config.negotiation.max_body_bytes,
            });
        }

        if let Some(timeout) = config.errors.request_timeout()? {
            normalizer = normalizer.with_request_timeout(timeout);
        }

        Ok(normalizer)
    }

    /// Shared terminator, for answering errors raised outside the router
    pub fn terminator(&self) -> Arc<Terminator> {
        Arc::clone(&self.terminator)
    }

    /// Wrap every route of `router` in the stack
    ///
    /// Unmatched paths and unsupported methods are answered through the
    /// terminator as 404 and 405, replacing any fallback already set on
    /// `router`. Extractor rejections are lifted with [`Failure::rejection`].
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router = router
            .fallback(route_not_found)
            .method_not_allowed_fallback(method_not_allowed);

        // Innermost first
        if let Some(limits) = self.negotiation {
            router = router.layer(axum::middleware::from_fn_with_state(limits, negotiate_json));
        }

        router = router.layer(axum::middleware::from_fn_with_state(
            Arc::clone(&self.terminator),
            terminate,
        ));

        if let Some(timeout) = self.request_timeout {
            let terminator = Arc::clone(&self.terminator);

            router = router.layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(move |err: BoxError| {
                        let terminator = Arc::clone(&terminator);
                        async move {
                            tracing::debug!(error = %err, "request aborted by timeout layer");
                            terminator.respond(&*err)
                        }
                    }))
                    .layer(TimeoutLayer::new(timeout)),
            );
        }

        router
    }
}

async fn route_not_found() -> Failure {
    Failure::from(StatusError::from_code(StatusCode::NOT_FOUND.as_u16()))
}

async fn method_not_allowed() -> Failure {
    Failure::from(StatusError::from_code(StatusCode::METHOD_NOT_ALLOWED.as_u16()))
}
