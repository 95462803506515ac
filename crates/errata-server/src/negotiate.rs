//! JSON content-type normalization for successful responses
//!
//! When a client asks for JSON and the handler produced JSON-looking bytes
//! under some other content type, the header is corrected. Bodies are never
//! re-encoded, error responses are left to the terminator, and anything that
//! is not already valid JSON is passed through as-is.

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::{StreamExt as _, stream};
use http::HeaderMap;
use http::header::{self, HeaderValue};
use http_body::{Body as _, Frame};
use http_body_util::{BodyExt as _, BodyStream, StreamBody};
use serde::de::IgnoredAny;

use crate::APPLICATION_JSON;
use crate::failure::{Failure, PendingFailure};

/// Negotiator settings captured at construction
#[derive(Debug, Clone, Copy)]
pub struct NegotiationLimits {
    /// Largest body that will be buffered to check for JSON
    pub max_body_bytes: usize,
}

impl Default for NegotiationLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Middleware marking JSON bodies as `application/json` for JSON-accepting clients
///
/// Bodies are read up to `max_body_bytes` to check them. A body known to be
/// larger is never read, and a streamed body that turns out larger is
/// passed on intact with its content type unchanged.
pub async fn negotiate_json(State(limits): State<NegotiationLimits>, request: Request, next: Next) -> Response {
    let accepts_json = accepts_json(request.headers());
    let response = next.run(request).await;

    normalize(response, accepts_json, limits.max_body_bytes).await
}

/// Apply the normalization rules to a finished response
pub(crate) async fn normalize(mut response: Response, accepts_json: bool, max_body_bytes: usize) -> Response {
    // Pending handler errors belong to the terminator
    if response.extensions().get::<PendingFailure>().is_some() {
        return response;
    }

    if declares_json(response.headers()) || response.status().as_u16() >= 400 || !accepts_json {
        return response;
    }

    let size = response.body().size_hint();

    if size.exact() == Some(0) {
        mark_json(response.headers_mut());
        return response;
    }

    // Bodies known to be too large are not read
    if size.lower() > u64::try_from(max_body_bytes).unwrap_or(u64::MAX) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match read_limited(body, max_body_bytes).await {
        Ok(Buffered::Complete(bytes)) => bytes,
        Ok(Buffered::Partial(frames, rest)) => return Response::from_parts(parts, replay(frames, rest)),
        Err(err) => {
            tracing::warn!(error = %err, "failed to buffer response body for content negotiation");
            return Failure::from(err).into_response();
        }
    };

    if bytes.is_empty() || is_json(&bytes) {
        mark_json(&mut parts.headers);
    }

    Response::from_parts(parts, Body::from(bytes))
}

enum Buffered {
    /// Every data frame of the body, concatenated
    Complete(Bytes),
    /// Frames read before giving up, and the unread remainder
    Partial(Vec<Frame<Bytes>>, Body),
}

async fn read_limited(mut body: Body, limit: usize) -> Result<Buffered, axum::Error> {
    let mut frames = Vec::new();
    let mut collected = 0;

    while let Some(frame) = body.frame().await {
        let frame = frame?;

        // Trailers are never dropped; hand the body back untouched
        if frame.is_trailers() {
            frames.push(frame);
            return Ok(Buffered::Partial(frames, body));
        }

        collected += frame.data_ref().map_or(0, Bytes::len);
        frames.push(frame);

        if collected > limit {
            return Ok(Buffered::Partial(frames, body));
        }
    }

    let mut bytes = Vec::with_capacity(collected);
    for data in frames.into_iter().filter_map(|frame| frame.into_data().ok()) {
        bytes.extend_from_slice(&data);
    }

    Ok(Buffered::Complete(Bytes::from(bytes)))
}

/// Body yielding the frames already read, then the rest of `rest`
fn replay(frames: Vec<Frame<Bytes>>, rest: Body) -> Body {
    let read = stream::iter(frames.into_iter().map(Ok));
    Body::new(StreamBody::new(read.chain(BodyStream::new(rest))))
}

fn accepts_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.to_ascii_lowercase().contains(APPLICATION_JSON))
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains(APPLICATION_JSON))
}

fn is_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(bytes).is_ok()
}

fn mark_json(headers: &mut HeaderMap) {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
}
