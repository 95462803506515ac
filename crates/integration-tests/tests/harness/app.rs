//! Routes exercising every way a handler can finish

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use errata_core::{Canceled, StatusError};
use errata_server::Failure;
use serde_json::Value;

/// Router shared by the integration tests
pub fn router() -> Router {
    Router::new()
        .route("/ok/json-text", get(|| async { r#"{"a":1}"# }))
        .route("/ok/text", get(|| async { "plain words" }))
        .route("/ok/empty", get(|| async {}))
        .route(
            "/ok/declared",
            get(|| async { ([(header::CONTENT_TYPE, "application/json; charset=utf-8")], "[1,2,3]") }),
        )
        .route(
            "/fail/not-found",
            get(|| async { Err::<(), _>(Failure::from(StatusError::not_found("user not found"))) }),
        )
        .route(
            "/fail/database",
            get(|| async { Err::<(), _>(Failure::from(anyhow::anyhow!("connection refused (os error 111)"))) }),
        )
        .route("/fail/canceled", get(|| async { Err::<(), _>(Failure::from(Canceled)) }))
        .route("/fail/deadline", get(|| async { Err::<(), _>(Failure::deadline_exceeded()) }))
        .route(
            "/items",
            post(|payload: Result<Json<Value>, JsonRejection>| async move {
                let Json(item) = payload.map_err(Failure::rejection)?;
                Ok::<_, Failure>((StatusCode::CREATED, Json(item)))
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "too late"
            }),
        )
}
