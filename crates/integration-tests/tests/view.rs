mod harness;

use std::sync::Arc;

use errata_config::Config;
use errata_server::{RenderError, ViewRenderer};
use harness::app::router;
use harness::server::TestServer;
use serde_json::Value;

const VIEW_CONFIG: &str = r#"
[errors]
format = "view"

[errors.view]
template = "errors/default"
layouts = ["layouts/main"]
"#;

fn page_renderer() -> Arc<dyn ViewRenderer> {
    Arc::new(|template: &str, data: &Value, layouts: &[String]| {
        if template != "errors/default" {
            return Err(RenderError::TemplateNotFound(template.to_owned()));
        }
        Ok(format!(
            "<main data-layout=\"{}\"><h1>{}</h1><p>{}</p></main>",
            layouts.join(","),
            data["code"],
            data["error"].as_str().unwrap_or_default()
        ))
    })
}

fn broken_renderer() -> Arc<dyn ViewRenderer> {
    Arc::new(|_: &str, _: &Value, _: &[String]| Err(RenderError::Failed("unexpected end of template".to_owned())))
}

#[tokio::test]
async fn errors_render_through_the_template() {
    let config = Config::from_toml_str(VIEW_CONFIG).unwrap();
    let server = TestServer::start_with_renderer(&config, Some(page_renderer()), router())
        .await
        .unwrap();

    let resp = server.client().get(server.url("/fail/not-found")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
    insta::assert_snapshot!(
        resp.text().await.unwrap(),
        @r#"<main data-layout="layouts/main"><h1>404</h1><p>user not found</p></main>"#
    );
}

#[tokio::test]
async fn render_failure_falls_back_to_plain_text() {
    let config = Config::from_toml_str(VIEW_CONFIG).unwrap();
    let server = TestServer::start_with_renderer(&config, Some(broken_renderer()), router())
        .await
        .unwrap();

    let resp = server.client().get(server.url("/fail/database")).send().await.unwrap();

    assert_eq!(resp.status(), 500);
    assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(resp.text().await.unwrap(), "Internal Server Error");
}

#[tokio::test]
async fn view_format_without_renderer_fails_to_start() {
    let config = Config::from_toml_str(VIEW_CONFIG).unwrap();

    let err = TestServer::start(&config, router()).await.err().unwrap();

    assert!(err.to_string().contains("no view renderer"));
}
