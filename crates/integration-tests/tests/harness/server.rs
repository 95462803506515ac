//! Test server wrapper serving a normalized router on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use errata_config::Config;
use errata_server::{Normalizer, ViewRenderer};
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a server with the stack described by `config` around `router`
    pub async fn start(config: &Config, router: Router) -> anyhow::Result<Self> {
        Self::start_with_renderer(config, None, router).await
    }

    /// Same as [`TestServer::start`], with a template renderer for the view format
    pub async fn start_with_renderer(
        config: &Config,
        renderer: Option<Arc<dyn ViewRenderer>>,
        router: Router,
    ) -> anyhow::Result<Self> {
        let router = Normalizer::from_config(config, renderer)?.apply(router);
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// Absolute URL for `path` on the running server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET `path` announcing that JSON is acceptable
    pub async fn get_json(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
