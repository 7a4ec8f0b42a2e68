//! HTTP server module
//!
//! Exposes the benchmark runner over HTTP: `POST /run` accepts a JSON
//! benchmark request and returns the result, `GET /methods` lists the
//! supported calls and `GET /health` reports liveness.

mod routes;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;

/// State shared by all handlers
#[derive(Clone)]
pub struct ServerState {
    /// Per-request timeout for every run
    pub timeout: Duration,
    /// Bounds how many benchmarks execute at once
    pub runs: Arc<Semaphore>,
    /// Highest rps a caller may request; each batch spawns this many tasks
    pub max_rps: u32,
}

impl ServerState {
    pub fn new(timeout: Duration, max_concurrent_runs: usize, max_rps: u32) -> Self {
        Self {
            timeout,
            runs: Arc::new(Semaphore::new(max_concurrent_runs.max(1))),
            max_rps,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Duration::from_secs(config.timeout_secs),
            config.max_concurrent_runs,
            config.max_rps,
        )
    }
}

/// Build the application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/methods", get(routes::methods))
        .route("/run", post(routes::run_benchmark))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: ServerState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockNode;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(ServerState::new(Duration::from_secs(5), 2, 50))
    }

    fn run_request(body: String) -> Request<Body> {
        Request::post("/run")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn post_run(body: String) -> (StatusCode, Value) {
        let response = app().oneshot(run_request(body)).await.unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn test_methods() {
        let response = app()
            .oneshot(Request::get("/methods").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["methods"].as_array().unwrap().len(), 2);
        assert_eq!(value["methods"][1]["params"], json!(["latest", false]));
        assert_eq!(value["maxDurationSeconds"], 60);
    }

    #[tokio::test]
    async fn test_run_validation_error() {
        let node = MockNode::builder().start().await;
        let body = json!({
            "endpointUrl": node.url(),
            "method": "eth_blockNumber",
            "rps": 5,
            "durationSeconds": 120
        });

        let (status, value) = post_run(body.to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].as_str().unwrap().contains("exceeds"));
        assert_eq!(node.hits(), 0);
    }

    #[tokio::test]
    async fn test_run_unknown_method() {
        let body = json!({
            "url": "http://127.0.0.1:8545",
            "method": "debug_traceTransaction",
            "rps": 5,
            "duration": 1
        });

        let (status, value) = post_run(body.to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].as_str().unwrap().contains("debug_traceTransaction"));
    }

    #[tokio::test]
    async fn test_run_malformed_json() {
        let (status, value) = post_run("{not json".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].is_string());
    }

    #[tokio::test]
    async fn test_run_success() {
        let node = MockNode::builder().start().await;
        let body = json!({
            "endpointURL": node.url(),
            "method": "eth_blockNumber",
            "headers": {"x-api-key": "k"},
            "rps": 4,
            "durationSeconds": 1,
            "includeOutcomes": true
        });

        let (status, value) = post_run(body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["totalRequests"], 4);
        assert_eq!(value["errorCount"], 0);
        assert_eq!(value["outcomes"].as_array().unwrap().len(), 4);
        assert_eq!(node.last_header("x-api-key").as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn test_run_rejects_rps_above_limit() {
        let node = MockNode::builder().start().await;
        let body = json!({
            "endpointUrl": node.url(),
            "method": "eth_blockNumber",
            "rps": 51,
            "durationSeconds": 1
        });

        let (status, value) = post_run(body.to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(value["error"].as_str().unwrap().contains("limit of 50"));
        assert_eq!(node.hits(), 0);
    }

    #[tokio::test]
    async fn test_run_cancelled_on_disconnect() {
        let node = MockNode::builder().start().await;
        let body = json!({
            "endpointUrl": node.url(),
            "method": "eth_blockNumber",
            "rps": 2,
            "durationSeconds": 10
        });

        // Dropping the response future is what a disconnecting client looks like.
        let pending = app().oneshot(run_request(body.to_string()));
        let outcome = tokio::time::timeout(Duration::from_millis(1_500), pending).await;
        assert!(outcome.is_err());

        let hits_at_drop = node.hits();
        assert!(hits_at_drop > 0);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(node.hits(), hits_at_drop);
    }
}
