//! In-process JSON-RPC node used by tests

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::rpc::JsonRpcRequest;

#[derive(Clone, Debug)]
enum Reply {
    Result(Value),
    RpcError { code: i64, message: String },
    Status(u16),
}

#[derive(Default)]
struct Seen {
    requests: Vec<JsonRpcRequest>,
    headers: Vec<HeaderMap>,
}

struct NodeState {
    reply: Reply,
    delay: Duration,
    hits: AtomicUsize,
    seen: Mutex<Seen>,
}

/// Builder for [`MockNode`]
pub struct MockNodeBuilder {
    reply: Reply,
    delay: Duration,
}

impl MockNodeBuilder {
    /// Respond after a fixed delay
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Respond with a bare HTTP status
    pub fn status(mut self, status: u16) -> Self {
        self.reply = Reply::Status(status);
        self
    }

    /// Respond 200 with a JSON-RPC error object
    pub fn rpc_error(mut self, code: i64, message: &str) -> Self {
        self.reply = Reply::RpcError {
            code,
            message: message.to_string(),
        };
        self
    }

    /// Bind to an ephemeral port and serve in the background
    pub async fn start(self) -> MockNode {
        let state = Arc::new(NodeState {
            reply: self.reply,
            delay: self.delay,
            hits: AtomicUsize::new(0),
            seen: Mutex::new(Seen::default()),
        });

        let app = Router::new()
            .route("/", post(handle))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockNode {
            url: format!("http://{addr}/"),
            state,
        }
    }
}

/// JSON-RPC node answering every call the same way
pub struct MockNode {
    url: String,
    state: Arc<NodeState>,
}

impl MockNode {
    /// Node answering `{"result":"0x10"}` immediately
    pub fn builder() -> MockNodeBuilder {
        MockNodeBuilder {
            reply: Reply::Result(json!("0x10")),
            delay: Duration::ZERO,
        }
    }

    pub fn url(&self) -> String {
        self.url.clone()
    }

    /// Requests received so far
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// Parsed request bodies received so far
    pub fn requests(&self) -> Vec<JsonRpcRequest> {
        self.state.seen.lock().unwrap().requests.clone()
    }

    /// Header value from the most recent request
    pub fn last_header(&self, name: &str) -> Option<String> {
        let seen = self.state.seen.lock().unwrap();
        seen.headers
            .last()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

async fn handle(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let id = request.id;
    {
        let mut seen = state.seen.lock().unwrap();
        seen.requests.push(request);
        seen.headers.push(headers);
    }

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    match &state.reply {
        Reply::Result(result) => (
            StatusCode::OK,
            Json(json!({"jsonrpc": "2.0", "id": id, "result": result})),
        )
            .into_response(),
        Reply::RpcError { code, message } => (
            StatusCode::OK,
            Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": code, "message": message}
            })),
        )
            .into_response(),
        Reply::Status(status) => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "denied").into_response()
        }
    }
}
