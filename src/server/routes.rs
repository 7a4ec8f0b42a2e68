//! HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::ServerState;
use crate::benchmark::{
    BenchmarkError, BenchmarkParams, BenchmarkRequest, BenchmarkResult, BenchmarkRunner,
    ValidationError, MAX_DURATION_SECS, RPS_PRESETS,
};
use crate::rpc::RpcMethod;

/// API error rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Rejected { status: StatusCode, message: String },
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Rejected { status, message } => (status, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<BenchmarkError> for ApiError {
    fn from(e: BenchmarkError) -> Self {
        match e {
            BenchmarkError::Validation(v) => ApiError::Validation(v),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn methods() -> Json<Value> {
    let methods: Vec<Value> = RpcMethod::all()
        .into_iter()
        .map(|m| {
            json!({
                "name": m.name(),
                "params": m.params(),
                "description": m.description(),
            })
        })
        .collect();

    Json(json!({
        "methods": methods,
        "rpsPresets": RPS_PRESETS,
        "maxDurationSeconds": MAX_DURATION_SECS,
    }))
}

/// Run one benchmark and return its result.
///
/// The run continues in its own task; if the caller disconnects, the drop
/// guard cancels it and the partial result is only logged.
pub async fn run_benchmark(
    State(state): State<ServerState>,
    payload: Result<Json<BenchmarkParams>, JsonRejection>,
) -> Result<Json<BenchmarkResult>, ApiError> {
    let Json(params) = payload.map_err(|rejection| ApiError::Rejected {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;
    let request = BenchmarkRequest::try_from(params).map_err(ApiError::Validation)?;
    request
        .check_rps_limit(state.max_rps)
        .map_err(ApiError::Validation)?;

    let runner = BenchmarkRunner::new().with_timeout(state.timeout);
    let _guard = runner.cancellation_token().drop_guard();
    let runs = state.runs.clone();

    info!(
        "Benchmark requested: {} at {} ({} rps, {}s)",
        request.method, request.endpoint_url, request.rps, request.duration_seconds
    );

    let handle = tokio::spawn(async move {
        let _permit = runs
            .acquire_owned()
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let result = runner.run(&request).await?;
        if result.cancelled {
            warn!(
                "Run cancelled by client disconnect: {}",
                result.format_summary()
            );
        }
        Ok::<_, ApiError>(result)
    });

    let result = handle
        .await
        .map_err(|e| ApiError::Internal(format!("Benchmark task failed: {e}")))??;

    Ok(Json(result))
}
