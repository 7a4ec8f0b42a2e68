//! Benchmark execution engine
//!
//! Load is paced in one-second batches: batch `n` dispatches `rps` concurrent
//! calls, and batch `n + 1` starts once the one-second window of batch `n`
//! has elapsed and every call of batch `n` has resolved. The resulting load
//! profile is a step function rather than evenly spaced arrivals.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::metrics::{ErrorKind, ErrorStats, LatencyStats, MetricsCollector, RequestOutcome};
use super::request::{BenchmarkRequest, ValidationError};
use crate::http::{HttpClient, HttpError, HttpResponse};
use crate::rpc::{JsonRpcRequest, RpcMethod, RpcReply};
use crate::utils::Timer;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Length of one pacing window
pub const BATCH_WINDOW: Duration = Duration::from_secs(1);

/// Errors that prevent a benchmark from running
#[derive(Error, Debug)]
pub enum BenchmarkError {
    #[error("Invalid benchmark request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] HttpError),
}

/// Benchmark result
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    /// Target endpoint
    pub endpoint_url: String,
    /// Method benchmarked
    pub method: RpcMethod,
    /// Requested rate
    pub rps: u32,
    /// Requested duration
    pub duration_seconds: u32,
    /// Requests that produced an outcome
    pub total_requests: u64,
    /// rps x duration
    pub nominal_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
    /// Error percentage (0-100)
    pub error_rate: f64,
    /// Statistics over successful requests only
    pub latency: LatencyStats,
    /// Failures by kind
    pub errors: ErrorStats,
    /// Whether the run was cut short
    pub cancelled: bool,
    /// Wall clock time of the run in milliseconds
    pub elapsed_ms: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Per-request outcomes, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<RequestOutcome>>,
}

impl BenchmarkResult {
    /// Format as summary string
    pub fn format_summary(&self) -> String {
        format!(
            "{} @ {}: {} requests, {} errors ({:.1}%){}\n\
             Latency: {}",
            self.method,
            self.endpoint_url,
            self.total_requests,
            self.error_count,
            self.error_rate,
            if self.cancelled { " [cancelled]" } else { "" },
            self.latency.format_summary()
        )
    }
}

/// Benchmark runner
///
/// Holds no per-run state; concurrent `run` calls on the same runner are
/// independent apart from sharing its cancellation token.
#[derive(Clone, Debug)]
pub struct BenchmarkRunner {
    timeout: Duration,
    cancel: CancellationToken,
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkRunner {
    /// Create a new benchmark runner
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Set per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Token that stops the run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the benchmark
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Run the benchmark
    pub async fn run(&self, request: &BenchmarkRequest) -> Result<BenchmarkResult, BenchmarkError> {
        request.validate()?;
        let headers = Arc::new(request.header_map()?);
        let client = HttpClient::with_timeout(self.timeout)?;
        let url: Arc<str> = Arc::from(request.endpoint_url.as_str());

        info!(
            "Starting benchmark: {} at {} ({} rps for {}s, timeout {:?})",
            request.method, request.endpoint_url, request.rps, request.duration_seconds, self.timeout
        );

        let nominal = request.nominal_requests();
        let mut collector = MetricsCollector::with_capacity(nominal.min(1 << 20) as usize);
        let started_at = Utc::now();
        let timer = Timer::start();
        let mut cancelled = false;
        let mut next_id = 1u64;

        for batch in 1..=request.duration_seconds {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let window_end = Instant::now() + BATCH_WINDOW;
            let mut in_flight = JoinSet::new();

            for _ in 0..request.rps {
                in_flight.spawn(execute_call(
                    client.clone(),
                    url.clone(),
                    headers.clone(),
                    request.method,
                    next_id,
                    batch,
                ));
                next_id += 1;
            }

            let completed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => false,
                _ = drain_batch(&mut in_flight, &mut collector) => true,
            };

            if !completed {
                in_flight.abort_all();
                cancelled = true;
                break;
            }

            debug!(
                "Batch {}/{} complete: {} requests recorded",
                batch,
                request.duration_seconds,
                collector.request_count()
            );

            // The final batch has no successor to hold back.
            if batch < request.duration_seconds {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        cancelled = true;
                        break;
                    }
                    _ = sleep_until(window_end) => {}
                }
            }
        }

        let elapsed = timer.stop("benchmark");
        let (metrics, outcomes) = collector.finalize();

        if cancelled {
            warn!(
                "Benchmark cancelled after {} of {} requests",
                metrics.total_requests, nominal
            );
        }

        info!(
            "Benchmark complete: {} requests, {} errors, avg={:.2}ms p99={:.2}ms",
            metrics.total_requests,
            metrics.error_count(),
            metrics.latency.avg,
            metrics.latency.percentiles.p99
        );

        Ok(BenchmarkResult {
            endpoint_url: request.endpoint_url.clone(),
            method: request.method,
            rps: request.rps,
            duration_seconds: request.duration_seconds,
            total_requests: metrics.total_requests,
            nominal_requests: nominal,
            success_count: metrics.success_count,
            error_count: metrics.error_count(),
            error_rate: metrics.error_rate(),
            latency: metrics.latency,
            errors: metrics.errors,
            cancelled,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            started_at,
            finished_at: Utc::now(),
            outcomes: request.include_outcomes.then_some(outcomes),
        })
    }
}

/// Wait for every call of a batch, recording outcomes as they land
async fn drain_batch(in_flight: &mut JoinSet<RequestOutcome>, collector: &mut MetricsCollector) {
    while let Some(joined) = in_flight.join_next().await {
        match joined {
            Ok(outcome) => collector.record(outcome),
            Err(e) => warn!("Request task failed: {}", e),
        }
    }
}

/// Issue one JSON-RPC call and classify it
async fn execute_call(
    client: HttpClient,
    url: Arc<str>,
    headers: Arc<HeaderMap>,
    method: RpcMethod,
    index: u64,
    batch: u32,
) -> RequestOutcome {
    let body = JsonRpcRequest::new(method, index).to_body();

    let timer = Timer::start();
    let result = client.post_json(&url, &headers, body).await;
    let latency_ms = timer.elapsed_ms();

    classify(result, index, batch, latency_ms)
}

/// Turn a transport result into an outcome
pub fn classify(
    result: Result<HttpResponse, HttpError>,
    index: u64,
    batch: u32,
    latency_ms: f64,
) -> RequestOutcome {
    match result {
        Ok(resp) if resp.is_ok() && RpcReply::parse(&resp.body).is_result() => {
            RequestOutcome::success(index, batch, latency_ms)
        }
        Ok(resp) => {
            debug!("Request {} failed with status {}", index, resp.status_code);
            RequestOutcome::failure(
                index,
                batch,
                latency_ms,
                Some(resp.status_code),
                ErrorKind::HttpError,
            )
        }
        Err(HttpError::Timeout(_)) => {
            RequestOutcome::failure(index, batch, latency_ms, None, ErrorKind::Timeout)
        }
        Err(e @ HttpError::Body { .. }) => {
            debug!("Request {} failed: {}", index, e);
            RequestOutcome::failure(index, batch, latency_ms, e.status_code(), ErrorKind::HttpError)
        }
        Err(e) => {
            debug!("Request {} failed: {}", index, e);
            RequestOutcome::failure(index, batch, latency_ms, None, ErrorKind::NetworkError)
        }
    }
}
