//! Per-request outcomes and latency statistics
//!
//! Latency statistics only cover successful requests. Failed calls are
//! counted in [`ErrorStats`] but their latencies never reach min/max/avg or
//! the percentiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Why a request did not succeed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Request succeeded
    #[default]
    None,
    /// No complete response within the per-request timeout
    Timeout,
    /// Non-200 status, JSON-RPC error, or unusable body
    HttpError,
    /// Connection-level failure before any status
    NetworkError,
}

/// Outcome of one JSON-RPC call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    /// 1-based dispatch sequence, also used as the JSON-RPC id
    pub index: u64,
    /// 1-based batch the request belonged to
    pub batch: u32,
    /// Dispatch to response (or failure) in milliseconds
    pub latency_ms: f64,
    pub success: bool,
    pub http_status: Option<u16>,
    pub error_kind: ErrorKind,
}

impl RequestOutcome {
    /// Successful call
    pub fn success(index: u64, batch: u32, latency_ms: f64) -> Self {
        Self {
            index,
            batch,
            latency_ms,
            success: true,
            http_status: Some(200),
            error_kind: ErrorKind::None,
        }
    }

    /// Failed call
    pub fn failure(
        index: u64,
        batch: u32,
        latency_ms: f64,
        http_status: Option<u16>,
        error_kind: ErrorKind,
    ) -> Self {
        Self {
            index,
            batch,
            latency_ms,
            success: false,
            http_status,
            error_kind,
        }
    }
}

/// Latency percentiles (p50, p90, p95, p99)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

impl Percentiles {
    /// Calculate percentiles from ascending latencies (in milliseconds)
    pub fn from_sorted(latencies: &[f64]) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        Self {
            p50: percentile(latencies, 50.0),
            p90: percentile(latencies, 90.0),
            p95: percentile(latencies, 95.0),
            p99: percentile(latencies, 99.0),
        }
    }
}

/// Nearest-rank percentile: index = ceil(p * n / 100) - 1, clamped to the slice
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    let rank = (p * n as f64 / 100.0).ceil() as usize;
    let idx = rank.saturating_sub(1).min(n - 1);
    sorted[idx]
}

/// Latency statistics over successful requests
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Minimum latency in milliseconds
    pub min: f64,
    /// Maximum latency in milliseconds
    pub max: f64,
    /// Mean latency in milliseconds
    pub avg: f64,
    /// Latency percentiles
    #[serde(flatten)]
    pub percentiles: Percentiles,
    /// Number of samples the statistics cover
    pub samples: usize,
}

impl LatencyStats {
    /// Calculate statistics from latency samples (in milliseconds).
    ///
    /// No samples yields all-zero statistics.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let sum: f64 = sorted.iter().sum();
        let avg = sum / sorted.len() as f64;

        Self {
            min,
            max,
            avg,
            percentiles: Percentiles::from_sorted(&sorted),
            samples: sorted.len(),
        }
    }

    /// Format as summary string
    pub fn format_summary(&self) -> String {
        format!(
            "min={:.2}ms avg={:.2}ms max={:.2}ms p90={:.2}ms p95={:.2}ms p99={:.2}ms",
            self.min,
            self.avg,
            self.max,
            self.percentiles.p90,
            self.percentiles.p95,
            self.percentiles.p99
        )
    }
}

/// Error statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    /// Timed out requests
    pub timeout: u64,
    /// Non-200 status or JSON-RPC error
    pub http_error: u64,
    /// Connection failures
    pub network_error: u64,
    /// Failed requests per non-200 status code
    pub status_codes: BTreeMap<u16, u64>,
}

impl ErrorStats {
    /// Total error count
    pub fn total(&self) -> u64 {
        self.timeout + self.http_error + self.network_error
    }

    /// Record a failed outcome; successes are ignored
    pub fn record(&mut self, outcome: &RequestOutcome) {
        if outcome.success {
            return;
        }

        match outcome.error_kind {
            ErrorKind::Timeout => self.timeout += 1,
            ErrorKind::NetworkError => self.network_error += 1,
            // A failure without a kind still counts against the endpoint.
            ErrorKind::HttpError | ErrorKind::None => self.http_error += 1,
        }

        // JSON-RPC errors arrive with 200 and are only counted as httpError.
        if let Some(code) = outcome.http_status.filter(|code| *code != 200) {
            *self.status_codes.entry(code).or_insert(0) += 1;
        }
    }
}

/// Aggregated metrics for one run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    pub total_requests: u64,
    pub success_count: u64,
    pub latency: LatencyStats,
    pub errors: ErrorStats,
}

impl Metrics {
    pub fn error_count(&self) -> u64 {
        self.total_requests - self.success_count
    }

    /// Error percentage (0-100)
    pub fn error_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.error_count() as f64 / self.total_requests as f64 * 100.0
        }
    }
}

/// Outcome collector for one run
#[derive(Debug, Default)]
pub struct MetricsCollector {
    outcomes: Vec<RequestOutcome>,
    success_latencies: Vec<f64>,
    errors: ErrorStats,
}

impl MetricsCollector {
    /// Create a collector sized for the expected request count
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
            success_latencies: Vec::with_capacity(capacity),
            errors: ErrorStats::default(),
        }
    }

    /// Record a request outcome
    pub fn record(&mut self, outcome: RequestOutcome) {
        if outcome.success {
            self.success_latencies.push(outcome.latency_ms);
        } else {
            self.errors.record(&outcome);
        }
        self.outcomes.push(outcome);
    }

    /// Number of outcomes recorded
    pub fn request_count(&self) -> u64 {
        self.outcomes.len() as u64
    }

    /// Compute metrics without consuming the collector
    pub fn snapshot(&self) -> Metrics {
        Metrics {
            total_requests: self.request_count(),
            success_count: self.success_latencies.len() as u64,
            latency: LatencyStats::from_samples(&self.success_latencies),
            errors: self.errors.clone(),
        }
    }

    /// Finalize into metrics and the outcomes ordered by dispatch index
    pub fn finalize(self) -> (Metrics, Vec<RequestOutcome>) {
        let metrics = self.snapshot();
        let mut outcomes = self.outcomes;
        outcomes.sort_by_key(|o| o.index);
        (metrics, outcomes)
    }
}
