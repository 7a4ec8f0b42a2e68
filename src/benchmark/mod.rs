//! Benchmarking module
//!
//! Paced JSON-RPC load generation, per-request outcome collection and
//! latency statistics.

mod metrics;
mod report;
mod request;
mod runner;

pub use report::{BenchmarkReport, ReportFormat};
pub use request::{
    parse_header_arg, parse_headers_json, BenchmarkParams, BenchmarkRequest, ValidationError,
    MAX_DURATION_SECS, RPS_PRESETS,
};
pub use runner::{BenchmarkError, BenchmarkResult, BenchmarkRunner};
