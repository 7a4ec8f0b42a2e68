//! HTTP client module
//!
//! Outbound HTTP transport for JSON-RPC calls.

mod client;

pub use client::{build_headers, HttpClient, HttpError, HttpResponse};
