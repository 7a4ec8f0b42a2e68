//! Benchmark request parameters and validation

use reqwest::{header::HeaderMap, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::http::{build_headers, HttpError};
use crate::rpc::{RpcError, RpcMethod};

/// Longest allowed benchmark
pub const MAX_DURATION_SECS: u32 = 60;

/// Request-per-second presets offered to users
pub const RPS_PRESETS: [u32; 3] = [5, 10, 15];

/// Input validation errors; a run never starts when one is raised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rps must be a positive integer, got {0}")]
    InvalidRps(i64),

    #[error("rps {got} exceeds the limit of {max}")]
    RpsTooHigh { got: u32, max: u32 },

    #[error("duration must be a positive number of seconds, got {0}")]
    InvalidDuration(i64),

    #[error("duration {got}s exceeds the maximum of {max}s")]
    DurationTooLong { got: i64, max: u32 },

    #[error(transparent)]
    UnsupportedMethod(#[from] RpcError),

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("headers must be a JSON object of string values")]
    HeadersNotObject,
}

impl From<HttpError> for ValidationError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::InvalidHeader { name, reason } => {
                ValidationError::InvalidHeader { name, reason }
            }
            other => ValidationError::InvalidHeader {
                name: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

/// A validated benchmark request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRequest {
    /// JSON-RPC endpoint
    pub endpoint_url: String,
    /// Method to call
    pub method: RpcMethod,
    /// Extra headers forwarded with every call
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Requests dispatched per one-second batch
    pub rps: u32,
    /// Number of batches
    pub duration_seconds: u32,
    /// Keep the per-request outcomes in the result
    #[serde(default)]
    pub include_outcomes: bool,
}

#[cfg(test)]
impl BenchmarkRequest {
    /// Create request with no extra headers
    pub fn new(endpoint_url: impl Into<String>, method: RpcMethod, rps: u32, duration_seconds: u32) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            method,
            headers: BTreeMap::new(),
            rps,
            duration_seconds,
            include_outcomes: false,
        }
    }

    /// Add a forwarded header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Keep per-request outcomes in the result
    pub fn with_outcomes(mut self, include: bool) -> Self {
        self.include_outcomes = include;
        self
    }
}

impl BenchmarkRequest {
    /// Number of requests a complete run dispatches
    pub fn nominal_requests(&self) -> u64 {
        self.rps as u64 * self.duration_seconds as u64
    }

    /// Check every invariant of the request
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rps == 0 {
            return Err(ValidationError::InvalidRps(0));
        }
        check_duration(self.duration_seconds as i64)?;
        validate_url(&self.endpoint_url)?;
        build_headers(&self.headers)?;
        Ok(())
    }

    /// Reject rates above a caller-imposed ceiling
    pub fn check_rps_limit(&self, max: u32) -> Result<(), ValidationError> {
        if self.rps > max {
            return Err(ValidationError::RpsTooHigh { got: self.rps, max });
        }
        Ok(())
    }

    /// Outgoing headers including the JSON content type
    pub fn header_map(&self) -> Result<HeaderMap, ValidationError> {
        Ok(build_headers(&self.headers)?)
    }
}

/// Loosely typed request as received from callers
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkParams {
    #[serde(alias = "endpointURL", alias = "url")]
    pub endpoint_url: String,
    pub method: String,
    #[serde(default)]
    pub headers: Option<Value>,
    pub rps: i64,
    #[serde(alias = "duration")]
    pub duration_seconds: i64,
    #[serde(default)]
    pub include_outcomes: bool,
}

impl TryFrom<BenchmarkParams> for BenchmarkRequest {
    type Error = ValidationError;

    fn try_from(params: BenchmarkParams) -> Result<Self, Self::Error> {
        if params.rps <= 0 || params.rps > u32::MAX as i64 {
            return Err(ValidationError::InvalidRps(params.rps));
        }
        let duration = check_duration(params.duration_seconds)?;
        let method: RpcMethod = params.method.parse()?;
        let headers = match params.headers {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(value) => headers_from_value(value)?,
        };

        let request = BenchmarkRequest {
            endpoint_url: params.endpoint_url.trim().to_string(),
            method,
            headers,
            rps: params.rps as u32,
            duration_seconds: duration,
            include_outcomes: params.include_outcomes,
        };
        request.validate()?;
        Ok(request)
    }
}

fn check_duration(secs: i64) -> Result<u32, ValidationError> {
    if secs <= 0 {
        return Err(ValidationError::InvalidDuration(secs));
    }
    if secs > MAX_DURATION_SECS as i64 {
        return Err(ValidationError::DurationTooLong {
            got: secs,
            max: MAX_DURATION_SECS,
        });
    }
    Ok(secs as u32)
}

fn validate_url(url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(url).map_err(|e| ValidationError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ValidationError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

fn headers_from_value(value: Value) -> Result<BTreeMap<String, String>, ValidationError> {
    let Value::Object(object) = value else {
        return Err(ValidationError::HeadersNotObject);
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            _ => Err(ValidationError::HeadersNotObject),
        })
        .collect()
}

/// Parse a JSON object of headers, e.g. `{"Authorization": "Bearer x"}`.
///
/// Blank input means no headers.
pub fn parse_headers_json(input: &str) -> Result<BTreeMap<String, String>, ValidationError> {
    if input.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: Value =
        serde_json::from_str(input).map_err(|_| ValidationError::HeadersNotObject)?;
    headers_from_value(value)
}

/// Parse a single `Name: value` header argument
pub fn parse_header_arg(input: &str) -> Result<(String, String), ValidationError> {
    let (name, value) = input
        .split_once(':')
        .ok_or_else(|| ValidationError::InvalidHeader {
            name: input.to_string(),
            reason: "expected 'Name: value'".to_string(),
        })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidHeader {
            name: input.to_string(),
            reason: "empty header name".to_string(),
        });
    }
    Ok((name.to_string(), value.trim().to_string()))
}
