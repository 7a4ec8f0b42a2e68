//! HTTP client for JSON-RPC endpoints
//!
//! Thin wrapper over a pooled `reqwest::Client` that posts JSON bodies and
//! maps transport failures onto [`HttpError`] variants the benchmark can count.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// HTTP client errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to read response body (status {status}): {reason}")]
    Body { status: u16, reason: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Build(String),
}

impl HttpError {
    /// Map a reqwest failure onto our error kinds
    fn from_reqwest(e: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if e.is_timeout() {
            HttpError::Timeout(timeout)
        } else if e.is_connect() {
            HttpError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            HttpError::RequestFailed(e.to_string())
        }
    }

    /// Status code observed before the failure, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpError::Body { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Build the outgoing header map from caller headers.
///
/// `Content-Type: application/json` always overrides a caller-provided value.
pub fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);

    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.trim().as_bytes()).map_err(|e| {
            HttpError::InvalidHeader {
                name: key.clone(),
                reason: e.to_string(),
            }
        })?;
        let value = HeaderValue::from_str(value.trim()).map_err(|e| HttpError::InvalidHeader {
            name: key.clone(),
            reason: e.to_string(),
        })?;
        map.insert(name, value);
    }

    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(map)
}

/// HTTP client shared by every request of one benchmark run
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create client with a per-request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// POST a JSON body and read the full response
    pub async fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: String,
    ) -> Result<HttpResponse, HttpError> {
        debug!("Sending POST to {}", url);

        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .body(body)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(e, url, self.timeout))?;

        let status = response.status().as_u16();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.timeout)
            } else {
                HttpError::Body {
                    status,
                    reason: e.to_string(),
                }
            }
        })?;

        debug!("Response: {} ({} bytes)", status, body.len());

        Ok(HttpResponse {
            status_code: status,
            body,
        })
    }
}

/// HTTP response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}
