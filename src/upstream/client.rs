//! Upstream node RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Serialize an action plus sanitized parameters into the node's wire form
//! - POST to the configured RPC endpoint with a bounded timeout
//! - Surface transport failures and malformed responses distinctly

use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use crate::config::schema::UpstreamConfig;

/// Failure talking to the upstream node.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("upstream returned a non-JSON response: {0}")]
    InvalidResponse(String),
}

/// Client for the single upstream JSON-RPC node.
///
/// The node reads the action name from the request body, so `forward`
/// re-inserts `action` alongside the sanitized parameters.
#[derive(Clone)]
pub struct NodeRpcClient {
    http: reqwest::Client,
    url: Url,
}

impl NodeRpcClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let url = config.url.parse().map_err(|source| UpstreamError::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, url })
    }

    /// Perform the upstream call and return the node's JSON response verbatim.
    pub async fn forward(
        &self,
        action: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, UpstreamError> {
        let mut body = params.clone();
        body.insert("action".to_string(), Value::String(action.to_string()));

        let response = self.http.post(self.url.clone()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus(status));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}
