//! Response construction helpers.
//!
//! # Responsibilities
//! - Shape rejection bodies consistently
//! - Expose rate-limit headers on 429s and admitted anonymous responses
//! - Map upstream failures to a single client-visible 503

use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// A rejection body of the form `{"message": ...}`.
pub fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// The single client-visible shape for any upstream failure.
pub fn upstream_failure_response() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": "Something wrong happened, maybe the upstream node is currently down"
        })),
    )
        .into_response()
}

/// Attach quota headers: limit, remaining, retry delay, and the unix second
/// at which the current window resets.
pub fn set_rate_limit_headers(
    headers: &mut HeaderMap,
    limit: u32,
    remaining: u32,
    reset_in: Duration,
) {
    let retry_after_secs = reset_in.as_millis().div_ceil(1000) as u64;
    let reset_at = SystemTime::now() + reset_in;
    let reset_epoch_secs = reset_at
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    headers.insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_epoch_secs));
}
