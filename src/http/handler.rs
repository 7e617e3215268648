//! The admission endpoint handler.
//!
//! # Responsibilities
//! - Collect identity inputs (client IP, Authorization header)
//! - Read parameters from the query string (GET) or JSON body (POST)
//! - Run the admission pipeline and map its decision to a response
//! - Forward admitted requests upstream and relay the result verbatim
//! - Record per-IP usage after the response is built

use axum::{
    body::{to_bytes, Body},
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use crate::admission::pipeline::AdmissionDecision;
use crate::http::response::{message_response, set_rate_limit_headers, upstream_failure_response};
use crate::http::server::AppState;
use crate::observability::metrics;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub async fn rpc_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let client_ip = client_ip(request.headers(), peer.ip(), state.trust_proxy);
    let credential = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let params = extract_params(request).await;
    let action = params
        .get("action")
        .and_then(Value::as_str)
        .map(str::to_string);

    tracing::debug!(
        request_id = %request_id,
        client = %client_ip,
        action = action.as_deref().unwrap_or(""),
        "Evaluating request"
    );

    let decision = state
        .pipeline
        .evaluate(client_ip, credential.as_deref(), action.as_deref(), params);

    let response = match decision {
        AdmissionDecision::Admit { params, quota, .. } => {
            // Present by construction: a missing action never reaches Admit.
            let action = action.as_deref().unwrap_or_default();
            let start = Instant::now();

            match state.upstream.forward(action, &params).await {
                Ok(payload) => {
                    metrics::record_admitted(action);
                    metrics::record_upstream_latency(start.elapsed().as_secs_f64());

                    let mut response = Json(payload).into_response();
                    if let Some(status) = quota {
                        set_rate_limit_headers(
                            response.headers_mut(),
                            status.limit,
                            status.remaining,
                            status.reset_in,
                        );
                    }
                    response
                }
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        action,
                        error = %e,
                        "Upstream call failed"
                    );
                    metrics::record_upstream_failure();
                    upstream_failure_response()
                }
            }
        }
        AdmissionDecision::MissingAction => {
            metrics::record_rejected("missing_action");
            message_response(StatusCode::UNPROCESSABLE_ENTITY, "Action field is required")
        }
        AdmissionDecision::InvalidCredential => {
            tracing::warn!(client = %client_ip, "Rejected unknown credential");
            metrics::record_rejected("invalid_credential");
            message_response(
                StatusCode::FORBIDDEN,
                "Invalid authorization token provided.",
            )
        }
        AdmissionDecision::RateLimited(exceeded) => {
            tracing::warn!(client = %client_ip, "Rate limit exceeded");
            metrics::record_rejected("rate_limited");

            let mut response =
                message_response(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests");
            set_rate_limit_headers(
                response.headers_mut(),
                exceeded.limit,
                0,
                exceeded.retry_after,
            );
            response
        }
        AdmissionDecision::ActionNotAllowed => {
            tracing::warn!(
                client = %client_ip,
                action = action.as_deref().unwrap_or(""),
                "Rejected disallowed action"
            );
            metrics::record_rejected("action_not_allowed");
            message_response(StatusCode::FORBIDDEN, "Action is not allowed")
        }
    };

    state.usage.record(client_ip, response.status().as_u16());
    response
}

/// Read the request's parameter map: query string for GET, JSON body
/// otherwise. Anything unparseable degrades to an empty map, which the
/// pipeline then rejects for its missing action.
async fn extract_params(request: Request<Body>) -> Map<String, Value> {
    if request.method() == Method::GET {
        return parse_query(request.uri().query().unwrap_or_default());
    }

    let bytes = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .unwrap_or_default();
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn parse_query(query: &str) -> Map<String, Value> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

/// Resolve the client IP, preferring X-Forwarded-For when the deployment
/// says to trust it.
fn client_ip(headers: &HeaderMap, peer: IpAddr, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        if let Some(forwarded) = headers.get("x-forwarded-for") {
            if let Ok(forwarded_str) = forwarded.to_str() {
                if let Some(first) = forwarded_str.split(',').next() {
                    if let Ok(ip) = first.trim().parse::<IpAddr>() {
                        return ip;
                    }
                }
            }
        }
    }
    peer
}
