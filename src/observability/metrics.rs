//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_admitted_total` (counter): admitted requests by action
//! - `gateway_requests_rejected_total` (counter): rejections by reason
//! - `gateway_upstream_failures_total` (counter): failed upstream calls
//! - `gateway_upstream_duration_seconds` (histogram): upstream call latency

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "gateway_requests_admitted_total",
                "Requests admitted and forwarded upstream"
            );
            describe_counter!(
                "gateway_requests_rejected_total",
                "Requests rejected by the admission pipeline"
            );
            describe_counter!(
                "gateway_upstream_failures_total",
                "Upstream calls that failed after admission"
            );
            describe_histogram!(
                "gateway_upstream_duration_seconds",
                "Latency of upstream node calls"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

pub fn record_admitted(action: &str) {
    counter!("gateway_requests_admitted_total", "action" => action.to_string()).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!("gateway_requests_rejected_total", "reason" => reason).increment(1);
}

pub fn record_upstream_failure() {
    counter!("gateway_upstream_failures_total").increment(1);
}

pub fn record_upstream_latency(seconds: f64) {
    histogram!("gateway_upstream_duration_seconds").record(seconds);
}
