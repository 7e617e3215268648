//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for the RPC gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// API surface configuration (route, proxy trust, request timeout).
    pub api: ApiConfig,

    /// Upstream node endpoint.
    pub upstream: UpstreamConfig,

    /// Rate limiting for anonymous clients.
    pub rate_limit: RateLimitConfig,

    /// Action allow-list and per-action parameter limits.
    pub actions: ActionsConfig,

    /// Users granted extra actions via bearer token.
    pub users: Vec<UserConfig>,

    /// IPs exempt from rate limiting.
    pub privileged_ips: Vec<String>,

    /// Usage statistics collection.
    pub usage: UsageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// API surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Route the admission endpoint is served on.
    pub route: String,

    /// Take the client IP from X-Forwarded-For when running behind a proxy.
    pub trust_proxy: bool,

    /// Total per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            route: "/api".to_string(),
            trust_proxy: false,
            request_timeout_secs: 30,
        }
    }
}

/// Upstream node endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// JSON-RPC endpoint URL of the node.
    pub url: String,

    /// Upstream request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7076".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Rate limiting configuration for anonymous clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Points available per IP per window.
    pub requests_limit: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_limit: 100,
            window_secs: 3600,
        }
    }
}

/// Action allow-list and per-action parameter limits.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ActionsConfig {
    /// Actions anyone may invoke.
    pub public: Vec<String>,

    /// Per-action upper bound for the `count` parameter.
    pub max_count: HashMap<String, u64>,

    /// Per-action upper bound for the `accounts` list length.
    pub max_accounts: HashMap<String, usize>,
}

/// A user granted extra actions beyond the public set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    /// Bearer token presented in the Authorization header.
    pub token: String,

    /// Actions this user may invoke in addition to the public set.
    #[serde(default)]
    pub extra_actions: Vec<String>,
}

/// Usage statistics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsageConfig {
    /// Enable per-IP usage recording and snapshots.
    pub enabled: bool,

    /// Snapshot file path.
    pub path: String,

    /// Snapshot flush interval in seconds.
    pub flush_interval_secs: u64,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "usage_stats.json".to_string(),
            flush_interval_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
