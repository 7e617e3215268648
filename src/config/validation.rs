//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges (window > 0, limit > 0)
//! - Detect duplicate user tokens
//! - Verify addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::IpAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("api.route must start with '/'")]
    InvalidApiRoute,

    #[error("upstream.url is not a valid URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("rate_limit.requests_limit must be greater than zero")]
    ZeroRequestsLimit,

    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroRateWindow,

    #[error("users[{0}].token must not be empty")]
    EmptyUserToken(usize),

    #[error("duplicate user token '{0}'")]
    DuplicateUserToken(String),

    #[error("privileged_ips entry '{0}' is not a valid IP address")]
    InvalidPrivilegedIp(String),

    #[error("usage.flush_interval_secs must be greater than zero when usage is enabled")]
    ZeroFlushInterval,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }

    if !config.api.route.starts_with('/') {
        errors.push(ValidationError::InvalidApiRoute);
    }

    if config.upstream.url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::InvalidUpstreamUrl(
            config.upstream.url.clone(),
        ));
    }

    if config.rate_limit.requests_limit == 0 {
        errors.push(ValidationError::ZeroRequestsLimit);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroRateWindow);
    }

    let mut seen_tokens = HashSet::new();
    for (i, user) in config.users.iter().enumerate() {
        if user.token.is_empty() {
            errors.push(ValidationError::EmptyUserToken(i));
        } else if !seen_tokens.insert(user.token.as_str()) {
            errors.push(ValidationError::DuplicateUserToken(user.token.clone()));
        }
    }

    for ip in &config.privileged_ips {
        if ip.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::InvalidPrivilegedIp(ip.clone()));
        }
    }

    if config.usage.enabled && config.usage.flush_interval_secs == 0 {
        errors.push(ValidationError::ZeroFlushInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
