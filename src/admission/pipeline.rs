//! The request admission pipeline.
//!
//! # Responsibilities
//! - Resolve the client identity (privileged IP, authenticated, anonymous)
//! - Enforce the anonymous rate limit
//! - Enforce the action allow-list
//! - Sanitize parameters against per-action bounds
//!
//! # Design Decisions
//! - Strict ordered decision tree: each branch resolves fully or rejects,
//!   never falls through to the next check
//! - A present-but-unknown credential is an error, never downgraded to
//!   anonymous treatment
//! - Privileged IPs are exempt from quota only; they get no extra actions
//! - Sanitization clamps and truncates, it never rejects

use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::net::IpAddr;

use crate::config::schema::GatewayConfig;
use crate::security::auth::{AuthResolver, UserRecord};
use crate::security::policy::ActionPolicy;
use crate::security::rate_limit::{QuotaExceeded, QuotaStatus, RateLimiter};

/// Who is making the request. Resolved once per request, immutable after.
#[derive(Debug, Clone)]
pub enum ClientIdentity {
    Anonymous(IpAddr),
    Authenticated(UserRecord),
    Privileged(IpAddr),
}

/// Outcome of evaluating one inbound request.
#[derive(Debug)]
pub enum AdmissionDecision {
    /// Forward with the sanitized parameters. `quota` is present for
    /// anonymous clients so responses can expose rate-limit headers.
    Admit {
        identity: ClientIdentity,
        params: Map<String, Value>,
        quota: Option<QuotaStatus>,
    },
    /// The `action` field was absent or empty.
    MissingAction,
    /// A credential was presented but matches no configured user.
    InvalidCredential,
    /// The anonymous quota for this IP is spent.
    RateLimited(QuotaExceeded),
    /// The action is outside the client's effective allowed set.
    ActionNotAllowed,
}

/// Orchestrates the auth resolver, rate limiter and action policy into a
/// single admit/reject decision per request.
///
/// Owns its collaborators so tests run against fresh state.
pub struct AdmissionPipeline {
    auth: AuthResolver,
    limiter: RateLimiter,
    policy: ActionPolicy,
    privileged_ips: HashSet<IpAddr>,
}

impl AdmissionPipeline {
    pub fn new(
        auth: AuthResolver,
        limiter: RateLimiter,
        policy: ActionPolicy,
        privileged_ips: HashSet<IpAddr>,
    ) -> Self {
        Self {
            auth,
            limiter,
            policy,
            privileged_ips,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        let privileged_ips = config
            .privileged_ips
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    tracing::warn!(entry = %raw, "Ignoring unparseable privileged IP");
                    None
                }
            })
            .collect();

        Self::new(
            AuthResolver::from_config(&config.users),
            RateLimiter::new(
                config.rate_limit.requests_limit,
                std::time::Duration::from_secs(config.rate_limit.window_secs),
            ),
            ActionPolicy::from_config(&config.actions),
            privileged_ips,
        )
    }

    /// Access to the rate limiter, for the periodic purge task.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Evaluate one inbound request, short-circuiting on the first rejection.
    pub fn evaluate(
        &self,
        client_ip: IpAddr,
        credential: Option<&str>,
        action: Option<&str>,
        raw_params: Map<String, Value>,
    ) -> AdmissionDecision {
        let action = match action {
            Some(a) if !a.is_empty() => a,
            _ => return AdmissionDecision::MissingAction,
        };

        let (identity, quota) = if self.privileged_ips.contains(&client_ip) {
            (ClientIdentity::Privileged(client_ip), None)
        } else if let Some(token) = credential {
            match self.auth.resolve(token) {
                Some(record) => (ClientIdentity::Authenticated(record.clone()), None),
                None => return AdmissionDecision::InvalidCredential,
            }
        } else {
            match self.limiter.consume(client_ip, 1) {
                Ok(status) => (ClientIdentity::Anonymous(client_ip), Some(status)),
                Err(exceeded) => return AdmissionDecision::RateLimited(exceeded),
            }
        };

        let allowed = match &identity {
            ClientIdentity::Authenticated(record) => {
                self.policy.is_publicly_allowed(action) || record.extra_actions.contains(action)
            }
            ClientIdentity::Anonymous(_) | ClientIdentity::Privileged(_) => {
                self.policy.is_publicly_allowed(action)
            }
        };
        if !allowed {
            return AdmissionDecision::ActionNotAllowed;
        }

        let params = self.sanitize(action, raw_params);
        AdmissionDecision::Admit {
            identity,
            params,
            quota,
        }
    }

    /// Apply the action's configured bounds to the parameter map.
    fn sanitize(&self, action: &str, mut params: Map<String, Value>) -> Map<String, Value> {
        params.remove("action");

        if let Some(max) = self.policy.max_count(action) {
            if let Some(clamped) = params.get("count").and_then(|v| clamp_count(v, max)) {
                params.insert("count".to_string(), clamped);
            }
        }

        if let Some(max) = self.policy.max_accounts(action) {
            if let Some(Value::Array(accounts)) = params.get_mut("accounts") {
                accounts.truncate(max);
            }
        }

        params
    }
}

/// Clamp a `count` value into `[0, max]`.
///
/// Numeric strings stay strings after clamping. Returns `None` for values
/// that carry no numeric interpretation, leaving the original in place.
fn clamp_count(value: &Value, max: u64) -> Option<Value> {
    let max_int = i64::try_from(max).unwrap_or(i64::MAX);

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::from(i.clamp(0, max_int)))
            } else if let Some(u) = n.as_u64() {
                Some(Value::from(u.min(max)))
            } else {
                n.as_f64()
                    .and_then(|f| Number::from_f64(f.clamp(0.0, max as f64)))
                    .map(Value::Number)
            }
        }
        Value::String(s) => {
            if let Ok(i) = s.parse::<i64>() {
                Some(Value::String(i.clamp(0, max_int).to_string()))
            } else if let Ok(f) = s.parse::<f64>() {
                Number::from_f64(f.clamp(0.0, max as f64))
                    .map(|clamped| Value::String(clamped.to_string()))
            } else {
                None
            }
        }
        _ => None,
    }
}
