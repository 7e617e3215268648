//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request identity inputs:
//!     → auth.rs (credential → user record)
//!     → rate_limit.rs (per-IP fixed-window quota)
//!     → policy.rs (action allow-list, parameter bounds)
//!     → Consumed by the admission pipeline
//! ```
//!
//! # Design Decisions
//! - All three components are leaves: no dependencies between them
//! - Lookups are pure and in-memory; only the rate limiter mutates state
//! - Fail closed: unknown credentials and unknown actions are rejected

pub mod auth;
pub mod policy;
pub mod rate_limit;

pub use auth::{AuthResolver, UserRecord};
pub use policy::ActionPolicy;
pub use rate_limit::{QuotaExceeded, QuotaStatus, RateLimiter};
