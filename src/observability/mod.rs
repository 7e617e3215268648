//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; level from config, overridable by env
//! - Metrics are cheap (atomic increments behind the metrics facade)
//! - Prometheus exposition is optional and runs on its own listener

pub mod logging;
pub mod metrics;
