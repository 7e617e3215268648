//! Request admission subsystem.
//!
//! # Data Flow
//! ```text
//! (client_ip, credential, action, raw params)
//!     → pipeline.rs evaluate()
//!         1. action present?
//!         2. identity: privileged / authenticated / anonymous (+ quota)
//!         3. action in effective allowed set?
//!         4. sanitize params (clamp count, truncate accounts)
//!     → AdmissionDecision consumed by the HTTP layer
//! ```
//!
//! Rejected requests never reach the upstream node.

pub mod pipeline;

pub use pipeline::{AdmissionDecision, AdmissionPipeline, ClientIdentity};
