//! Upstream node subsystem.
//!
//! The only suspension point in the request path: called strictly after
//! admission succeeds, so rejected requests never touch the network.

pub mod client;

pub use client::{NodeRpcClient, UpstreamError};
