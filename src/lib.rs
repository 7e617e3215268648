//! Gating proxy in front of a single upstream JSON-RPC node.
//!
//! Inbound requests pass through an ordered admission pipeline
//! (authorization, rate limiting, action allow-listing, parameter
//! sanitization) and, when admitted, are forwarded to the node with
//! sanitized parameters. Rejections never touch the network.

pub mod admission;
pub mod config;
pub mod http;
pub mod observability;
pub mod security;
pub mod upstream;
pub mod usage;

pub use config::GatewayConfig;
pub use http::HttpServer;
