//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → handler.rs (identity inputs, params, admission, upstream relay)
//!     → response.rs (rejection bodies, rate-limit headers)
//!     → Send to client, then record usage
//! ```

pub mod handler;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
