//! Usage statistics subsystem.
//!
//! Recording happens after the response is built, decoupled from the
//! admission decision; persistence is a periodic best-effort snapshot.

pub mod recorder;

pub use recorder::{IpStats, UsageRecorder};
