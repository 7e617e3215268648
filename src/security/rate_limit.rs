//! Fixed-window rate limiting keyed by client IP.

use dashmap::DashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// Quota snapshot returned when a consumption is granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaStatus {
    /// Total points per window.
    pub limit: u32,
    /// Points left in the current window after this consumption.
    pub remaining: u32,
    /// Time until the current window resets.
    pub reset_in: Duration,
}

/// Returned when the window's quota is already spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaExceeded {
    /// Total points per window.
    pub limit: u32,
    /// Time until the window resets and points become available again.
    pub retry_after: Duration,
}

/// Per-window consumption state for one key.
struct Window {
    consumed: u32,
    expires_at: Instant,
}

/// Fixed-window counter over a concurrent per-IP table.
///
/// `consume` is atomic per key: the map entry is held exclusively for the
/// duration of the read-modify-write, so two concurrent calls for the same
/// key never act on the same pre-update count. Expired windows reset lazily
/// on access; `purge_expired` reclaims entries for IPs that went quiet.
pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    /// Spend `cost` points for `key`, never blocking.
    ///
    /// Returns the remaining quota on success, or the time until the window
    /// resets when the quota is spent.
    pub fn consume(&self, key: IpAddr, cost: u32) -> Result<QuotaStatus, QuotaExceeded> {
        let now = Instant::now();
        let mut slot = self.windows.entry(key).or_insert_with(|| Window {
            consumed: 0,
            expires_at: now + self.window,
        });

        if now >= slot.expires_at {
            slot.consumed = 0;
            slot.expires_at = now + self.window;
        }

        let reset_in = slot.expires_at - now;
        if slot.consumed.saturating_add(cost) <= self.limit {
            slot.consumed += cost;
            Ok(QuotaStatus {
                limit: self.limit,
                remaining: self.limit - slot.consumed,
                reset_in,
            })
        } else {
            Err(QuotaExceeded {
                limit: self.limit,
                retry_after: reset_in,
            })
        }
    }

    /// Drop windows whose expiry has passed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows.retain(|_, slot| slot.expires_at > now);
    }

    /// Number of IPs currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
