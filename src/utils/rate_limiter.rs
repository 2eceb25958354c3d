//! Fixed-window per-client rate limiter
//!
//! One window per normalized client key, held in a DashMap so the
//! read-modify-write for a key happens under that key's shard guard.
//! In-memory only: state resets with the process.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::utils::constants::{RATE_LIMIT_MAX_REQ, RATE_LIMIT_WINDOW_SECS};

/// Rate limiter configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: RATE_LIMIT_MAX_REQ,
            window_duration: Duration::from_secs(RATE_LIMIT_WINDOW_SECS),
        }
    }
}

/// Per-client counter for the current window
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

/// Decision for one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }
}

pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    #[inline]
    fn normalize_key(key: &str) -> String {
        key.trim().to_lowercase()
    }

    /// Admit or reject one request for `client_key`
    pub fn admit(&self, client_key: &str) -> Admission {
        self.admit_at(client_key, Instant::now())
    }

    pub(crate) fn admit_at(&self, client_key: &str, now: Instant) -> Admission {
        let key = Self::normalize_key(client_key);
        let window = self.config.window_duration;

        let mut entry = self.windows.entry(key).or_insert(RateWindow {
            window_start: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed > window {
            entry.window_start = now;
            entry.count = 0;
        }

        if entry.count >= self.config.requests_per_window {
            let retry_after = window.saturating_sub(now.saturating_duration_since(entry.window_start));
            warn!(key = %entry.key(), retry_after_ms = %retry_after.as_millis(), "Rate limit exceeded");
            return Admission::Denied { retry_after };
        }

        entry.count += 1;
        debug!(key = %entry.key(), count = entry.count, "Request admitted");
        Admission::Allowed {
            remaining: self.config.requests_per_window - entry.count,
        }
    }

    /// Drop windows idle for more than two window lengths
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    pub(crate) fn cleanup_at(&self, now: Instant) -> usize {
        let horizon = self.config.window_duration * 2;
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) < horizon);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
