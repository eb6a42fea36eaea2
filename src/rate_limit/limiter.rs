use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::config::RateLimitConfig;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    /// Quota exhausted; the window reopens in `retry_after_secs` seconds.
    Denied { retry_after_secs: u64 },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    started_at: Instant,
}

/// Per-key fixed-origin window limiter.
///
/// A key's window opens on its first request and reopens on the first request
/// after `window` has elapsed. Requests inside a window only bump the counter,
/// so a burst at the end of one window followed by a burst at the start of
/// the next can exceed `max_requests` within `window` of wall-clock time.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    /// Keyed by client identity. The entry lock makes check-and-increment atomic per key.
    windows: DashMap<String, RateWindow>,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn from_config(config: RateLimitConfig) -> Self {
        Self::new(config.window, config.max_requests)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Checks and records one request for `key` at the current time.
    pub fn check(&self, key: &str) -> Admission {
        self.check_at(key, Instant::now())
    }

    /// Checks and records one request for `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> Admission {
        // Must run before `entry()`: retain() takes every shard lock.
        self.sweep_if_due(now);

        let mut entry = self.windows.entry(key.to_string()).or_insert(RateWindow {
            count: 0,
            started_at: now,
        });

        if now.saturating_duration_since(entry.started_at) >= self.window {
            entry.count = 0;
            entry.started_at = now;
        }

        if entry.count < self.max_requests {
            entry.count += 1;
            return Admission::Allowed;
        }

        let reopens_at = entry.started_at + self.window;
        let remaining = reopens_at.saturating_duration_since(now);
        Admission::Denied {
            retry_after_secs: (remaining.as_millis().div_ceil(1000) as u64).max(1),
        }
    }

    /// Requests counted so far in the live window for `key`.
    pub fn current_count(&self, key: &str) -> Option<u32> {
        self.windows.get(key).map(|w| w.count)
    }

    /// Number of keys currently tracked, live or stale.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Drops every entry whose window has fully elapsed at `now`.
    pub fn purge_expired(&self, now: Instant) {
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started_at) < self.window);
    }

    /// Sweeps at most once per window length. Skipped if another caller is sweeping.
    fn sweep_if_due(&self, now: Instant) {
        let Some(mut last) = self.last_sweep.try_lock() else {
            return;
        };
        if now.saturating_duration_since(*last) < self.window {
            return;
        }
        *last = now;
        drop(last);
        self.purge_expired(now);
    }
}
