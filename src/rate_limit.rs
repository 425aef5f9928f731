use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;

// Rate limit entry - request log of one client identity
#[derive(Debug, Default)]
pub struct RateLimitEntry {
    pub timestamps: VecDeque<Instant>,
}

// Outcome of a single limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    // time until the oldest request in the window ages out
    Limited { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Sliding-window-log rate limiter keyed by client identity.
///
/// Every admitted request leaves its timestamp in the client's log; a new
/// request is admitted only while fewer than `limit` timestamps fall inside
/// the trailing `window`. Entries are pruned lazily on each check. Logs are
/// never removed, so memory grows with the number of distinct clients.
pub struct SlidingWindowLimiter {
    records: DashMap<String, RateLimitEntry>,
    limit: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        tracing::info!(limit, window_secs = window.as_secs(), "creating sliding window rate limiter");
        Self {
            records: DashMap::new(),
            limit,
            window,
            clock,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check `key` against the quota and record the request if it fits.
    ///
    /// The whole read-prune-append sequence runs under the shard lock of
    /// `key`, so concurrent callers for the same client never over-admit.
    pub fn check(&self, key: &str) -> Admission {
        let mut entry = self.records.entry(key.to_string()).or_default();
        // read the clock under the lock so each log stays ordered
        let now = self.clock.now();
        let window = self.window;

        // an entry exactly `window` old is already outside
        entry
            .timestamps
            .retain(|&t| now.saturating_duration_since(t) < window);

        if entry.timestamps.len() >= self.limit {
            let retry_after = entry
                .timestamps
                .iter()
                .min()
                .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(window);
            return Admission::Limited { retry_after };
        }

        entry.timestamps.push_back(now);
        Admission::Allowed
    }

    // boolean form of `check`
    pub fn admit(&self, key: &str) -> bool {
        self.check(key).is_allowed()
    }

    pub fn tracked_clients(&self) -> usize {
        self.records.len()
    }

    // size of the stored log for `key`, pruned or not
    pub fn recorded(&self, key: &str) -> usize {
        self.records
            .get(key)
            .map(|entry| entry.timestamps.len())
            .unwrap_or(0)
    }
}
