use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::models::RateLimitTelemetry;

// Cache entry with timestamp
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub payload: Value,
    pub stored_at: Instant,
    pub telemetry: Option<RateLimitTelemetry>,
}

// Subjects are compared trimmed and case-insensitively
pub fn normalize_subject(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// Create a cache key from a subject
pub fn make_cache_key(subject: &str) -> String {
    format!("user:{}", normalize_subject(subject))
}

/// Last successful profile per subject, valid for `ttl` after it was stored.
///
/// Stale entries are never evicted; they are ignored by [`get`](Self::get)
/// and replaced by the next [`put`](Self::put) for the same subject.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, subject: &str) -> Option<CacheEntry> {
        let entry = self.entries.get(&make_cache_key(subject))?;
        let now = self.clock.now();

        if now.saturating_duration_since(entry.stored_at) < self.ttl {
            Some(entry.value().clone())
        } else {
            None
        }
    }

    pub fn put(&self, subject: &str, payload: Value, telemetry: Option<RateLimitTelemetry>) {
        self.entries.insert(
            make_cache_key(subject),
            CacheEntry {
                payload,
                stored_at: self.clock.now(),
                telemetry,
            },
        );
    }

    // includes stale entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.entries.contains_key(&make_cache_key(subject))
    }
}
