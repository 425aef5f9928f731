use axum::http::HeaderMap;
use std::sync::Arc;

use crate::cache::{ResponseCache, normalize_subject};
use crate::error::{LookupError, LookupResult};
use crate::identity::identify;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE, RATE_LIMITED_TOTAL, UPSTREAM_ERRORS, UPSTREAM_REMAINING};
use crate::models::Outcome;
use crate::rate_limit::{Admission, SlidingWindowLimiter};
use crate::upstream::{ProfileSource, UpstreamError};

/// Sits between callers and the profile API.
///
/// Order per lookup: validate, rate limit, cache, upstream. A cache hit still
/// costs the caller one admission. Locks are only taken inside the limiter and
/// cache calls, never across the upstream request.
pub struct RequestMediator {
    limiter: Arc<SlidingWindowLimiter>,
    cache: Arc<ResponseCache>,
    upstream: Arc<dyn ProfileSource>,
}

impl RequestMediator {
    pub fn new(
        limiter: Arc<SlidingWindowLimiter>,
        cache: Arc<ResponseCache>,
        upstream: Arc<dyn ProfileSource>,
    ) -> Self {
        Self {
            limiter,
            cache,
            upstream,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn limiter(&self) -> &SlidingWindowLimiter {
        &self.limiter
    }

    pub async fn handle(&self, headers: &HeaderMap, raw_username: Option<&str>) -> LookupResult<Outcome> {
        let subject = normalize_subject(raw_username.unwrap_or_default());
        if subject.is_empty() {
            return Err(LookupError::InvalidInput);
        }

        let client = identify(headers);
        if let Admission::Limited { retry_after } = self.limiter.check(client.as_str()) {
            RATE_LIMITED_TOTAL.inc();
            tracing::warn!(%client, retry_after_ms = retry_after.as_millis() as u64, "rate limit exceeded");
            return Err(LookupError::RateLimited { retry_after });
        }

        if let Some(entry) = self.cache.get(&subject) {
            CACHE_HITS.inc();
            tracing::debug!(%client, subject = %subject, "cache hit");
            return Ok(Outcome {
                payload: entry.payload,
                from_cache: true,
                telemetry: entry.telemetry,
            });
        }
        CACHE_MISSES.inc();
        tracing::debug!(%client, subject = %subject, "cache miss, calling upstream");

        let fetched = match self.upstream.fetch_profile(&subject).await {
            Ok(fetched) => fetched,
            Err(err) => {
                if let Some(telemetry) = err.telemetry() {
                    UPSTREAM_REMAINING.set(telemetry.remaining as f64);
                }
                return Err(self.map_upstream_error(&subject, err));
            }
        };

        if let Some(telemetry) = &fetched.telemetry {
            UPSTREAM_REMAINING.set(telemetry.remaining as f64);
        }
        self.cache
            .put(&subject, fetched.payload.clone(), fetched.telemetry.clone());
        CACHE_SIZE.set(self.cache.len() as f64);

        Ok(Outcome {
            payload: fetched.payload,
            from_cache: false,
            telemetry: fetched.telemetry,
        })
    }

    fn map_upstream_error(&self, subject: &str, err: UpstreamError) -> LookupError {
        match err {
            UpstreamError::NotFound { .. } => {
                tracing::debug!(subject, "subject not found upstream");
                LookupError::SubjectNotFound
            }
            UpstreamError::Forbidden { .. } => {
                UPSTREAM_ERRORS.inc();
                tracing::warn!(subject, "upstream quota exhausted");
                LookupError::UpstreamExhausted
            }
            UpstreamError::Transient { status, .. } => {
                UPSTREAM_ERRORS.inc();
                tracing::warn!(subject, status, "upstream returned an error status");
                LookupError::UpstreamError {
                    status: Some(status),
                    detail: format!("upstream returned status {}", status),
                }
            }
            other => {
                UPSTREAM_ERRORS.inc();
                tracing::error!(subject, error = %other, "upstream request failed");
                LookupError::UpstreamError {
                    status: None,
                    detail: other.to_string(),
                }
            }
        }
    }
}
