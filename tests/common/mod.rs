#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use profile_gateway::cache::ResponseCache;
use profile_gateway::clock::{Clock, ManualClock};
use profile_gateway::mediator::RequestMediator;
use profile_gateway::models::RateLimitTelemetry;
use profile_gateway::rate_limit::SlidingWindowLimiter;
use profile_gateway::upstream::{FetchedProfile, ProfileSource, UpstreamError};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const WINDOW: Duration = Duration::from_secs(60);
pub const QUOTA: usize = 10;
pub const TTL: Duration = Duration::from_secs(600);

#[derive(Clone)]
pub enum Scripted {
    Found(Value),
    NotFound,
    Forbidden,
    Status(u16),
    Network,
}

// In-memory profile API that counts how often it is called
#[derive(Default)]
pub struct FakeProfileSource {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
    telemetry: Mutex<Option<RateLimitTelemetry>>,
}

impl FakeProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, subject: &str, response: Scripted) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(subject.to_string(), response);
        self
    }

    pub fn with_telemetry(self, remaining: u64, reset_epoch: i64) -> Self {
        *self.telemetry.lock().unwrap() = Some(RateLimitTelemetry {
            remaining,
            reset_time: chrono::DateTime::from_timestamp(reset_epoch, 0).unwrap(),
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for FakeProfileSource {
    async fn fetch_profile(&self, subject: &str) -> Result<FetchedProfile, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let telemetry = self.telemetry.lock().unwrap().clone();
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get(subject)
            .cloned()
            .unwrap_or(Scripted::NotFound);

        match scripted {
            Scripted::Found(payload) => Ok(FetchedProfile { payload, telemetry }),
            Scripted::NotFound => Err(UpstreamError::NotFound { telemetry }),
            Scripted::Forbidden => Err(UpstreamError::Forbidden { telemetry }),
            Scripted::Status(status) => Err(UpstreamError::Transient { status, telemetry }),
            Scripted::Network => Err(UpstreamError::Network("connection refused".into())),
        }
    }
}

pub struct Harness {
    pub mediator: Arc<RequestMediator>,
    pub source: Arc<FakeProfileSource>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(source: FakeProfileSource) -> Harness {
    let clock = Arc::new(ManualClock::new());
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let source = Arc::new(source);
    let mediator = RequestMediator::new(
        Arc::new(SlidingWindowLimiter::new(QUOTA, WINDOW, dyn_clock.clone())),
        Arc::new(ResponseCache::new(TTL, dyn_clock)),
        source.clone(),
    );

    Harness {
        mediator: Arc::new(mediator),
        source,
        clock,
    }
}

pub fn from_ip(ip: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_str(ip).unwrap());
    headers
}

pub fn octocat() -> Value {
    json!({"login": "octocat", "id": 583231, "name": "The Octocat"})
}
