use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::clock::{Clock, SystemClock};
use crate::config::Args;
use crate::mediator::RequestMediator;
use crate::rate_limit::SlidingWindowLimiter;
use crate::upstream::{GithubClient, UpstreamError};

// app's shared state

pub struct AppState {
    pub mediator: RequestMediator,
}

impl AppState {
    pub fn new(mediator: RequestMediator) -> Self {
        Self { mediator }
    }

    // Build the stores and the GitHub client once at startup
    pub fn from_args(args: &Args) -> Result<Self, UpstreamError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let limiter = Arc::new(SlidingWindowLimiter::new(
            args.rate_limit,
            args.rate_window(),
            clock.clone(),
        ));
        let cache = Arc::new(ResponseCache::new(args.cache_ttl(), clock));
        let upstream = Arc::new(GithubClient::new(
            reqwest::Client::new(),
            &args.upstream_url,
            args.user_agent.clone(),
            args.github_token.clone(),
        )?);

        if !upstream.has_token() {
            tracing::warn!("no GITHUB_TOKEN configured, upstream quota is the anonymous one");
        }

        Ok(Self::new(RequestMediator::new(limiter, cache, upstream)))
    }
}
