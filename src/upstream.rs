use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

use crate::models::RateLimitTelemetry;

pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

// A fetched profile plus whatever quota info came with it
#[derive(Debug, Clone)]
pub struct FetchedProfile {
    pub payload: Value,
    pub telemetry: Option<RateLimitTelemetry>,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("subject not found upstream")]
    NotFound { telemetry: Option<RateLimitTelemetry> },

    #[error("upstream quota exhausted")]
    Forbidden { telemetry: Option<RateLimitTelemetry> },

    #[error("upstream returned status {status}")]
    Transient {
        status: u16,
        telemetry: Option<RateLimitTelemetry>,
    },

    #[error("request to upstream failed: {0}")]
    Network(String),

    #[error("could not decode upstream body: {0}")]
    InvalidBody(String),

    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
}

impl UpstreamError {
    pub fn telemetry(&self) -> Option<&RateLimitTelemetry> {
        match self {
            UpstreamError::NotFound { telemetry }
            | UpstreamError::Forbidden { telemetry }
            | UpstreamError::Transient { telemetry, .. } => telemetry.as_ref(),
            _ => None,
        }
    }

    // Map a non-success status to its error kind
    pub fn from_status(status: StatusCode, telemetry: Option<RateLimitTelemetry>) -> Self {
        match status {
            StatusCode::NOT_FOUND => UpstreamError::NotFound { telemetry },
            StatusCode::FORBIDDEN => UpstreamError::Forbidden { telemetry },
            other => UpstreamError::Transient {
                status: other.as_u16(),
                telemetry,
            },
        }
    }
}

/// Source of user profiles. One call per lookup, never retried here.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, subject: &str) -> Result<FetchedProfile, UpstreamError>;
}

/// GitHub users API client.
pub struct GithubClient {
    client: Client,
    base_url: Url,
    user_agent: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(
        client: Client,
        base_url: &str,
        user_agent: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(base_url).map_err(|e| UpstreamError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            user_agent: user_agent.into(),
            // blank tokens count as none
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // {base}/users/{subject}, subject as one escaped segment
    pub fn profile_url(&self, subject: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("users")
            .push(subject);
        Ok(url)
    }
}

#[async_trait]
impl ProfileSource for GithubClient {
    async fn fetch_profile(&self, subject: &str) -> Result<FetchedProfile, UpstreamError> {
        let url = self.profile_url(subject)?;

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, &self.user_agent);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        let telemetry = RateLimitTelemetry::from_headers(response.headers());
        let status = response.status();
        tracing::debug!(subject, status = status.as_u16(), remaining = ?telemetry.as_ref().map(|t| t.remaining), "upstream responded");

        if !status.is_success() {
            return Err(UpstreamError::from_status(status, telemetry));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::InvalidBody(e.to_string()))?;

        Ok(FetchedProfile { payload, telemetry })
    }
}
