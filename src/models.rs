use axum::http::HeaderMap;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

pub const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATELIMIT_RESET: &str = "x-ratelimit-reset";

// Search API request format
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct LookupRequest {
    #[serde(default)]
    pub username: Option<String>,
}

/// Upstream quota state as last reported by the profile API.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitTelemetry {
    pub remaining: u64,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub reset_time: DateTime<Utc>,
}

impl RateLimitTelemetry {
    // Both headers must be present and numeric, otherwise there is no telemetry
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_number(headers, RATELIMIT_REMAINING)?;
        let reset_epoch = header_number(headers, RATELIMIT_RESET)?;
        let reset_time = DateTime::from_timestamp(i64::try_from(reset_epoch).ok()?, 0)?;

        Some(Self {
            remaining,
            reset_time,
        })
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

// 2024-01-01T00:00:00.000Z
fn serialize_iso_millis<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// What the mediator hands back on success
#[derive(Clone, Debug)]
pub struct Outcome {
    pub payload: Value,
    pub from_cache: bool,
    pub telemetry: Option<RateLimitTelemetry>,
}

// Search API response format
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub data: Value,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitTelemetry>,
}

impl From<Outcome> for LookupResponse {
    fn from(outcome: Outcome) -> Self {
        Self {
            data: outcome.payload,
            from_cache: outcome.from_cache,
            rate_limit: outcome.telemetry,
        }
    }
}

// Error body, `rateLimited` only set on local 429s
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limited: Option<bool>,
}
