use axum::http::HeaderMap;
use std::fmt;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

// Shared bucket for every client we cannot place
pub const UNKNOWN_CLIENT: &str = "unknown";

// Rate-limit partition key. Not authenticated, collisions are expected
// (NAT, shared proxies).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the caller's identity from the first `X-Forwarded-For` hop.
///
/// Never fails: a missing, unreadable or empty header falls back to
/// [`UNKNOWN_CLIENT`].
pub fn identify(headers: &HeaderMap) -> ClientIdentity {
    let ip = headers
        .get(FORWARDED_FOR)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_CLIENT);

    ClientIdentity(ip.to_string())
}
