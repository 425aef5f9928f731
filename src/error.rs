use axum::http::{HeaderValue, StatusCode, header::RETRY_AFTER};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Duration;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Every way a lookup can fail, as seen by the caller.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("username is required")]
    InvalidInput,

    #[error("too many requests, retry in {}s", retry_after_secs(.retry_after))]
    RateLimited { retry_after: Duration },

    #[error("user not found")]
    SubjectNotFound,

    #[error("upstream API rate limit exceeded")]
    UpstreamExhausted,

    #[error("upstream error (status {status:?}): {detail}")]
    UpstreamError { status: Option<u16>, detail: String },
}

pub type LookupResult<T> = Result<T, LookupError>;

// whole seconds, rounded up, at least 1
pub fn retry_after_secs(retry_after: &Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl LookupError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupError::InvalidInput => StatusCode::BAD_REQUEST,
            LookupError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            LookupError::SubjectNotFound => StatusCode::NOT_FOUND,
            LookupError::UpstreamExhausted => StatusCode::FORBIDDEN,
            LookupError::UpstreamError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // text shown to callers; upstream details stay in the logs
    fn public_message(&self) -> String {
        match self {
            LookupError::InvalidInput => "Username is required".to_string(),
            LookupError::RateLimited { retry_after } => format!(
                "Too many requests. Please wait {} seconds and try again.",
                retry_after_secs(retry_after)
            ),
            LookupError::SubjectNotFound => "User not found".to_string(),
            LookupError::UpstreamExhausted => {
                "GitHub API rate limit exceeded. Please try again later.".to_string()
            }
            LookupError::UpstreamError { .. } => {
                "An error occurred during the search. Please try again.".to_string()
            }
        }
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.public_message(),
            rate_limited: matches!(self, LookupError::RateLimited { .. }).then_some(true),
        });

        let mut response = (status, body).into_response();
        if let LookupError::RateLimited { retry_after } = &self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs(retry_after)));
        }
        response
    }
}
