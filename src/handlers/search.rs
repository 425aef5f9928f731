use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;

use crate::error::LookupError;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{LookupRequest, LookupResponse};
use crate::state::AppState;

// POST /api/search {"username": "..."}
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<LookupResponse>, LookupError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    // a body we cannot read carries no username
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected search body");
            return Err(LookupError::InvalidInput);
        }
    };

    let result = state
        .mediator
        .handle(&headers, request.username.as_deref())
        .await;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    result.map(|outcome| Json(outcome.into()))
}
