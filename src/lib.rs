//! Caching, rate-limited proxy in front of the GitHub users API.
//!
//! A lookup passes through [`identity`] (who is calling), [`rate_limit`]
//! (are they over quota), [`cache`] (do we already have the profile) and
//! finally [`upstream`]. [`mediator::RequestMediator`] wires these together;
//! [`app`] exposes it over HTTP.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod mediator;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod upstream;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{health_handler, metrics_handler, search_handler};
use crate::state::AppState;

// creating the router with routes
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/search", post(search_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
