use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub async fn metrics_handler() -> Response {
    match crate::metrics::render() {
        Ok(body) => body.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
