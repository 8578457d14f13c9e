//! Health check endpoint for liveness probes.

use axum::http::StatusCode;

/// Health handler. Returns 200 whenever the server is up.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
