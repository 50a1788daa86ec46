// src/logging_middleware.rs
//! Middleware for per-request access logging
//!
//! Bodies are never read here; upload streams pass through untouched.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, warn};

/// Logs method, path, status and latency of every request at debug level
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    debug!(method = %method, path = %path, "📥 Request");

    let response = next.run(request).await;
    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(method = %method, path = %path, status = status.as_u16(), latency_ms, "📤 Response");
    } else {
        debug!(method = %method, path = %path, status = status.as_u16(), latency_ms, "📤 Response");
    }

    response
}
