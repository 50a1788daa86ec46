// src/uploads/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use super::handlers;
use super::validators::MAX_UPLOAD_BYTES;

/// Room for multipart framing on top of the file itself
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Create the uploads router with the home, form, upload and success routes
pub fn uploads_routes() -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/upload", get(handlers::upload_form).post(handlers::upload_file))
        .route("/api/upload", post(handlers::upload_file))
        .route("/success", get(handlers::success))
        .layer(DefaultBodyLimit::max(
            (MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES) as usize,
        ))
}
