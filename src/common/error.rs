// Error handling types for the web services

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;
use tracing::{error, warn};

use super::validation::ValidationResult;
use crate::auth::flow::AuthError;
use crate::services::aws::StorageError;
use crate::templates;

/// Request-terminating errors.
///
/// Every variant is logged with its detail here; the page shown to the user
/// only carries a generic message.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    NotFound(String),
    InternalServer(String),
    BadUpload(String),
    Auth(AuthError),
    Storage(StorageError),
    UpstreamTimeout(&'static str),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::BadUpload(msg) => write!(f, "Bad Upload: {}", msg),
            ApiError::Auth(e) => write!(f, "Authentication Error: {}", e),
            ApiError::Storage(e) => write!(f, "Storage Error: {}", e),
            ApiError::UpstreamTimeout(call) => write!(f, "Upstream Timeout: {}", call),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(e) => e.status(),
            ApiError::InternalServer(_) | ApiError::Storage(_) | ApiError::UpstreamTimeout(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServer(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadUpload(_) => "BAD_UPLOAD",
            ApiError::Auth(e) => e.code(),
            ApiError::Storage(_) => "STORAGE_FAILURE",
            ApiError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
        }
    }

    /// The message rendered to the user
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized(_) => "Unauthorized".to_string(),
            ApiError::NotFound(msg) | ApiError::BadUpload(msg) => msg.clone(),
            ApiError::InternalServer(_) => "Internal Server Error".to_string(),
            ApiError::Auth(e) => e.public_message().to_string(),
            ApiError::Storage(_) => "Failed to upload file".to_string(),
            ApiError::UpstreamTimeout(_) => "The request timed out, please try again".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        } else {
            warn!(code = self.code(), error = %self, "Request rejected");
        }

        let page = templates::error_page(status, &self.public_message());
        (status, Html(page)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Storage(e)
    }
}

/// Rejected validation becomes a 400 carrying every failed rule
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            ApiError::BadUpload(result.summary())
        }
    }
}
