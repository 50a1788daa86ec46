// src/uploads/validators.rs

use super::models::UploadCandidate;
use crate::common::{ValidationResult, Validator};

/// 50 MiB
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: [&str; 7] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/zip",
    "application/x-zip-compressed",
];

pub const TOO_LARGE_MESSAGE: &str = "File too large (max 50 MB)";
pub const INVALID_TYPE_MESSAGE: &str =
    "Invalid file type. Only images, PDFs, and ZIP files are allowed";

// ============================================================================
// Upload Validators
// ============================================================================

pub struct UploadValidator;

impl Validator<UploadCandidate> for UploadValidator {
    fn validate(&self, data: &UploadCandidate) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.filename.trim().is_empty() {
            result.add_error("file", "No file provided");
        }

        if data.size > MAX_UPLOAD_BYTES {
            result.add_error("size", TOO_LARGE_MESSAGE);
        }

        if !is_allowed_content_type(&data.content_type) {
            result.add_error("content_type", INVALID_TYPE_MESSAGE);
        }

        result
    }
}

/// Exact match against the allow-list
pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

// ============================================================================
// Storage keys
// ============================================================================

/// `uploads/<user>/<unix seconds>_<name>`
pub fn storage_key(user_id: &str, unix_seconds: i64, filename: &str) -> String {
    format!(
        "uploads/{}/{}_{}",
        user_id,
        unix_seconds,
        sanitize_filename(filename)
    )
}

/// Last path component with control characters removed.
///
/// Browsers on some platforms send the full client path; only the base name
/// may reach a storage key.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => "file".to_string(),
        name => name.to_string(),
    }
}
