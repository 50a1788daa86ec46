// src/uploads/models.rs

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use super::validators::{ALLOWED_CONTENT_TYPES, MAX_UPLOAD_BYTES};

/// Wall-clock format carried in the `uploadTime` query parameter
pub const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A file as received from the multipart form, before validation
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

/// A stored object
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub size: u64,
    pub content_type: String,
    pub key: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    pub user_id: String,
}

impl FileUpload {
    /// Query string for the confirmation page, without the leading `?`
    pub fn success_query(&self) -> String {
        format!(
            "filename={}&size={}&contentType={}&url={}&uploadTime={}",
            urlencoding::encode(&self.filename),
            self.size,
            urlencoding::encode(&self.content_type),
            urlencoding::encode(&self.url),
            urlencoding::encode(&self.uploaded_at.format(UPLOAD_TIME_FORMAT).to_string()),
        )
    }
}

/// Query parameters of `/success`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessQuery {
    pub filename: Option<String>,
    pub size: Option<String>,
    pub content_type: Option<String>,
    pub url: Option<String>,
    pub upload_time: Option<String>,
}

/// What the confirmation page shows
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub filename: String,
    pub size: u64,
    pub content_type: String,
    pub url: String,
    pub uploaded_at: NaiveDateTime,
}

impl SuccessQuery {
    /// `None` when the filename or size is absent.
    ///
    /// A size that is not a number reads as 0 and an unreadable time as now.
    pub fn receipt(self) -> Option<UploadReceipt> {
        let filename = self.filename.filter(|f| !f.is_empty())?;
        let size = self.size.filter(|s| !s.is_empty())?;

        let uploaded_at = self
            .upload_time
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, UPLOAD_TIME_FORMAT).ok())
            .unwrap_or_else(|| Utc::now().naive_utc());

        Some(UploadReceipt {
            filename,
            size: size.parse().unwrap_or(0),
            content_type: self.content_type.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            uploaded_at,
        })
    }
}

/// Limits shown on the upload form
#[derive(Debug, Clone)]
pub struct UploadPageData {
    pub max_file_size: u64,
    pub allowed_types: &'static [&'static str],
    pub bucket: String,
}

impl UploadPageData {
    pub fn new(bucket: &str) -> Self {
        Self {
            max_file_size: MAX_UPLOAD_BYTES,
            allowed_types: &ALLOWED_CONTENT_TYPES,
            bucket: bucket.to_string(),
        }
    }
}
