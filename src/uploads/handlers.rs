// src/uploads/handlers.rs
//! Upload pages and the multipart upload endpoint

use axum::{
    extract::{multipart::Field, Extension, Multipart, Query},
    response::{Html, Redirect},
};
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::models::{FileUpload, SuccessQuery, UploadCandidate, UploadPageData};
use super::validators::{storage_key, UploadValidator, MAX_UPLOAD_BYTES};
use crate::auth::{AuthedUser, PageUser};
use crate::common::{ApiError, AppState, Validator};
use crate::templates;

/// Multipart field that carries the file
const FILE_FIELD: &str = "file";

/// GET /
pub async fn home(
    Extension(state): Extension<Arc<AppState>>,
    PageUser(user): PageUser,
) -> Html<String> {
    Html(templates::home_page(&user, &state.config.auth_server_url))
}

/// GET /upload
pub async fn upload_form(
    Extension(state): Extension<Arc<AppState>>,
    PageUser(user): PageUser,
) -> Html<String> {
    let data = UploadPageData::new(state.storage.bucket());
    Html(templates::upload_page(&user, &data))
}

/// POST /upload, POST /api/upload
///
/// Session is checked before the body is touched. The file is read chunk by
/// chunk and refused as soon as it passes the size ceiling.
pub async fn upload_file(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let mut received: Option<(UploadCandidate, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, user_id = %user.id, "Failed to parse multipart form");
        ApiError::BadUpload("Failed to parse upload form".to_string())
    })? {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = read_limited(field, &filename, &content_type).await?;

        let candidate = UploadCandidate {
            filename,
            content_type,
            size: body.len() as u64,
        };
        received = Some((candidate, body));
        break;
    }

    let (candidate, body) =
        received.ok_or_else(|| ApiError::BadUpload("No file provided".to_string()))?;

    let validation = UploadValidator.validate(&candidate);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let now = Utc::now();
    let key = storage_key(&user.id, now.timestamp(), &candidate.filename);

    timeout(
        state.config.upstream_timeout,
        state.storage.put_object(&key, body, &candidate.content_type),
    )
    .await
    .map_err(|_| {
        error!(key = %key, "Object storage write timed out");
        ApiError::UpstreamTimeout("object storage write")
    })??;

    let upload = FileUpload {
        filename: candidate.filename,
        size: candidate.size,
        content_type: candidate.content_type,
        url: state.storage.url_for(&key),
        key,
        uploaded_at: now,
        user_id: user.id,
    };

    info!(
        user_id = %upload.user_id,
        key = %upload.key,
        size = upload.size,
        content_type = %upload.content_type,
        "File uploaded successfully"
    );

    Ok(Redirect::to(&format!("/success?{}", upload.success_query())))
}

/// Drain a file field, giving up once it exceeds [`MAX_UPLOAD_BYTES`]
async fn read_limited(
    mut field: Field<'_>,
    filename: &str,
    content_type: &str,
) -> Result<Bytes, ApiError> {
    let mut buffer = BytesMut::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        warn!(error = %e, filename = %filename, "Failed to read upload body");
        ApiError::BadUpload("Failed to parse upload form".to_string())
    })? {
        buffer.extend_from_slice(&chunk);

        if buffer.len() as u64 > MAX_UPLOAD_BYTES {
            let oversized = UploadCandidate {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                size: buffer.len() as u64,
            };
            return Err(UploadValidator.validate(&oversized).into());
        }
    }

    Ok(buffer.freeze())
}

/// GET /success
pub async fn success(
    PageUser(user): PageUser,
    Query(query): Query<SuccessQuery>,
) -> Result<Html<String>, ApiError> {
    let receipt = query
        .receipt()
        .ok_or_else(|| ApiError::NotFound("File information not found".to_string()))?;

    Ok(Html(templates::success_page(&user, &receipt)))
}
