// src/services/aws.rs
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3Error(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Object-storage capability used by the upload path
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Public URL of `key`; computed locally, no round trip
    fn url_for(&self, key: &str) -> String;

    fn bucket(&self) -> &str;
}

/// Amazon S3 backed store using the default AWS credential chain
#[derive(Debug, Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
    region: String,
}

impl S3Store {
    pub async fn new(region: &str, bucket: &str) -> Result<Self, StorageError> {
        if bucket.is_empty() {
            return Err(StorageError::InvalidConfig(
                "S3 bucket name not configured".to_string(),
            ));
        }

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        info!(bucket = %bucket, region = %region, "S3 client initialized");

        Ok(Self {
            client: S3Client::new(&aws_config),
            bucket: bucket.to_string(),
            region: region.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, bucket = %self.bucket, "Failed to upload file to S3");
                StorageError::S3Error(format!("Upload failed: {}", e))
            })?;

        info!(key = %key, bucket = %self.bucket, size = size, "File uploaded to S3 successfully");
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        object_url(&self.bucket, &self.region, key)
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Virtual-hosted-style S3 URL
pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}
