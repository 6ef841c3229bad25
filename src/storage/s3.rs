//! AWS S3 storage implementation.
//!
//! The snapshot is uploaded gzip-compressed with `Content-Encoding: gzip`,
//! so it can be served straight from the bucket (or a CDN in front of it).

use std::io::{Read, Write};

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use chrono::Utc;
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::{AppError, Result};
use crate::models::OutputConfig;
use crate::storage::{SnapshotStorage, WriteMetadata};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// S3-based snapshot storage.
pub struct S3Storage {
    client: Client,
    bucket: String,
    key: String,
    cache_control: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        key: impl Into<String>,
        cache_control: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
            cache_control: cache_control.into(),
        }
    }

    /// Create S3 storage from the output configuration and the ambient
    /// AWS credentials.
    pub async fn from_config(output: &OutputConfig) -> Result<Self> {
        let bucket = output
            .s3_bucket
            .clone()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| AppError::config("output.s3_bucket is not set"))?;

        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&sdk_config);

        Ok(Self::new(
            client,
            bucket,
            output.s3_key.clone(),
            output.cache_control.clone(),
        ))
    }
}

#[async_trait]
impl SnapshotStorage for S3Storage {
    async fn read_snapshot(&self) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() || service_err.is_invalid_object_state() {
                    log::info!("No readable snapshot at {}", self.location());
                    return Ok(None);
                }
                return Err(AppError::S3(service_err.to_string()));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::S3(e.to_string()))?
            .into_bytes();

        Ok(decode_snapshot(&body, &self.location()))
    }

    async fn write_snapshot(&self, bytes: &[u8]) -> Result<WriteMetadata> {
        let compressed = gzip(bytes)?;
        let compressed_len = compressed.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(compressed))
            .content_type("application/json")
            .content_encoding("gzip")
            .cache_control(&self.cache_control)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| AppError::S3(e.into_service_error().to_string()))?;

        log::info!(
            "Wrote {} bytes ({} compressed) to {}",
            bytes.len(),
            compressed_len,
            self.location()
        );

        Ok(WriteMetadata {
            bytes: bytes.len(),
            location: self.location(),
            timestamp: Utc::now(),
        })
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Stored body as plain bytes; a body that cannot be decompressed counts
/// as no snapshot, so the next run can replace it.
fn decode_snapshot(body: &[u8], location: &str) -> Option<Vec<u8>> {
    match gunzip(body) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("Snapshot at {location} cannot be decompressed, ignoring it: {e}");
            None
        }
    }
}

/// Decompress a stored body; uncompressed uploads are passed through.
fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes.to_vec());
    }
    let mut out = Vec::new();
    MultiGzDecoder::new(bytes).read_to_end(&mut out)?;
    Ok(out)
}
