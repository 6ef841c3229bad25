//! Storage backends for the published discovery document.
//!
//! A backend holds exactly one snapshot: the last published document, as
//! the raw bytes produced by the canonical encoder.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Size of the document as handed to the backend
    pub bytes: usize,
    /// Human readable location of the written snapshot
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Read the stored snapshot; `Ok(None)` when nothing was published yet.
    async fn read_snapshot(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the stored snapshot.
    async fn write_snapshot(&self, bytes: &[u8]) -> Result<WriteMetadata>;

    /// Where the snapshot lives, for log messages.
    fn location(&self) -> String;
}
