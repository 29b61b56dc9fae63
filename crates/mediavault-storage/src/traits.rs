//! Storage abstraction trait
//!
//! All storage backends must implement [`Storage`]. The pipeline works
//! against this trait so tests can substitute an in-memory backend.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage gateway.
///
/// `put` returns only after the object is fully uploaded; there is no
/// partial-success signal. `delete` is idempotent: removing a missing key
/// succeeds from the caller's perspective. `presigned_url` is attempted
/// opportunistically by read paths and therefore yields `None` on any
/// backend failure instead of an error.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Option<String>;

    async fn delete(&self, key: &str) -> StorageResult<()>;
}
