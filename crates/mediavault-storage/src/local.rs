//! Local filesystem storage backend, for development and tests.

use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// `base_path` is the storage root; `base_url` is the base under
    /// which files are served (e.g. "http://localhost:8000/files").
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Keys are generated from UUIDs and sanitized names, but reject
    /// traversal sequences anyway.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(StorageError::BackendError(format!(
                "Invalid storage key: {}",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;
        fs::write(&path, data)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        tracing::debug!(key = %key, "Local upload successful");
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    async fn presigned_url(&self, key: &str, _expires_in: Duration) -> Option<String> {
        // No signing for local files; the URL is stable.
        Some(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Idempotent: a missing key is not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost/files".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (_dir, storage) = storage().await;
        storage
            .put("a/b/c.bin", vec![1, 2, 3], "application/octet-stream")
            .await
            .unwrap();
        assert_eq!(storage.get("a/b/c.bin").await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.get("missing").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, storage) = storage().await;
        storage.put("x.bin", vec![0], "text/plain").await.unwrap();
        storage.delete("x.bin").await.unwrap();
        // Second delete of the same key still succeeds.
        storage.delete("x.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let (_dir, storage) = storage().await;
        assert!(storage.get("../etc/passwd").await.is_err());
        assert!(storage.put("/abs", vec![], "x").await.is_err());
    }

    #[tokio::test]
    async fn test_presigned_url_is_stable() {
        let (_dir, storage) = storage().await;
        let url = storage
            .presigned_url("k/v.jpg", Duration::from_secs(3600))
            .await;
        assert_eq!(url.as_deref(), Some("http://localhost/files/k/v.jpg"));
    }
}
