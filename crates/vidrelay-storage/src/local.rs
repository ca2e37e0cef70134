use crate::keys::validate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at `base_path`, creating the directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a storage key to a path under the root, refusing anything that escapes it.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_storage_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Existing targets may be symlinks; resolve and re-check containment.
        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
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
    #[tracing::instrument(skip(self, local_path), fields(key = %storage_key))]
    async fn upload_file(
        &self,
        storage_key: &str,
        local_path: &Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // An existing object under the same key is replaced.
        let size = fs::copy(local_path, &path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path.display(),
                key = %storage_key,
                "Local storage upload failed"
            );
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(size)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn source_file(dir: &Path, contents: &[u8]) -> PathBuf {
        let path = dir.join("source.bin");
        fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_local_storage_upload_and_exists() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let storage = LocalStorage::new(root.path()).await.unwrap();
        let source = source_file(scratch.path(), b"thumbnail bytes").await;

        let size = storage
            .upload_file("abc.png", &source, "image/png")
            .await
            .unwrap();

        assert_eq!(size, 15);
        assert!(storage.exists("abc.png").await.unwrap());
        assert!(!storage.exists("missing.png").await.unwrap());
        assert_eq!(
            fs::read(root.path().join("abc.png")).await.unwrap(),
            b"thumbnail bytes"
        );
    }

    #[tokio::test]
    async fn test_local_storage_creates_prefix_directories() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let storage = LocalStorage::new(root.path()).await.unwrap();
        let source = source_file(scratch.path(), b"mp4").await;

        storage
            .upload_file("portrait/k.mp4", &source, "video/mp4")
            .await
            .unwrap();

        assert!(root.path().join("portrait").join("k.mp4").exists());
    }

    #[tokio::test]
    async fn test_local_storage_overwrites_existing_key() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let storage = LocalStorage::new(root.path()).await.unwrap();

        let first = source_file(scratch.path(), b"first").await;
        storage.upload_file("k.png", &first, "image/png").await.unwrap();
        let second = source_file(scratch.path(), b"second!").await;
        storage.upload_file("k.png", &second, "image/png").await.unwrap();

        assert_eq!(fs::read(root.path().join("k.png")).await.unwrap(), b"second!");
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let storage = LocalStorage::new(root.path()).await.unwrap();
        let source = source_file(scratch.path(), b"x").await;

        let result = storage
            .upload_file("../escape.png", &source, "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_missing_source_is_io_error() {
        let root = tempdir().unwrap();
        let storage = LocalStorage::new(root.path()).await.unwrap();

        let result = storage
            .upload_file("k.png", Path::new("/nonexistent/source.png"), "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }
}
