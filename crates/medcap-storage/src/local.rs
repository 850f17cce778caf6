use crate::traits::{OverwritePolicy, Storage, StorageError, StorageResult, StoredFile};
use async_trait::async_trait;
use medcap_core::constants::{IMAGES_SUBDIR, VIDEOS_SUBDIR};
use medcap_core::MediaType;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    upload_root: PathBuf,
    overwrite_policy: OverwritePolicy,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `upload_root`, creating
    /// the `images/` and `videos/` category directories if absent.
    pub async fn new(
        upload_root: impl Into<PathBuf>,
        overwrite_policy: OverwritePolicy,
    ) -> StorageResult<Self> {
        let upload_root = upload_root.into();

        for subdir in [IMAGES_SUBDIR, VIDEOS_SUBDIR] {
            let dir = upload_root.join(subdir);
            fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create storage directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage {
            upload_root,
            overwrite_policy,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys containing path traversal sequences that could escape
    /// the upload root.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.upload_root.join(storage_key))
    }

    /// Forward-slash path string for a key, including the upload root.
    /// Clients build URLs from this, so the separator is fixed regardless of
    /// the host filesystem convention.
    fn public_path(&self, key: &str) -> String {
        let root = self.upload_root.to_string_lossy().replace('\\', "/");
        format!("{}/{}", root.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(
        &self,
        media_type: MediaType,
        filename: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredFile> {
        let key = format!("{}/{}", media_type.subdir(), filename);
        let path = self.key_to_path(&key)?;
        let size = data.len();

        if self.overwrite_policy == OverwritePolicy::Reject
            && fs::try_exists(&path).await.unwrap_or(false)
        {
            return Err(StorageError::AlreadyExists(key));
        }

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredFile {
            public_path: self.public_path(&key),
            key,
            path,
            media_type,
        })
    }

    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(data)
    }

    fn path_for(&self, storage_key: &str) -> StorageResult<PathBuf> {
        self.key_to_path(storage_key)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %storage_key, "Local storage delete successful");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_storage(policy: OverwritePolicy) -> (tempfile::TempDir, LocalStorage) {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), policy).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let (_dir, storage) = test_storage(OverwritePolicy::Replace).await;

        let data = b"test data".to_vec();
        let stored = storage
            .store(MediaType::Image, "test.jpg", data.clone())
            .await
            .unwrap();

        assert_eq!(stored.key, "images/test.jpg");
        assert!(stored.public_path.ends_with("/images/test.jpg"));
        assert!(!stored.public_path.contains('\\'));

        let read_back = storage.read(&stored.key).await.unwrap();
        assert_eq!(data, read_back);
    }

    #[tokio::test]
    async fn test_video_category() {
        let (_dir, storage) = test_storage(OverwritePolicy::Replace).await;

        let stored = storage
            .store(MediaType::Video, "clip.mp4", b"not a real video".to_vec())
            .await
            .unwrap();

        assert_eq!(stored.key, "videos/clip.mp4");
        assert!(stored.path.parent().unwrap().ends_with("videos"));
    }

    #[tokio::test]
    async fn test_replace_policy_overwrites() {
        let (_dir, storage) = test_storage(OverwritePolicy::Replace).await;

        storage
            .store(MediaType::Image, "same.png", b"first".to_vec())
            .await
            .unwrap();
        let stored = storage
            .store(MediaType::Image, "same.png", b"second".to_vec())
            .await
            .unwrap();

        assert_eq!(storage.read(&stored.key).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_reject_policy_fails_on_collision() {
        let (_dir, storage) = test_storage(OverwritePolicy::Reject).await;

        storage
            .store(MediaType::Image, "same.png", b"first".to_vec())
            .await
            .unwrap();
        let result = storage
            .store(MediaType::Image, "same.png", b"second".to_vec())
            .await;

        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        assert_eq!(storage.read("images/same.png").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, storage) = test_storage(OverwritePolicy::Replace).await;

        let result = storage.read("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let (_dir, storage) = test_storage(OverwritePolicy::Replace).await;
        assert!(storage.delete("images/nope.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn test_category_dirs_created_at_startup() {
        let dir = tempdir().unwrap();
        let _storage = LocalStorage::new(dir.path(), OverwritePolicy::Replace)
            .await
            .unwrap();
        assert!(dir.path().join("images").is_dir());
        assert!(dir.path().join("videos").is_dir());
    }
}
