//! Storage abstraction trait
//!
//! This module defines the Storage trait that storage backends implement.

use std::path::PathBuf;

use async_trait::async_trait;
use medcap_core::MediaType;
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

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What to do when a stored filename collides with an existing file.
///
/// Collision handling is an explicit policy choice rather than a side effect
/// of path construction. The service default is `Replace`, matching the
/// observable behavior clients rely on (re-uploading `cat.jpg` refreshes it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Overwrite any existing file of the same name.
    #[default]
    Replace,
    /// Fail the upload with `StorageError::AlreadyExists`.
    Reject,
}

/// A file persisted by a storage backend.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Category-scoped storage key, always forward-slash separated
    /// (e.g. `images/cat.jpg`).
    pub key: String,
    /// Absolute-or-relative filesystem path of the stored file.
    pub path: PathBuf,
    /// Forward-slash path string including the upload root, suitable for
    /// client-side URL construction regardless of the host separator.
    pub public_path: String,
    pub media_type: MediaType,
}

/// Storage abstraction trait
///
/// Backends persist validated uploads under a category directory and hand
/// back keys that the processing pipeline can resolve to local paths. Only a
/// filesystem backend exists today; the trait keeps the seam so the pipeline
/// never touches paths directly.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `data` as `{category}/{filename}` and return the stored file.
    async fn store(
        &self,
        media_type: MediaType,
        filename: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredFile>;

    /// Read a file back by its storage key.
    async fn read(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Resolve a storage key to a filesystem path without touching disk.
    fn path_for(&self, storage_key: &str) -> StorageResult<PathBuf>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Delete a file by its storage key. Deleting a missing file is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;
}
