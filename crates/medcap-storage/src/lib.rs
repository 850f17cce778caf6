//! Medcap Storage Library
//!
//! Storage abstraction and the local filesystem backend for uploaded media.
//!
//! # Storage key format
//!
//! Keys are category-scoped and always forward-slash separated, independent
//! of the host filesystem: `images/{filename}` or `videos/{filename}`.
//! Keys must not contain `..` or a leading `/`.

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{OverwritePolicy, Storage, StorageError, StorageResult, StoredFile};
