//! Storage abstraction for persistence.
//!
//! Backends are plain key-value stores holding strings verbatim. The
//! layout bridge ([`LayoutStore`]) is the only component that gives those
//! strings meaning.

mod layout;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use layout::{LAYOUT_KEY, LayoutStore};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for key-value storage backends.
///
/// Implementations can store values in memory, in files, or in the
/// browser's `localStorage` (WASM).
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Read the value stored under a key.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value under a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// List all keys.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Trait for key-value storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    /// Read the value stored under a key.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value under a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// List all keys.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists.
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = LocalStorage;

/// Create the default storage backend for this platform.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<PlatformStorage> {
    FileStorage::default_location()
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<PlatformStorage> {
    LocalStorage::new()
}
