//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self.values.read().map_err(lock_error)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.values.write().map_err(lock_error)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self.values.write().map_err(lock_error)?;
        values.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let values = self.values.read().map_err(lock_error)?;
        Ok(values.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        storage.set("test", "[1,2]").unwrap();
        assert_eq!(storage.get("test").unwrap().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_missing_key() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_contains() {
        let storage = MemoryStorage::new();
        assert!(!storage.contains("test").unwrap());
        storage.set("test", "").unwrap();
        assert!(storage.contains("test").unwrap());
    }

    #[test]
    fn test_remove() {
        let storage = MemoryStorage::new();
        storage.set("test", "x").unwrap();
        storage.remove("test").unwrap();
        assert!(!storage.contains("test").unwrap());

        // Removing again is fine
        storage.remove("test").unwrap();
    }

    #[test]
    fn test_keys() {
        let storage = MemoryStorage::new();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();

        let keys = storage.keys().unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"a".to_string()));
        assert!(keys.contains(&"b".to_string()));
    }
}
