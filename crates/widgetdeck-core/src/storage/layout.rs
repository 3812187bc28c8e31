//! Layout persistence: the whole widget collection under one key.

use crate::storage::{Storage, StorageError, StorageResult};
use crate::widget::Widget;
use std::sync::Arc;

/// Key the layout is stored under.
pub const LAYOUT_KEY: &str = "canvasWidgets";

/// Saves and restores the widget collection as a JSON array.
pub struct LayoutStore<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Key holding the layout.
    key: String,
}

impl<S: Storage> LayoutStore<S> {
    /// Create a layout store using the default key.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_key(storage, LAYOUT_KEY)
    }

    /// Create a layout store using a custom key.
    pub fn with_key(storage: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Get the storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write the layout.
    pub fn save(&self, widgets: &[Widget]) -> StorageResult<()> {
        let json = serde_json::to_string(widgets)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(&self.key, &json)?;
        log::info!("Layout saved: {} widgets under '{}'", widgets.len(), self.key);
        Ok(())
    }

    /// Read the layout. A missing layout is an empty one.
    pub fn load(&self) -> StorageResult<Vec<Widget>> {
        let Some(json) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse layout '{}': {}", self.key, e))
        })
    }

    /// Read the layout, starting empty if it cannot be read.
    pub fn restore(&self) -> Vec<Widget> {
        match self.load() {
            Ok(widgets) => {
                log::info!("Layout restored: {} widgets", widgets.len());
                widgets
            }
            Err(e) => {
                log::error!("Could not restore layout, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Check if a layout has been saved.
    pub fn has_saved_layout(&self) -> StorageResult<bool> {
        self.storage.contains(&self.key)
    }

    /// Delete the saved layout.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove(&self.key)
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}
