//! Application configuration.

use std::path::PathBuf;
use std::sync::Arc;

use peniko::Color;
use widgetdeck_core::storage::{PlatformStorage, create_default_storage};
use widgetdeck_core::{LAYOUT_KEY, LayoutStore};

/// Environment variable overriding the storage directory (native only).
pub const STORAGE_DIR_VAR: &str = "WIDGETDECK_STORAGE_DIR";
/// Environment variable overriding the key the layout is saved under.
pub const LAYOUT_KEY_VAR: &str = "WIDGETDECK_LAYOUT_KEY";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    /// Width of the widget palette in points.
    pub palette_width: f32,
    /// Directory for layout files. `None` uses the platform default.
    pub storage_dir: Option<PathBuf>,
    pub layout_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "WidgetDeck".to_string(),
            width: 1280,
            height: 800,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            palette_width: 180.0,
            storage_dir: None,
            layout_key: LAYOUT_KEY.to_string(),
        }
    }
}

impl AppConfig {
    /// Default configuration with overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Default configuration with overrides from `lookup`. Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(dir) = read(STORAGE_DIR_VAR) {
            config.storage_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = read(LAYOUT_KEY_VAR) {
            config.layout_key = key;
        }
        config
    }

    /// Background color for egui.
    pub fn background_color32(&self) -> egui::Color32 {
        let rgba = self.background_color.to_rgba8();
        egui::Color32::from_rgba_unmultiplied(rgba.r, rgba.g, rgba.b, rgba.a)
    }

    /// Background color as a surface clear color.
    pub fn clear_color(&self) -> vello::wgpu::Color {
        let [r, g, b, a] = self.background_color.components;
        vello::wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }

    /// Open the layout store.
    ///
    /// Returns `None` when no storage backend is available; the editor then
    /// runs without persistence.
    pub fn open_layout_store(&self) -> Option<LayoutStore<PlatformStorage>> {
        #[cfg(not(target_arch = "wasm32"))]
        let storage = match &self.storage_dir {
            Some(dir) => widgetdeck_core::storage::FileStorage::new(dir.clone()),
            None => create_default_storage(),
        };
        #[cfg(target_arch = "wasm32")]
        let storage = create_default_storage();

        match storage {
            Ok(storage) => {
                log::info!("Layout storage ready, key '{}'", self.layout_key);
                Some(LayoutStore::with_key(Arc::new(storage), self.layout_key.clone()))
            }
            Err(e) => {
                log::error!("Layout storage unavailable, saving is disabled: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.layout_key, LAYOUT_KEY);
        assert_eq!(config.storage_dir, None);
        assert_eq!(config.title, "WidgetDeck");
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (STORAGE_DIR_VAR, "/tmp/layouts"),
            (LAYOUT_KEY_VAR, "kioskLayout"),
        ]));
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/layouts")));
        assert_eq!(config.layout_key, "kioskLayout");
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let config = AppConfig::from_lookup(lookup(&[(LAYOUT_KEY_VAR, "  ")]));
        assert_eq!(config.layout_key, LAYOUT_KEY);
    }

    #[test]
    fn test_background_conversions() {
        let config = AppConfig::default();
        assert_eq!(
            config.background_color32(),
            egui::Color32::from_rgb(250, 250, 250)
        );
        let clear = config.clear_color();
        assert!((clear.r - 250.0 / 255.0).abs() < 1e-6);
        assert_eq!(clear.a, 1.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_open_layout_store_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            storage_dir: Some(dir.path().to_path_buf()),
            layout_key: "testLayout".to_string(),
            ..AppConfig::default()
        };

        let layout = config.open_layout_store().unwrap();
        layout.save(&[]).unwrap();

        assert_eq!(layout.key(), "testLayout");
        assert!(dir.path().join("testLayout.json").exists());
    }
}
