//! WidgetDeck Application
//!
//! The application shell: windowing, the widget palette, the canvas with
//! its per-type editors, and the save trigger.

mod app;
mod config;
mod ui;

pub use app::App;
pub use config::{AppConfig, LAYOUT_KEY_VAR, STORAGE_DIR_VAR};
pub use ui::{SAVE_LAYOUT_LABEL, UiAction, UiState, render_ui};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
