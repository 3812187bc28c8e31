//! Reusable egui components with Tailwind-inspired styling.
//!
//! - **Buttons**: the styled push button, close button
//! - **Palette**: draggable palette tiles and the drag ghost
//! - **Frames**: placed-widget frame
//! - **Layout**: headings, section labels, separators

pub mod buttons;
pub mod frames;
pub mod layout;
pub mod palette;

pub use buttons::{ButtonVariant, CloseButton, StyledButton};
pub use frames::widget_frame;
pub use layout::{heading, section_label, separator};
pub use palette::{PaletteTile, drag_ghost};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Small button size (close buttons)
    pub const SMALL: f32 = 18.0;
    /// Standard button height
    pub const BUTTON_HEIGHT: f32 = 28.0;
    /// Palette tile height
    pub const TILE_HEIGHT: f32 = 40.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
}

/// Standard colors used across widgets.
pub mod theme {
    use egui::Color32;

    /// Text color (dark gray)
    pub const TEXT: Color32 = Color32::from_rgb(60, 60, 60);
    /// Muted text color
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(120, 120, 120);
    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
    /// Primary action color (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Primary action color when hovered
    pub const ACCENT_HOVER: Color32 = Color32::from_rgb(37, 99, 235);
    /// Destructive action color (red)
    pub const DANGER: Color32 = Color32::from_rgb(239, 68, 68);
    /// Hover background
    pub const HOVER_BG: Color32 = Color32::from_rgb(245, 245, 245);
    /// Placed widget background
    pub const WIDGET_BG: Color32 = Color32::WHITE;
    /// Panel background
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
}
