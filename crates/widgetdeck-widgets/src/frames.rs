//! Frame for widgets placed on the canvas.

use egui::{Color32, CornerRadius, Frame, Margin, Stroke};

use crate::{sizing, theme};

/// Create the frame drawn around a widget placed on the canvas.
///
/// `highlighted` draws the accent border used while the widget is dragged.
pub fn widget_frame(highlighted: bool) -> Frame {
    let border = if highlighted { theme::ACCENT } else { theme::BORDER };
    Frame::new()
        .fill(theme::WIDGET_BG)
        .corner_radius(CornerRadius::same(sizing::CORNER_RADIUS))
        .stroke(Stroke::new(1.0, border))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 6,
            offset: [0, 2],
            color: Color32::from_black_alpha(10),
        })
        .inner_margin(Margin::same(6))
}
