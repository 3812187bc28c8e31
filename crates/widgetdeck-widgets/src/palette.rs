//! Palette components: draggable template tiles and the drag ghost.

use egui::{
    Align2, Color32, Context, CornerRadius, CursorIcon, FontId, Id, LayerId, Order, Pos2, Rect,
    Response, Sense, Stroke, StrokeKind, Ui, vec2,
};

use crate::{sizing, theme};

/// A tile in the palette that can be dragged onto the canvas.
pub struct PaletteTile<'a> {
    label: &'a str,
    active: bool,
}

impl<'a> PaletteTile<'a> {
    /// Create a new tile.
    pub fn new(label: &'a str) -> Self {
        Self { label, active: false }
    }

    /// Mark the tile as the source of the current drag.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Show the tile. The response senses drags, not clicks.
    pub fn show(self, ui: &mut Ui) -> Response {
        let size = vec2(ui.available_width(), sizing::TILE_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, Sense::drag());

        if ui.is_rect_visible(rect) {
            let bg_color = if self.active || response.hovered() {
                theme::HOVER_BG
            } else {
                theme::WIDGET_BG
            };
            let border = if self.active { theme::ACCENT } else { theme::BORDER };
            let radius = CornerRadius::same(sizing::CORNER_RADIUS);

            ui.painter().rect_filled(rect, radius, bg_color);
            ui.painter()
                .rect_stroke(rect, radius, Stroke::new(1.0, border), StrokeKind::Inside);
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.label,
                FontId::proportional(13.0),
                theme::TEXT,
            );
        }

        response.on_hover_cursor(CursorIcon::Grab)
    }
}

/// Paint a translucent label following the pointer while something is dragged.
///
/// `top_left` is where the dragged item would land if dropped now.
pub fn drag_ghost(ctx: &Context, top_left: Pos2, label: &str) {
    let painter = ctx.layer_painter(LayerId::new(Order::Tooltip, Id::new("drag_ghost")));
    let font_id = FontId::proportional(13.0);
    let galley = painter.layout_no_wrap(label.to_string(), font_id.clone(), theme::TEXT);
    let rect = Rect::from_min_size(top_left, galley.size() + vec2(24.0, 16.0));
    let radius = CornerRadius::same(sizing::CORNER_RADIUS);

    painter.rect_filled(rect, radius, Color32::from_rgba_unmultiplied(235, 245, 255, 220));
    painter.rect_stroke(rect, radius, Stroke::new(1.0, theme::ACCENT), StrokeKind::Inside);
    painter.text(rect.center(), Align2::CENTER_CENTER, label, font_id, theme::TEXT);
    ctx.set_cursor_icon(CursorIcon::Grabbing);
}
