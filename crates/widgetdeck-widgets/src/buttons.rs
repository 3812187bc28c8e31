//! Button components: the styled push button and the close button.

use egui::{Align2, Color32, CornerRadius, CursorIcon, FontId, Sense, Stroke, StrokeKind, Ui, vec2};

use crate::{sizing, theme};

/// Visual variant of a [`StyledButton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    /// Solid blue, white label.
    #[default]
    Primary,
    /// Light gray with a border.
    Secondary,
}

/// A push button with a text label.
pub struct StyledButton<'a> {
    label: &'a str,
    variant: ButtonVariant,
    min_width: f32,
}

impl<'a> StyledButton<'a> {
    /// Create a new primary button.
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            variant: ButtonVariant::Primary,
            min_width: 0.0,
        }
    }

    /// Use the secondary style.
    pub fn secondary(mut self) -> Self {
        self.variant = ButtonVariant::Secondary;
        self
    }

    /// Set minimum width.
    pub fn min_width(mut self, width: f32) -> Self {
        self.min_width = width;
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let font_id = FontId::proportional(13.0);
        let galley = ui
            .painter()
            .layout_no_wrap(self.label.to_string(), font_id.clone(), Color32::PLACEHOLDER);
        let width = (galley.size().x + 24.0).max(self.min_width);
        let (rect, response) =
            ui.allocate_exact_size(vec2(width, sizing::BUTTON_HEIGHT), Sense::click());

        if ui.is_rect_visible(rect) {
            let hovered = response.hovered();
            let (bg_color, text_color) = match self.variant {
                ButtonVariant::Primary if hovered => (theme::ACCENT_HOVER, Color32::WHITE),
                ButtonVariant::Primary => (theme::ACCENT, Color32::WHITE),
                ButtonVariant::Secondary if hovered => (Color32::from_gray(235), theme::TEXT),
                ButtonVariant::Secondary => (Color32::from_gray(245), theme::TEXT),
            };

            let radius = CornerRadius::same(sizing::CORNER_RADIUS);
            ui.painter().rect_filled(rect, radius, bg_color);
            if self.variant == ButtonVariant::Secondary {
                ui.painter().rect_stroke(
                    rect,
                    radius,
                    Stroke::new(1.0, theme::BORDER),
                    StrokeKind::Inside,
                );
            }

            ui.painter().text(rect.center(), Align2::CENTER_CENTER, self.label, font_id, text_color);
        }

        let clicked = response.clicked();
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

/// A small square button with a cross, used to remove things.
pub struct CloseButton<'a> {
    tooltip: &'a str,
}

impl<'a> CloseButton<'a> {
    /// Create a new close button.
    pub fn new(tooltip: &'a str) -> Self {
        Self { tooltip }
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let (rect, response) =
            ui.allocate_exact_size(vec2(sizing::SMALL, sizing::SMALL), Sense::click());

        if ui.is_rect_visible(rect) {
            let (bg_color, cross_color) = if response.hovered() {
                (theme::DANGER, Color32::WHITE)
            } else {
                (Color32::TRANSPARENT, theme::TEXT_MUTED)
            };
            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);

            let inner = rect.shrink(5.0);
            let stroke = Stroke::new(1.5, cross_color);
            ui.painter().line_segment([inner.left_top(), inner.right_bottom()], stroke);
            ui.painter().line_segment([inner.right_top(), inner.left_bottom()], stroke);
        }

        let clicked = response.clicked();
        response.on_hover_text(self.tooltip).on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}
