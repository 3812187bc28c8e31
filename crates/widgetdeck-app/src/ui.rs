//! UI components using egui.

use std::collections::HashMap;

use egui::{
    Align2, Context, CursorIcon, FontId, Frame, Id, Margin, Order, Pos2, Rect, RichText, Sense,
    TextEdit, TextureHandle, TextureOptions, Vec2, vec2,
};
use kurbo::Point;
use thiserror::Error;
use widgetdeck_core::content::decode_data_url;
use widgetdeck_core::{
    Canvas, ContentEdit, ContentError, DataTransfer, DropTarget, Table, TransferBuffer, Widget,
    WidgetId, WidgetKind, WidgetTemplate, begin_template_drag, begin_widget_drag, catalog,
};
use widgetdeck_widgets::{
    CloseButton, PaletteTile, StyledButton, drag_ghost, heading, section_label, separator, theme,
    widget_frame,
};

/// Label of the save trigger.
pub const SAVE_LAYOUT_LABEL: &str = "Save Layout";

/// Width of text-like editors.
const EDITOR_WIDTH: f32 = 200.0;
/// Width of a table cell editor.
const CELL_WIDTH: f32 = 90.0;
/// Largest size an image preview is shown at.
const MAX_PREVIEW: Vec2 = vec2(240.0, 180.0);

/// Actions triggered by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Drop the dragged item at the pointer.
    Drop { pointer: Point, target: DropTarget },
    /// Change a widget's content.
    Edit(ContentEdit),
    /// Remove a widget from the canvas.
    Remove(WidgetId),
    /// Choose a picture for an Image widget.
    PickImage(WidgetId),
    /// The preview of a Button widget was pressed.
    ButtonPressed(WidgetId),
    /// Persist the layout.
    SaveLayout,
}

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragSource {
    Template(WidgetId),
    Placed(WidgetId),
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    source: DragSource,
    label: String,
}

/// Decoded preview of an Image widget, cached per content string.
struct ImagePreview {
    source: String,
    texture: Option<TextureHandle>,
}

#[derive(Debug, Error)]
enum PreviewError {
    #[error("invalid data URL: {0}")]
    DataUrl(#[from] ContentError),
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// UI state that lives across frames.
#[derive(Default)]
pub struct UiState {
    /// Transfer channel of the current drag gesture.
    transfer: TransferBuffer,
    drag: Option<ActiveDrag>,
    previews: HashMap<WidgetId, ImagePreview>,
    /// Message shown next to the save button.
    status: Option<String>,
}

impl UiState {
    /// Transfer channel of the current drag gesture.
    pub fn transfer(&self) -> &TransferBuffer {
        &self.transfer
    }

    /// Check if a drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start dragging a palette template.
    ///
    /// `grab_offset` is the pointer position relative to the tile's top-left.
    pub fn begin_template_drag(&mut self, template: &WidgetTemplate, grab_offset: Vec2) {
        self.transfer.clear_data();
        let offset = kurbo::Vec2::new(grab_offset.x as f64, grab_offset.y as f64);
        match begin_template_drag(&mut self.transfer, template, offset) {
            Ok(()) => {
                self.drag = Some(ActiveDrag {
                    source: DragSource::Template(template.id),
                    label: template.name.clone(),
                });
            }
            Err(e) => log::error!("Cannot start dragging {}: {}", template.name, e),
        }
    }

    /// Start dragging a widget that is already on the canvas.
    pub fn begin_widget_drag(&mut self, widget: &Widget) {
        self.transfer.clear_data();
        match begin_widget_drag(&mut self.transfer, widget) {
            Ok(()) => {
                self.drag = Some(ActiveDrag {
                    source: DragSource::Placed(widget.id),
                    label: widget.kind.display_name().to_string(),
                });
            }
            Err(e) => log::error!("Cannot start dragging widget {}: {}", widget.id, e),
        }
    }

    /// End the drag gesture and empty the transfer channel.
    pub fn finish_drag(&mut self) {
        self.transfer.clear_data();
        self.drag = None;
    }

    /// Show a status message next to the save button.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Current status message.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn is_drag_source(&self, source: DragSource) -> bool {
        self.drag.as_ref().is_some_and(|drag| drag.source == source)
    }

    /// Drop cached previews of widgets that are gone.
    fn prune_previews(&mut self, canvas: &Canvas) {
        self.previews.retain(|id, _| canvas.widget(*id).is_some());
    }

    fn image_preview(&mut self, ctx: &Context, widget: &Widget) -> Option<TextureHandle> {
        if let Some(preview) = self.previews.get(&widget.id) {
            if preview.source == widget.content {
                return preview.texture.clone();
            }
        }

        let texture = match load_preview(ctx, widget) {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("Cannot preview image of widget {}: {}", widget.id, e);
                None
            }
        };
        self.previews.insert(
            widget.id,
            ImagePreview {
                source: widget.content.clone(),
                texture: texture.clone(),
            },
        );
        texture
    }
}

fn load_preview(ctx: &Context, widget: &Widget) -> Result<TextureHandle, PreviewError> {
    let (_, bytes) = decode_data_url(&widget.content)?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    Ok(ctx.load_texture(
        format!("widget-image-{}", widget.id),
        color_image,
        TextureOptions::LINEAR,
    ))
}

/// Scale `size` down to fit the preview box, keeping its aspect ratio.
fn fit_preview(size: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (MAX_PREVIEW.x / size.x).min(MAX_PREVIEW.y / size.y).min(1.0);
    size * scale
}

fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

fn to_kurbo_rect(rect: Rect) -> kurbo::Rect {
    kurbo::Rect::new(
        rect.min.x as f64,
        rect.min.y as f64,
        rect.max.x as f64,
        rect.max.y as f64,
    )
}

/// Render the whole UI and return the triggered action, if any.
pub fn render_ui(
    ctx: &Context,
    ui_state: &mut UiState,
    canvas: &Canvas,
    palette_width: f32,
    background: egui::Color32,
) -> Option<UiAction> {
    ui_state.prune_previews(canvas);

    render_palette(ctx, ui_state, palette_width);
    let save_action = render_action_bar(ctx, ui_state);
    let canvas_rect = render_canvas_area(ctx, canvas, background);
    let widget_action = render_widgets(ctx, ui_state, canvas, canvas_rect);
    let drop_action = track_drag(ctx, ui_state, canvas_rect);

    drop_action.or(save_action).or(widget_action)
}

/// Render the palette of draggable templates.
fn render_palette(ctx: &Context, ui_state: &mut UiState, width: f32) {
    egui::SidePanel::left("palette")
        .resizable(false)
        .exact_width(width)
        .frame(Frame::new().fill(theme::PANEL_BG).inner_margin(Margin::same(12)))
        .show(ctx, |ui| {
            heading(ui, "Available Widgets");
            separator(ui);
            ui.spacing_mut().item_spacing = vec2(0.0, 8.0);

            for template in catalog::templates() {
                let active = ui_state.is_drag_source(DragSource::Template(template.id));
                let response = PaletteTile::new(&template.name).active(active).show(ui);
                if response.drag_started() {
                    let grab_offset = response
                        .interact_pointer_pos()
                        .map(|pos| pos - response.rect.min)
                        .unwrap_or_default();
                    ui_state.begin_template_drag(&template, grab_offset);
                }
            }
        });
}

/// Render the bar holding the save trigger.
fn render_action_bar(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let mut action = None;

    egui::TopBottomPanel::bottom("actions")
        .frame(Frame::new().fill(theme::PANEL_BG).inner_margin(Margin::same(8)))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if StyledButton::new(SAVE_LAYOUT_LABEL).min_width(110.0).show(ui) {
                    action = Some(UiAction::SaveLayout);
                }
                if let Some(status) = ui_state.status() {
                    ui.add_space(8.0);
                    section_label(ui, status);
                }
            });
        });

    action
}

/// Render the empty canvas and return its rect.
fn render_canvas_area(ctx: &Context, canvas: &Canvas, background: egui::Color32) -> Rect {
    egui::CentralPanel::default()
        .frame(Frame::new().fill(background))
        .show(ctx, |ui| {
            let rect = ui.max_rect();
            if canvas.widgets().is_empty() {
                ui.painter().text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "Drag widgets here",
                    FontId::proportional(16.0),
                    theme::TEXT_MUTED,
                );
            }
            rect
        })
        .inner
}

/// Render every placed widget with its editor.
fn render_widgets(
    ctx: &Context,
    ui_state: &mut UiState,
    canvas: &Canvas,
    canvas_rect: Rect,
) -> Option<UiAction> {
    let mut action = None;

    for widget in canvas.widgets() {
        let pos = canvas_rect.min + vec2(widget.x as f32, widget.y as f32);
        let highlighted = ui_state.is_drag_source(DragSource::Placed(widget.id));

        egui::Area::new(Id::new(("placed_widget", widget.id.get())))
            .fixed_pos(pos)
            .constrain_to(canvas_rect)
            .order(Order::Middle)
            .show(ctx, |ui| {
                widget_frame(highlighted).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let handle = ui
                            .add(
                                egui::Label::new(
                                    RichText::new(widget.kind.display_name())
                                        .size(11.0)
                                        .color(theme::TEXT_MUTED),
                                )
                                .sense(Sense::drag()),
                            )
                            .on_hover_cursor(CursorIcon::Grab);
                        if handle.drag_started() {
                            ui_state.begin_widget_drag(widget);
                        }
                        ui.add_space(8.0);
                        if CloseButton::new("Remove").show(ui) {
                            action = Some(UiAction::Remove(widget.id));
                        }
                    });

                    let edit = match widget.kind {
                        WidgetKind::Text => text_editor(ui, widget),
                        WidgetKind::Image => image_editor(ui, ui_state, widget),
                        WidgetKind::Button => button_editor(ui, widget),
                        WidgetKind::Table => table_editor(ui, widget),
                    };
                    if edit.is_some() {
                        action = edit;
                    }
                });
            });
    }

    action
}

fn text_editor(ui: &mut egui::Ui, widget: &Widget) -> Option<UiAction> {
    let mut text = widget.content.clone();
    let response = ui.add(
        TextEdit::multiline(&mut text)
            .id_salt(("text", widget.id.get()))
            .desired_rows(3)
            .desired_width(EDITOR_WIDTH),
    );
    response
        .changed()
        .then(|| UiAction::Edit(ContentEdit::replace(widget.id, text)))
}

fn image_editor(ui: &mut egui::Ui, ui_state: &mut UiState, widget: &Widget) -> Option<UiAction> {
    let mut action = None;
    if StyledButton::new("Choose image").secondary().show(ui) {
        action = Some(UiAction::PickImage(widget.id));
    }

    if widget.content.is_empty() {
        section_label(ui, "No image selected");
    } else {
        match ui_state.image_preview(ui.ctx(), widget) {
            Some(texture) => {
                let size = fit_preview(texture.size_vec2());
                ui.image((texture.id(), size));
            }
            None => section_label(ui, "Preview unavailable"),
        }
    }
    action
}

fn button_editor(ui: &mut egui::Ui, widget: &Widget) -> Option<UiAction> {
    let mut label = widget.content.clone();
    let response = ui.add(
        TextEdit::singleline(&mut label)
            .id_salt(("button_label", widget.id.get()))
            .desired_width(EDITOR_WIDTH),
    );
    let edited = response.changed();

    let pressed = StyledButton::new(&widget.content).show(ui);

    if edited {
        Some(UiAction::Edit(ContentEdit::replace(widget.id, label)))
    } else if pressed {
        Some(UiAction::ButtonPressed(widget.id))
    } else {
        None
    }
}

fn table_editor(ui: &mut egui::Ui, widget: &Widget) -> Option<UiAction> {
    // Unreadable content is shown as the default grid; the first edit resets it.
    let table = Table::parse(&widget.content).unwrap_or_default();
    let id = widget.id;
    let mut action = None;

    egui::Grid::new(("table", id.get()))
        .spacing(vec2(4.0, 4.0))
        .show(ui, |ui| {
            for (col, header) in table.headers.iter().enumerate() {
                let mut value = header.clone();
                let response = ui.add(
                    TextEdit::singleline(&mut value)
                        .id_salt(("header", id.get(), col))
                        .font(egui::TextStyle::Button)
                        .desired_width(CELL_WIDTH),
                );
                if response.changed() {
                    action = Some(UiAction::Edit(ContentEdit::header(id, col, value)));
                }
            }
            ui.end_row();

            for row in 0..table.row_count() {
                for col in 0..table.column_count() {
                    let mut value = table.cell(row, col).unwrap_or_default().to_string();
                    let response = ui.add(
                        TextEdit::singleline(&mut value)
                            .id_salt(("cell", id.get(), row, col))
                            .desired_width(CELL_WIDTH),
                    );
                    if response.changed() {
                        action = Some(UiAction::Edit(ContentEdit::cell(id, row, col, value)));
                    }
                }
                ui.end_row();
            }
        });

    action
}

/// Follow the pointer during a drag and report the drop on release.
fn track_drag(ctx: &Context, ui_state: &mut UiState, canvas_rect: Rect) -> Option<UiAction> {
    let label = ui_state.drag.as_ref()?.label.clone();
    let (pointer, released, down) = ctx.input(|i| {
        (
            i.pointer.latest_pos(),
            i.pointer.any_released(),
            i.pointer.any_down(),
        )
    });

    if !released {
        if !down {
            // Release happened outside the window.
            ui_state.finish_drag();
        } else if let Some(pointer) = pointer {
            drag_ghost(ctx, pointer, &label);
            ctx.request_repaint();
        }
        return None;
    }

    match pointer {
        Some(pointer) if canvas_rect.contains(pointer) => Some(UiAction::Drop {
            pointer: to_point(pointer),
            target: DropTarget::from_bounds(to_kurbo_rect(canvas_rect)),
        }),
        _ => {
            log::debug!("Drag of {} released outside the canvas", label);
            ui_state.finish_drag();
            None
        }
    }
}
