//! Drag-and-drop transfer protocol.
//!
//! A drag carries one JSON string under [`TRANSFER_KEY`]. Palette drags
//! encode a template plus the pointer offset inside the palette tile and
//! `isNew: true`; canvas drags encode the placed widget itself. On drop the
//! string is decoded and the pointer is converted to canvas-local
//! coordinates. Whether the drop places or moves a widget is decided later
//! by the entity store, by id.

use crate::widget::{Widget, WidgetId, WidgetKind, WidgetTemplate};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Key of the drag payload in the transfer channel.
pub const TRANSFER_KEY: &str = "widgetData";

/// Transfer errors.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Invalid widget data: {0}")]
    Json(#[from] serde_json::Error),
}

/// A string-keyed drag data channel.
pub trait DataTransfer {
    /// Store a value under a key, replacing any previous value.
    fn set_data(&mut self, key: &str, value: String);

    /// Read the value stored under a key.
    fn get_data(&self, key: &str) -> Option<String>;

    /// Remove all values.
    fn clear_data(&mut self);
}

/// In-process transfer channel carried through a drag gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferBuffer {
    entries: HashMap<String, String>,
}

impl TransferBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the buffer holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DataTransfer for TransferBuffer {
    fn set_data(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn get_data(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn clear_data(&mut self) {
        self.entries.clear();
    }
}

/// Wire record. Accepts both template-shaped and widget-shaped payloads.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferRecord {
    id: WidgetId,
    #[serde(rename = "type")]
    kind: WidgetKind,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_y: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_new: bool,
}

/// Decoded drag payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    /// A palette template being placed for the first time.
    Template {
        template: WidgetTemplate,
        /// Pointer offset inside the palette tile at drag start.
        offset: Vec2,
    },
    /// A widget already on the canvas being repositioned.
    Placed(Widget),
}

impl DragPayload {
    /// Id carried by the payload.
    pub fn id(&self) -> WidgetId {
        match self {
            DragPayload::Template { template, .. } => template.id,
            DragPayload::Placed(widget) => widget.id,
        }
    }

    /// Widget kind carried by the payload.
    pub fn kind(&self) -> WidgetKind {
        match self {
            DragPayload::Template { template, .. } => template.kind,
            DragPayload::Placed(widget) => widget.kind,
        }
    }

    /// Check if this payload places a new widget.
    pub fn is_new(&self) -> bool {
        matches!(self, DragPayload::Template { .. })
    }

    /// Encode to the wire string.
    pub fn encode(&self) -> Result<String, TransferError> {
        let record = match self {
            DragPayload::Template { template, offset } => TransferRecord {
                id: template.id,
                kind: template.kind,
                content: template.content.clone(),
                name: Some(template.name.clone()),
                x: None,
                y: None,
                offset_x: Some(offset.x),
                offset_y: Some(offset.y),
                is_new: true,
            },
            DragPayload::Placed(widget) => TransferRecord {
                id: widget.id,
                kind: widget.kind,
                content: widget.content.clone(),
                name: None,
                x: Some(widget.x),
                y: Some(widget.y),
                offset_x: None,
                offset_y: None,
                is_new: false,
            },
        };
        Ok(serde_json::to_string(&record)?)
    }

    /// Decode from the wire string.
    ///
    /// A record is a template when it is flagged `isNew`, or when it has a
    /// `name` but no coordinates.
    pub fn decode(data: &str) -> Result<Self, TransferError> {
        let record: TransferRecord = serde_json::from_str(data)?;
        let is_template = record.is_new || (record.name.is_some() && record.x.is_none());

        if is_template {
            let name = record
                .name
                .unwrap_or_else(|| record.kind.display_name().to_string());
            Ok(DragPayload::Template {
                template: WidgetTemplate {
                    id: record.id,
                    kind: record.kind,
                    content: record.content,
                    name,
                },
                offset: Vec2::new(
                    record.offset_x.unwrap_or(0.0),
                    record.offset_y.unwrap_or(0.0),
                ),
            })
        } else {
            Ok(DragPayload::Placed(Widget {
                id: record.id,
                kind: record.kind,
                content: record.content,
                x: record.x.unwrap_or(0.0),
                y: record.y.unwrap_or(0.0),
            }))
        }
    }
}

/// Start dragging a palette template.
pub fn begin_template_drag(
    transfer: &mut dyn DataTransfer,
    template: &WidgetTemplate,
    offset: Vec2,
) -> Result<(), TransferError> {
    let payload = DragPayload::Template {
        template: template.clone(),
        offset,
    };
    transfer.set_data(TRANSFER_KEY, payload.encode()?);
    Ok(())
}

/// Start dragging a widget that is already on the canvas.
pub fn begin_widget_drag(transfer: &mut dyn DataTransfer, widget: &Widget) -> Result<(), TransferError> {
    let payload = DragPayload::Placed(widget.clone());
    transfer.set_data(TRANSFER_KEY, payload.encode()?);
    Ok(())
}

/// The canvas as a drop target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DropTarget {
    /// Top-left corner of the canvas in pointer coordinates, if laid out.
    origin: Option<Point>,
}

impl DropTarget {
    /// Target whose canvas origin is known.
    pub fn new(origin: Point) -> Self {
        Self {
            origin: Some(origin),
        }
    }

    /// Target from the canvas bounding box.
    pub fn from_bounds(bounds: Rect) -> Self {
        Self::new(bounds.origin())
    }

    /// Target whose canvas has not been laid out yet.
    pub fn unavailable() -> Self {
        Self { origin: None }
    }

    /// Canvas origin, if known.
    pub fn origin(&self) -> Option<Point> {
        self.origin
    }

    /// Convert pointer coordinates to canvas-local coordinates.
    pub fn to_local(&self, pointer: Point) -> Option<Point> {
        let origin = self.origin?;
        Some(Point::new(pointer.x - origin.x, pointer.y - origin.y))
    }
}

/// A decoded drop with its canvas-local position.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDrop {
    pub payload: DragPayload,
    /// Canvas-local drop position (top-left anchored at the pointer).
    pub position: Point,
}

impl ResolvedDrop {
    /// Pointer offset captured at drag start, for palette drags.
    pub fn grab_offset(&self) -> Option<Vec2> {
        match &self.payload {
            DragPayload::Template { offset, .. } => Some(*offset),
            DragPayload::Placed(_) => None,
        }
    }
}

/// Decode a drop.
///
/// Returns `None` when the transfer holds no widget data, when the canvas
/// origin is unknown, or when the payload cannot be decoded. None of these
/// is reported to the user: drops may come from unrelated drag sources.
pub fn resolve_drop(transfer: &dyn DataTransfer, pointer: Point, target: &DropTarget) -> Option<ResolvedDrop> {
    let data = transfer.get_data(TRANSFER_KEY)?;
    let position = target.to_local(pointer)?;

    match DragPayload::decode(&data) {
        Ok(payload) => Some(ResolvedDrop { payload, position }),
        Err(e) => {
            log::error!("Discarding drop with unreadable widget data: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_template() -> WidgetTemplate {
        WidgetTemplate::new(1, WidgetKind::Text, "Text", "")
    }

    #[test]
    fn test_template_drag_encodes_offset_and_flag() {
        let mut transfer = TransferBuffer::new();
        begin_template_drag(&mut transfer, &text_template(), Vec2::new(12.0, 8.0)).unwrap();

        let data = transfer.get_data(TRANSFER_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["type"], "Text");
        assert_eq!(value["name"], "Text");
        assert_eq!(value["offsetX"], 12.0);
        assert_eq!(value["offsetY"], 8.0);
        assert_eq!(value["isNew"], true);
        assert!(value.get("x").is_none());
    }

    #[test]
    fn test_widget_drag_encodes_widget_record() {
        let widget = Widget::new(WidgetId(5), WidgetKind::Button, "Go", Point::new(1.0, 2.0));
        let mut transfer = TransferBuffer::new();
        begin_widget_drag(&mut transfer, &widget).unwrap();

        let data = transfer.get_data(TRANSFER_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(value["x"], 1.0);
        assert!(value.get("isNew").is_none());
        assert!(value.get("name").is_none());

        assert_eq!(DragPayload::decode(&data).unwrap(), DragPayload::Placed(widget));
    }

    #[test]
    fn test_decode_template_without_flag() {
        let payload = DragPayload::decode(r#"{"id":1,"type":"Text","name":"Text","content":""}"#).unwrap();
        assert!(payload.is_new());
        assert_eq!(payload.id(), WidgetId(1));
    }

    #[test]
    fn test_resolve_drop_converts_to_canvas_coordinates() {
        let mut transfer = TransferBuffer::new();
        begin_template_drag(&mut transfer, &text_template(), Vec2::new(4.0, 4.0)).unwrap();

        let target = DropTarget::new(Point::new(20.0, 20.0));
        let drop = resolve_drop(&transfer, Point::new(120.0, 80.0), &target).unwrap();

        // The grab offset is carried but not applied.
        assert_eq!(drop.position, Point::new(100.0, 60.0));
        assert_eq!(drop.grab_offset(), Some(Vec2::new(4.0, 4.0)));
    }

    #[test]
    fn test_resolve_drop_without_data_is_ignored() {
        let transfer = TransferBuffer::new();
        let target = DropTarget::new(Point::ZERO);
        assert!(resolve_drop(&transfer, Point::new(1.0, 1.0), &target).is_none());
    }

    #[test]
    fn test_resolve_drop_without_canvas_is_ignored() {
        let mut transfer = TransferBuffer::new();
        begin_template_drag(&mut transfer, &text_template(), Vec2::ZERO).unwrap();
        assert!(resolve_drop(&transfer, Point::new(1.0, 1.0), &DropTarget::unavailable()).is_none());
    }

    #[test]
    fn test_resolve_drop_with_garbage_is_ignored() {
        let mut transfer = TransferBuffer::new();
        transfer.set_data(TRANSFER_KEY, "{not json".to_string());
        let target = DropTarget::new(Point::ZERO);
        assert!(resolve_drop(&transfer, Point::new(1.0, 1.0), &target).is_none());
    }

    #[test]
    fn test_drop_target_from_bounds() {
        let target = DropTarget::from_bounds(Rect::new(20.0, 30.0, 500.0, 400.0));
        assert_eq!(target.to_local(Point::new(25.0, 35.0)), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_clear_data() {
        let mut transfer = TransferBuffer::new();
        transfer.set_data(TRANSFER_KEY, "x".to_string());
        transfer.clear_data();
        assert!(transfer.is_empty());
    }
}
