//! Widget entities: placed widgets, catalog templates and their identifiers.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a widget or template.
///
/// Serialized as a bare JSON integer so persisted layouts stay readable
/// by any consumer of the `canvasWidgets` record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(pub u64);

impl WidgetId {
    /// Get the raw integer value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for WidgetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The content type of a widget. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    /// Free text, edited in a multi-line text area.
    Text,
    /// Image stored as a `data:` URL.
    Image,
    /// Button whose content is its label.
    Button,
    /// Tabular grid stored as JSON.
    Table,
}

impl WidgetKind {
    /// Get display name for UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            WidgetKind::Text => "Text",
            WidgetKind::Image => "Image",
            WidgetKind::Button => "Button",
            WidgetKind::Table => "Table",
        }
    }

    /// Get all widget kinds.
    pub fn all() -> &'static [WidgetKind] {
        &[
            WidgetKind::Text,
            WidgetKind::Image,
            WidgetKind::Button,
            WidgetKind::Table,
        ]
    }

    /// Whether the content of this kind is structured (JSON-encoded).
    pub fn is_structured(&self) -> bool {
        matches!(self, WidgetKind::Table)
    }
}

/// A widget placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    /// Stored content. Structured kinds keep their JSON encoding here.
    pub content: String,
    /// Canvas-local x coordinate in pixels.
    pub x: f64,
    /// Canvas-local y coordinate in pixels.
    pub y: f64,
}

impl Widget {
    /// Create a widget at a canvas-local position.
    pub fn new(id: WidgetId, kind: WidgetKind, content: impl Into<String>, position: Point) -> Self {
        Self {
            id,
            kind,
            content: content.into(),
            x: position.x,
            y: position.y,
        }
    }

    /// Top-left corner in canvas coordinates.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Return a copy of this widget at another position.
    pub fn moved_to(&self, position: Point) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..self.clone()
        }
    }
}

/// An unplaced catalog entry offered in the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetTemplate {
    pub id: WidgetId,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    /// Default content for widgets created from this template.
    pub content: String,
    /// Palette label.
    pub name: String,
}

impl WidgetTemplate {
    /// Create a template.
    pub fn new(id: u64, kind: WidgetKind, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: WidgetId(id),
            kind,
            content: content.into(),
            name: name.into(),
        }
    }

    /// Build a fresh widget from this template.
    ///
    /// The widget receives `id` rather than the template's own id, so a
    /// placed widget never shares identity with its template.
    pub fn instantiate(&self, id: WidgetId, position: Point) -> Widget {
        Widget::new(id, self.kind, self.content.clone(), position)
    }
}

/// Monotonic allocator for placed-widget ids.
///
/// Placed ids live in their own namespace: the allocator never hands out
/// an id it has already issued or observed in a loaded layout. Once an
/// id at `u64::MAX` has been observed the counter is exhausted and
/// [`IdAllocator::allocate`] returns `None`.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: Option<u64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Create an allocator that starts at 1.
    pub fn new() -> Self {
        Self { next: Some(1) }
    }

    /// Take the next id, or `None` when the counter is exhausted.
    pub fn allocate(&mut self) -> Option<WidgetId> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(WidgetId(id))
    }

    /// Make sure future ids are strictly greater than `id`.
    pub fn observe(&mut self, id: WidgetId) {
        let Some(next) = self.next else {
            return;
        };
        if id.0 >= next {
            self.next = id.0.checked_add(1);
            if self.next.is_none() {
                log::warn!("Widget id {} exhausts the id counter", id);
            }
        }
    }

    /// Peek at the id the next allocation will return.
    pub fn peek(&self) -> Option<WidgetId> {
        self.next.map(WidgetId)
    }
}
