//! Canvas session state.
//!
//! [`Canvas`] owns the widget collection for one editing session. All
//! changes go through the four store operations (add/move, edit, remove,
//! load); drops and content edits are translated into those operations
//! here.

use crate::editor::ContentEdit;
use crate::storage::{LayoutStore, Storage, StorageResult};
use crate::store::WidgetCollection;
use crate::transfer::{DataTransfer, DragPayload, DropTarget, ResolvedDrop, resolve_drop};
use crate::widget::{IdAllocator, Widget, WidgetId};
use kurbo::Point;

/// Runtime canvas state.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    /// Current snapshot of placed widgets.
    widgets: WidgetCollection,
    /// Source of ids for newly placed widgets.
    ids: IdAllocator,
    /// Whether there are changes since the last save or load.
    dirty: bool,
}

impl Canvas {
    /// Create an empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a canvas holding the given widgets.
    pub fn with_widgets(widgets: Vec<Widget>) -> Self {
        let mut canvas = Self::new();
        canvas.load(widgets);
        canvas
    }

    /// Create a canvas from the saved layout.
    ///
    /// An unreadable layout yields an empty canvas.
    pub fn restore<S: Storage>(layout: &LayoutStore<S>) -> Self {
        Self::with_widgets(layout.restore())
    }

    /// Current widget snapshot.
    pub fn widgets(&self) -> &WidgetCollection {
        &self.widgets
    }

    /// Get a widget by id.
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    /// Check if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Id the next placed widget will receive.
    pub fn next_id(&self) -> WidgetId {
        self.ids.peek().unwrap_or_else(|| self.widgets.unused_id())
    }

    /// Place a widget or move an existing one with the same id.
    pub fn add_or_move(&mut self, widget: Widget) {
        self.ids.observe(widget.id);
        self.replace(self.widgets.add_or_move(widget));
    }

    /// Replace a widget's stored content.
    pub fn edit(&mut self, id: WidgetId, content: impl Into<String>) {
        self.replace(self.widgets.edit(id, content));
    }

    /// Remove a widget.
    pub fn remove(&mut self, id: WidgetId) {
        self.replace(self.widgets.remove(id));
    }

    /// Replace every widget.
    pub fn load(&mut self, widgets: Vec<Widget>) {
        for widget in &widgets {
            self.ids.observe(widget.id);
        }
        self.widgets = self.widgets.load(widgets);
        self.dirty = false;
    }

    /// Apply a content edit.
    pub fn apply_edit(&mut self, edit: ContentEdit) {
        self.replace(edit.apply(&self.widgets));
    }

    /// Apply a decoded drop. Returns the id of the placed or moved widget.
    ///
    /// Templates always receive a fresh id, so placing one can never be
    /// mistaken for moving a widget that already exists.
    pub fn apply_drop(&mut self, drop: ResolvedDrop) -> WidgetId {
        let widget = match drop.payload {
            DragPayload::Template { template, .. } => {
                let id = self.fresh_id();
                log::debug!("Placing {} widget {} at {:?}", template.name, id, drop.position);
                template.instantiate(id, drop.position)
            }
            DragPayload::Placed(widget) => {
                log::debug!("Moving widget {} to {:?}", widget.id, drop.position);
                widget.moved_to(drop.position)
            }
        };
        let id = widget.id;
        self.add_or_move(widget);
        id
    }

    /// Handle a drop of whatever the transfer channel carries.
    ///
    /// Returns `None`, leaving the canvas unchanged, when the drop carries
    /// no readable widget data or the canvas has no position yet.
    pub fn handle_drop(
        &mut self,
        transfer: &dyn DataTransfer,
        pointer: Point,
        target: &DropTarget,
    ) -> Option<WidgetId> {
        let drop = resolve_drop(transfer, pointer, target)?;
        Some(self.apply_drop(drop))
    }

    /// Save the layout and clear the dirty flag.
    pub fn save<S: Storage>(&mut self, layout: &LayoutStore<S>) -> StorageResult<()> {
        layout.save(self.widgets.as_slice())?;
        self.dirty = false;
        Ok(())
    }

    /// Next allocator id, or the first free one once the counter is spent.
    fn fresh_id(&mut self) -> WidgetId {
        match self.ids.allocate() {
            Some(id) => id,
            None => {
                let id = self.widgets.unused_id();
                log::debug!("Id counter exhausted, reusing free id {}", id);
                id
            }
        }
    }

    fn replace(&mut self, widgets: WidgetCollection) {
        if !widgets.ptr_eq(&self.widgets) {
            self.dirty = true;
        }
        self.widgets = widgets;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::content::Table;
    use crate::storage::MemoryStorage;
    use crate::transfer::{TransferBuffer, begin_template_drag, begin_widget_drag};
    use crate::widget::{WidgetKind, WidgetTemplate};
    use kurbo::Vec2;
    use std::sync::Arc;

    fn drag_template(template: &WidgetTemplate) -> TransferBuffer {
        let mut transfer = TransferBuffer::new();
        begin_template_drag(&mut transfer, template, Vec2::new(10.0, 10.0)).unwrap();
        transfer
    }

    #[test]
    fn test_drop_template_on_empty_canvas() {
        let mut canvas = Canvas::new();
        let template = WidgetTemplate::new(1, WidgetKind::Text, "Text", "");
        let target = DropTarget::new(Point::new(20.0, 20.0));

        let id = canvas.handle_drop(&drag_template(&template), Point::new(120.0, 80.0), &target);

        assert_eq!(id, Some(WidgetId(1)));
        assert_eq!(
            canvas.widgets().as_slice(),
            &[Widget::new(WidgetId(1), WidgetKind::Text, "", Point::new(100.0, 60.0))]
        );
        assert!(canvas.is_dirty());
    }

    #[test]
    fn test_template_drop_never_moves_existing_widget() {
        // A widget whose id equals a template id is already on the canvas.
        let existing = Widget::new(WidgetId(4), WidgetKind::Text, "mine", Point::new(5.0, 5.0));
        let mut canvas = Canvas::with_widgets(vec![existing.clone()]);
        let target = DropTarget::new(Point::ZERO);

        let table = catalog::template(WidgetId(4)).unwrap();
        let id = canvas
            .handle_drop(&drag_template(&table), Point::new(300.0, 300.0), &target)
            .unwrap();

        assert_eq!(canvas.widgets().len(), 2);
        assert_ne!(id, WidgetId(4));
        assert_eq!(canvas.widget(WidgetId(4)), Some(&existing));
        assert_eq!(canvas.widget(id).unwrap().kind, WidgetKind::Table);
    }

    #[test]
    fn test_drop_placed_widget_moves_it() {
        let mut canvas = Canvas::new();
        let target = DropTarget::new(Point::new(20.0, 20.0));
        let template = WidgetTemplate::new(3, WidgetKind::Button, "Button", "button");
        let id = canvas
            .handle_drop(&drag_template(&template), Point::new(50.0, 50.0), &target)
            .unwrap();
        canvas.edit(id, "Press me");

        let mut transfer = TransferBuffer::new();
        begin_widget_drag(&mut transfer, canvas.widget(id).unwrap()).unwrap();
        canvas.handle_drop(&transfer, Point::new(220.0, 120.0), &target);

        let moved = canvas.widget(id).unwrap();
        assert_eq!(canvas.widgets().len(), 1);
        assert_eq!(moved.position(), Point::new(200.0, 100.0));
        assert_eq!(moved.content, "Press me");
    }

    #[test]
    fn test_ignored_drops_leave_canvas_clean() {
        let mut canvas = Canvas::new();
        let empty = TransferBuffer::new();

        assert!(canvas.handle_drop(&empty, Point::ZERO, &DropTarget::new(Point::ZERO)).is_none());
        let template = WidgetTemplate::new(1, WidgetKind::Text, "Text", "");
        assert!(
            canvas
                .handle_drop(&drag_template(&template), Point::ZERO, &DropTarget::unavailable())
                .is_none()
        );

        assert!(canvas.widgets().is_empty());
        assert!(!canvas.is_dirty());
    }

    #[test]
    fn test_ids_continue_after_load() {
        let loaded = vec![
            Widget::new(WidgetId(3), WidgetKind::Text, "", Point::ZERO),
            Widget::new(WidgetId(8), WidgetKind::Text, "", Point::ZERO),
        ];
        let mut canvas = Canvas::with_widgets(loaded);
        assert_eq!(canvas.next_id(), WidgetId(9));
        assert!(!canvas.is_dirty());

        let template = WidgetTemplate::new(1, WidgetKind::Text, "Text", "");
        let id = canvas
            .handle_drop(&drag_template(&template), Point::ZERO, &DropTarget::new(Point::ZERO))
            .unwrap();
        assert_eq!(id, WidgetId(9));
    }

    #[test]
    fn test_largest_loaded_id_never_causes_collisions() {
        let json = r#"[
            {"id":1,"type":"Text","content":"mine","x":5,"y":5},
            {"id":18446744073709551615,"type":"Text","content":"far","x":9,"y":9}
        ]"#;
        let widgets: Vec<Widget> = serde_json::from_str(json).unwrap();
        let mut canvas = Canvas::with_widgets(widgets);
        let target = DropTarget::new(Point::ZERO);
        let template = WidgetTemplate::new(1, WidgetKind::Text, "Text", "");

        let first = canvas
            .handle_drop(&drag_template(&template), Point::new(300.0, 300.0), &target)
            .unwrap();
        let second = canvas
            .handle_drop(&drag_template(&template), Point::new(400.0, 400.0), &target)
            .unwrap();

        assert_eq!(canvas.widgets().len(), 4);
        assert_ne!(first, second);
        assert_ne!(first, WidgetId(1));
        assert_ne!(second, WidgetId(1));
        let mine = canvas.widget(WidgetId(1)).unwrap();
        assert_eq!(mine.position(), Point::new(5.0, 5.0));
        assert_eq!(mine.content, "mine");
    }

    #[test]
    fn test_noop_edits_do_not_mark_dirty() {
        let mut canvas = Canvas::with_widgets(vec![Widget::new(
            WidgetId(1),
            WidgetKind::Text,
            "x",
            Point::ZERO,
        )]);

        canvas.edit(WidgetId(2), "nothing");
        canvas.remove(WidgetId(2));
        assert!(!canvas.is_dirty());

        canvas.remove(WidgetId(1));
        assert!(canvas.is_dirty());
        assert!(canvas.widgets().is_empty());
    }

    #[test]
    fn test_table_edit_through_canvas() {
        let mut canvas = Canvas::with_widgets(vec![Widget::new(
            WidgetId(1),
            WidgetKind::Table,
            "not json",
            Point::ZERO,
        )]);

        canvas.apply_edit(ContentEdit::cell(WidgetId(1), 0, 0, "9"));

        let content = &canvas.widget(WidgetId(1)).unwrap().content;
        assert_eq!(Table::parse(content).unwrap(), Table::default());
    }

    #[test]
    fn test_save_and_restore() {
        let layout = LayoutStore::new(Arc::new(MemoryStorage::new()));
        let mut canvas = Canvas::new();
        let target = DropTarget::new(Point::ZERO);
        for (i, template) in catalog::templates().iter().enumerate() {
            let pointer = Point::new(10.0 * i as f64, 20.0 * i as f64);
            canvas.handle_drop(&drag_template(template), pointer, &target);
        }

        canvas.save(&layout).unwrap();
        assert!(!canvas.is_dirty());

        let restored = Canvas::restore(&layout);
        assert_eq!(restored.widgets(), canvas.widgets());
        assert_eq!(restored.next_id(), canvas.next_id());
    }
}
