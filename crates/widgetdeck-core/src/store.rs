//! The widget entity store.
//!
//! [`WidgetCollection`] is an immutable, ordered snapshot of placed widgets.
//! Every mutating operation returns a new snapshot and leaves the receiver
//! untouched; snapshots share storage until one of them is modified.

use crate::widget::{Widget, WidgetId};
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered snapshot of placed widgets (insertion order).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetCollection {
    widgets: Arc<Vec<Widget>>,
}

impl WidgetCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection from widgets in order.
    pub fn from_widgets(widgets: Vec<Widget>) -> Self {
        Self {
            widgets: Arc::new(widgets),
        }
    }

    /// Place a widget or move an existing one.
    ///
    /// If a widget with the same id exists, only its coordinates are
    /// replaced. Otherwise `widget` is appended unchanged.
    pub fn add_or_move(&self, widget: Widget) -> Self {
        match self.index_of(widget.id) {
            Some(index) => self.with_updated(index, |existing| {
                existing.x = widget.x;
                existing.y = widget.y;
            }),
            None => {
                let mut widgets = Vec::with_capacity(self.widgets.len() + 1);
                widgets.extend(self.widgets.iter().cloned());
                widgets.push(widget);
                Self::from_widgets(widgets)
            }
        }
    }

    /// Replace the content of a widget. Unknown ids leave the collection unchanged.
    pub fn edit(&self, id: WidgetId, content: impl Into<String>) -> Self {
        match self.index_of(id) {
            Some(index) => {
                let content = content.into();
                self.with_updated(index, |existing| existing.content = content)
            }
            None => self.clone(),
        }
    }

    /// Remove a widget. Unknown ids leave the collection unchanged.
    ///
    /// Like the other operations this targets the first widget with the
    /// id; a loaded layout carrying duplicates loses one entry per call.
    pub fn remove(&self, id: WidgetId) -> Self {
        let Some(index) = self.index_of(id) else {
            return self.clone();
        };
        let mut widgets = self.widgets.as_ref().clone();
        widgets.remove(index);
        Self::from_widgets(widgets)
    }

    /// Replace the whole collection.
    pub fn load(&self, widgets: Vec<Widget>) -> Self {
        Self::from_widgets(widgets)
    }

    /// Get a widget by id.
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Iterate widgets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    /// Borrow the widgets as a slice.
    pub fn as_slice(&self) -> &[Widget] {
        &self.widgets
    }

    /// Number of widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Largest id in the collection.
    pub fn max_id(&self) -> Option<WidgetId> {
        self.widgets.iter().map(|w| w.id).max()
    }

    /// Smallest positive id no widget in the collection uses.
    pub fn unused_id(&self) -> WidgetId {
        let taken: HashSet<WidgetId> = self.widgets.iter().map(|w| w.id).collect();
        let mut id = 1;
        while taken.contains(&WidgetId(id)) {
            id += 1;
        }
        WidgetId(id)
    }

    /// Check whether two snapshots share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.widgets, &other.widgets)
    }

    fn index_of(&self, id: WidgetId) -> Option<usize> {
        self.widgets.iter().position(|w| w.id == id)
    }

    fn with_updated(&self, index: usize, update: impl FnOnce(&mut Widget)) -> Self {
        let mut widgets = self.widgets.as_ref().clone();
        update(&mut widgets[index]);
        Self::from_widgets(widgets)
    }
}

impl<'a> IntoIterator for &'a WidgetCollection {
    type Item = &'a Widget;
    type IntoIter = std::slice::Iter<'a, Widget>;

    fn into_iter(self) -> Self::IntoIter {
        self.widgets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;
    use kurbo::Point;

    fn widget(id: u64, kind: WidgetKind, content: &str, x: f64, y: f64) -> Widget {
        Widget::new(WidgetId(id), kind, content, Point::new(x, y))
    }

    fn sample() -> WidgetCollection {
        WidgetCollection::from_widgets(vec![
            widget(1, WidgetKind::Text, "Sample Text", 50.0, 50.0),
            widget(2, WidgetKind::Table, r#"{"headers":["A"],"rows":[["1"]]}"#, 100.0, 100.0),
            widget(3, WidgetKind::Button, "button", 10.0, 10.0),
        ])
    }

    #[test]
    fn test_move_changes_only_coordinates() {
        let before = sample();
        let mut request = widget(2, WidgetKind::Text, "ignored", 400.0, 300.0);
        request.content = "also ignored".to_string();

        let after = before.add_or_move(request);

        let moved = after.get(WidgetId(2)).unwrap();
        assert_eq!(moved.position(), Point::new(400.0, 300.0));
        assert_eq!(moved.kind, WidgetKind::Table);
        assert_eq!(moved.content, before.get(WidgetId(2)).unwrap().content);
        assert_eq!(after.len(), before.len());
        assert_eq!(after.get(WidgetId(1)), before.get(WidgetId(1)));
        assert_eq!(after.get(WidgetId(3)), before.get(WidgetId(3)));
    }

    #[test]
    fn test_move_keeps_order() {
        let after = sample().add_or_move(widget(1, WidgetKind::Text, "", 1.0, 1.0));
        let ids: Vec<u64> = after.iter().map(|w| w.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_add_appends_unchanged() {
        let before = sample();
        let new = widget(9, WidgetKind::Image, "", 5.0, 6.0);

        let after = before.add_or_move(new.clone());

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after.as_slice().last(), Some(&new));
    }

    #[test]
    fn test_operations_leave_old_snapshot_untouched() {
        let before = sample();
        let copy = before.clone();

        let _ = before.add_or_move(widget(1, WidgetKind::Text, "", 999.0, 999.0));
        let _ = before.edit(WidgetId(1), "changed");
        let _ = before.remove(WidgetId(1));
        let _ = before.add_or_move(widget(4, WidgetKind::Text, "", 0.0, 0.0));

        assert_eq!(before, copy);
        assert_eq!(before.get(WidgetId(1)).unwrap().content, "Sample Text");
    }

    #[test]
    fn test_edit_targets_single_widget() {
        let before = sample();
        let after = before.edit(WidgetId(1), "Updated Text");

        assert_eq!(after.get(WidgetId(1)).unwrap().content, "Updated Text");
        assert_eq!(after.get(WidgetId(1)).unwrap().position(), Point::new(50.0, 50.0));
        assert_eq!(after.get(WidgetId(2)), before.get(WidgetId(2)));
        assert_eq!(after.get(WidgetId(3)), before.get(WidgetId(3)));
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        let before = sample();
        let after = before.edit(WidgetId(42), "nothing");
        assert_eq!(after, before);
    }

    #[test]
    fn test_remove() {
        let before = sample();
        let after = before.remove(WidgetId(2));

        assert_eq!(after.len(), 2);
        assert!(after.get(WidgetId(2)).is_none());
        assert_eq!(after.get(WidgetId(1)), before.get(WidgetId(1)));
        assert_eq!(after.get(WidgetId(3)), before.get(WidgetId(3)));
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let before = sample();
        let after = before.remove(WidgetId(42));
        assert_eq!(after, before);
        assert!(after.ptr_eq(&before));
    }

    #[test]
    fn test_remove_with_duplicate_ids_drops_one_entry() {
        let loaded = WidgetCollection::new().load(vec![
            widget(1, WidgetKind::Text, "first", 0.0, 0.0),
            widget(1, WidgetKind::Text, "second", 10.0, 10.0),
        ]);

        let after = loaded.remove(WidgetId(1));

        assert_eq!(after.len(), 1);
        assert_eq!(after.get(WidgetId(1)).unwrap().content, "second");
    }

    #[test]
    fn test_unused_id_fills_first_gap() {
        assert_eq!(WidgetCollection::new().unused_id(), WidgetId(1));
        assert_eq!(sample().unused_id(), WidgetId(4));

        let gapped = sample().remove(WidgetId(2));
        assert_eq!(gapped.unused_id(), WidgetId(2));
    }

    #[test]
    fn test_load_replaces_everything() {
        let loaded = sample().load(vec![widget(7, WidgetKind::Text, "x", 0.0, 0.0)]);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.max_id(), Some(WidgetId(7)));
    }

    #[test]
    fn test_empty_collection() {
        let empty = WidgetCollection::new();
        assert!(empty.is_empty());
        assert_eq!(empty.max_id(), None);
    }
}
