//! Content edits.
//!
//! Editors turn user input into entity store mutations. Table edits parse
//! the stored table, change one cell or header, and write the re-encoded
//! table back. A stored table that cannot be parsed is replaced by the
//! default table and the edit is dropped; cell and header edits share that
//! single recovery path.

use crate::content::{Table, encode_image_data_url};
use crate::store::WidgetCollection;
use crate::widget::{WidgetId, WidgetKind};

/// A user edit to a widget's content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEdit {
    /// Replace the raw content (Text, Button, Image).
    Replace { id: WidgetId, content: String },
    /// Change one body cell of a Table.
    TableCell {
        id: WidgetId,
        row: usize,
        col: usize,
        value: String,
    },
    /// Change one header of a Table.
    TableHeader {
        id: WidgetId,
        col: usize,
        value: String,
    },
}

impl ContentEdit {
    /// Replace raw content.
    pub fn replace(id: WidgetId, content: impl Into<String>) -> Self {
        ContentEdit::Replace {
            id,
            content: content.into(),
        }
    }

    /// Set an Image widget from file bytes.
    pub fn image(id: WidgetId, data: &[u8], extension: Option<&str>) -> Self {
        ContentEdit::Replace {
            id,
            content: encode_image_data_url(data, extension),
        }
    }

    /// Edit a table cell.
    pub fn cell(id: WidgetId, row: usize, col: usize, value: impl Into<String>) -> Self {
        ContentEdit::TableCell {
            id,
            row,
            col,
            value: value.into(),
        }
    }

    /// Edit a table header.
    pub fn header(id: WidgetId, col: usize, value: impl Into<String>) -> Self {
        ContentEdit::TableHeader {
            id,
            col,
            value: value.into(),
        }
    }

    /// Target widget.
    pub fn id(&self) -> WidgetId {
        match self {
            ContentEdit::Replace { id, .. }
            | ContentEdit::TableCell { id, .. }
            | ContentEdit::TableHeader { id, .. } => *id,
        }
    }

    /// Apply the edit, returning the new collection.
    pub fn apply(self, widgets: &WidgetCollection) -> WidgetCollection {
        match self {
            ContentEdit::Replace { id, content } => widgets.edit(id, content),
            ContentEdit::TableCell { id, row, col, value } => {
                edit_table(widgets, id, |table| table.set_cell(row, col, value))
            }
            ContentEdit::TableHeader { id, col, value } => {
                edit_table(widgets, id, |table| table.set_header(col, value))
            }
        }
    }
}

/// Parse a Table widget's content, apply `change`, and write it back.
///
/// `change` returns false when it targets a cell that does not exist; the
/// collection is then left unchanged.
fn edit_table(
    widgets: &WidgetCollection,
    id: WidgetId,
    change: impl FnOnce(&mut Table) -> bool,
) -> WidgetCollection {
    let Some(widget) = widgets.get(id) else {
        log::debug!("Table edit for unknown widget {}", id);
        return widgets.clone();
    };
    if widget.kind != WidgetKind::Table {
        log::debug!("Table edit for {:?} widget {}", widget.kind, id);
        return widgets.clone();
    }

    match Table::parse(&widget.content) {
        Ok(mut table) => {
            if change(&mut table) {
                widgets.edit(id, table.to_content())
            } else {
                log::debug!("Table edit outside the grid of widget {}", id);
                widgets.clone()
            }
        }
        Err(e) => {
            log::warn!("Resetting table content of widget {}: {}", id, e);
            widgets.edit(id, Table::default().to_content())
        }
    }
}
