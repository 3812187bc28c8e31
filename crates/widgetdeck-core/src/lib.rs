//! WidgetDeck Core Library
//!
//! Platform-agnostic data model and logic for the WidgetDeck layout editor:
//! the widget store, drag-and-drop transfer, content editing and layout
//! persistence.

pub mod canvas;
pub mod catalog;
pub mod content;
pub mod editor;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod widget;

pub use canvas::Canvas;
pub use content::{ContentError, ImageFormat, Table, WidgetContent, parse_table_or_default};
pub use editor::ContentEdit;
pub use storage::{LAYOUT_KEY, LayoutStore, Storage, StorageError, StorageResult};
pub use store::WidgetCollection;
pub use transfer::{
    DataTransfer, DragPayload, DropTarget, ResolvedDrop, TRANSFER_KEY, TransferBuffer,
    TransferError, begin_template_drag, begin_widget_drag, resolve_drop,
};
pub use widget::{IdAllocator, Widget, WidgetId, WidgetKind, WidgetTemplate};
