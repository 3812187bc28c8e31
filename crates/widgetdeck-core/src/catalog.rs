//! The static widget catalog shown in the palette.

use crate::content::Table;
use crate::widget::{WidgetId, WidgetKind, WidgetTemplate};

/// Default content of the Button template.
pub const DEFAULT_BUTTON_LABEL: &str = "button";

/// All templates offered in the palette, in display order.
pub fn templates() -> Vec<WidgetTemplate> {
    vec![
        WidgetTemplate::new(1, WidgetKind::Text, "Text", ""),
        WidgetTemplate::new(2, WidgetKind::Image, "Image", ""),
        WidgetTemplate::new(3, WidgetKind::Button, "Button", DEFAULT_BUTTON_LABEL),
        WidgetTemplate::new(4, WidgetKind::Table, "Table", default_table().to_content()),
    ]
}

/// Find a template by id.
pub fn template(id: WidgetId) -> Option<WidgetTemplate> {
    templates().into_iter().find(|t| t.id == id)
}

/// Table a new Table widget starts with.
pub fn default_table() -> Table {
    Table::new(
        vec!["Column 1".to_string(), "Column 2".to_string()],
        vec![vec![String::new(), String::new()]],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_order_and_kinds() {
        let kinds: Vec<WidgetKind> = templates().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, WidgetKind::all());
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<WidgetId> = templates().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), templates().len());
    }

    #[test]
    fn test_table_template_content_parses() {
        let table = template(WidgetId(4)).unwrap();
        assert_eq!(Table::parse(&table.content).unwrap(), default_table());
    }
}
