//! Widget content model.
//!
//! Every placed widget stores its content as a string. Text, Image and
//! Button widgets use that string directly; Table widgets keep a JSON
//! encoding of [`Table`]. [`WidgetContent`] is the typed view of a stored
//! string, selected by the widget's [`WidgetKind`].

use crate::widget::WidgetKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Encoding of the empty 2x1 table used for recovery.
pub const DEFAULT_TABLE_JSON: &str = r#"{"headers":["",""],"rows":[["",""]]}"#;

/// Content errors.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid table structure: {0}")]
    Structure(String),
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
}

/// Tabular content: a header row and body rows of equal width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Default for Table {
    /// Two empty columns, one empty row.
    fn default() -> Self {
        Self {
            headers: vec![String::new(), String::new()],
            rows: vec![vec![String::new(), String::new()]],
        }
    }
}

impl Table {
    /// Create a table, normalizing every row to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self { headers, rows };
        table.normalize();
        table
    }

    /// Parse a stored table.
    ///
    /// Both `headers` and `rows` must be present and hold strings. Ragged
    /// rows are padded or truncated to the header width.
    pub fn parse(content: &str) -> Result<Self, ContentError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if !value.is_object() {
            return Err(ContentError::Structure("expected an object".to_string()));
        }
        if !value.get("headers").is_some_and(|h| h.is_array()) {
            return Err(ContentError::Structure("missing headers array".to_string()));
        }
        if !value.get("rows").is_some_and(|r| r.is_array()) {
            return Err(ContentError::Structure("missing rows array".to_string()));
        }
        let mut table: Table = serde_json::from_value(value)?;
        table.normalize();
        Ok(table)
    }

    /// Encode for storage in a widget's content field.
    pub fn to_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| DEFAULT_TABLE_JSON.to_string())
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of body rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a cell value.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Set a cell value. Returns false if the cell does not exist.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    /// Set a header value. Returns false if the column does not exist.
    pub fn set_header(&mut self, col: usize, value: impl Into<String>) -> bool {
        match self.headers.get_mut(col) {
            Some(header) => {
                *header = value.into();
                true
            }
            None => false,
        }
    }

    fn normalize(&mut self) {
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }
}

/// Parse stored table content, replacing anything unreadable with
/// [`Table::default`].
pub fn parse_table_or_default(content: &str) -> Table {
    match Table::parse(content) {
        Ok(table) => table,
        Err(e) => {
            log::warn!("Unreadable table content, using default: {}", e);
            Table::default()
        }
    }
}

/// Typed view of a widget's stored content.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetContent {
    /// Raw string content (Text, Image, Button).
    Text(String),
    /// Structured table content.
    Table(Table),
}

impl WidgetContent {
    /// Interpret stored content for a widget kind.
    ///
    /// Table content that cannot be read becomes the default table.
    pub fn from_stored(kind: WidgetKind, stored: &str) -> Self {
        if kind.is_structured() {
            WidgetContent::Table(parse_table_or_default(stored))
        } else {
            WidgetContent::Text(stored.to_string())
        }
    }

    /// Encode back to the stored string form.
    pub fn to_stored(&self) -> String {
        match self {
            WidgetContent::Text(text) => text.clone(),
            WidgetContent::Table(table) => table.to_content(),
        }
    }

    /// Get the table, if this is table content.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            WidgetContent::Table(table) => Some(table),
            WidgetContent::Text(_) => None,
        }
    }

    /// Get the text, if this is string content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WidgetContent::Text(text) => Some(text),
            WidgetContent::Table(_) => None,
        }
    }
}

/// Image format of embedded image content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// Encode image bytes as a `data:` URL suitable for Image content.
///
/// The MIME type comes from the magic bytes, then the extension hint.
pub fn encode_image_data_url(data: &[u8], extension: Option<&str>) -> String {
    use base64::{Engine, engine::general_purpose::STANDARD};

    let mime = ImageFormat::from_magic_bytes(data)
        .or_else(|| extension.and_then(ImageFormat::from_extension))
        .map(|f| f.mime_type())
        .unwrap_or("application/octet-stream");
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Decode a base64 `data:` URL into its MIME type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), ContentError> {
    use base64::{Engine, engine::general_purpose::STANDARD};

    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ContentError::DataUrl("missing data: prefix".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ContentError::DataUrl("missing payload separator".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| ContentError::DataUrl("only base64 payloads are supported".to_string()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ContentError::DataUrl(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_table() {
        let table = Table::parse(r#"{"headers":["A","B"],"rows":[["1","2"]]}"#).unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.cell(0, 1), Some("2"));
    }

    #[test]
    fn test_parse_rejects_missing_rows() {
        let result = Table::parse(r#"{"headers":["A"]}"#);
        assert!(matches!(result, Err(ContentError::Structure(_))));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(Table::parse("null"), Err(ContentError::Structure(_))));
        assert!(matches!(Table::parse("[1,2]"), Err(ContentError::Structure(_))));
        assert!(matches!(Table::parse("not json"), Err(ContentError::Json(_))));
    }

    #[test]
    fn test_parse_normalizes_ragged_rows() {
        let table = Table::parse(r#"{"headers":["A","B"],"rows":[["1"],["1","2","3"]]}"#).unwrap();
        assert_eq!(table.rows, vec![vec!["1", ""], vec!["1", "2"]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell(1, 1), Some("2"));
    }

    #[test]
    fn test_parse_or_default_recovers() {
        assert_eq!(parse_table_or_default("not json"), Table::default());
        assert_eq!(parse_table_or_default(r#"{"rows":[]}"#), Table::default());
    }

    #[test]
    fn test_default_table_encoding() {
        assert_eq!(Table::default().to_content(), DEFAULT_TABLE_JSON);
    }

    #[test]
    fn test_set_cell_out_of_range_is_rejected() {
        let mut table = Table::default();
        assert!(!table.set_cell(1, 0, "x"));
        assert!(!table.set_cell(0, 2, "x"));
        assert!(!table.set_header(5, "x"));
        assert_eq!(table, Table::default());
    }

    #[test]
    fn test_widget_content_by_kind() {
        let stored = r#"{"headers":["A"],"rows":[["1"]]}"#;

        let as_table = WidgetContent::from_stored(WidgetKind::Table, stored);
        assert_eq!(as_table.as_table().map(|t| t.column_count()), Some(1));

        let as_text = WidgetContent::from_stored(WidgetKind::Text, stored);
        assert_eq!(as_text.as_text(), Some(stored));
        assert_eq!(as_text.to_stored(), stored);
    }

    #[test]
    fn test_data_url_roundtrip() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let url = encode_image_data_url(&png, None);
        assert!(url.starts_with("data:image/png;base64,"));

        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, png);
    }

    #[test]
    fn test_data_url_uses_extension_hint() {
        let url = encode_image_data_url(b"abc", Some("JPG"));
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_decode_data_url_rejects_plain_text() {
        assert!(decode_data_url("button").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
    }
}
