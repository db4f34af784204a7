use serde_json::Value as JsonValue;
use std::borrow::Cow;

/// Strings longer than this many characters are truncated for display.
pub const TRUNCATE_AT: usize = 100;
pub const ELLIPSIS: &str = "...";
pub const NULL_MARKER: &str = "NULL";

/// A table cell after applying the display policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    /// Serialized object or array.
    Json(String),
    Truncated { shown: String, full: String },
    Plain(String),
}

/// Classify a cell value; a missing key reads as `None`.
pub fn format_cell(value: Option<&JsonValue>) -> CellValue {
    match value {
        None | Some(JsonValue::Null) => CellValue::Null,
        Some(v @ (JsonValue::Object(_) | JsonValue::Array(_))) => CellValue::Json(v.to_string()),
        Some(JsonValue::String(s)) if s.chars().count() > TRUNCATE_AT => CellValue::Truncated {
            shown: s.chars().take(TRUNCATE_AT).collect(),
            full: s.clone(),
        },
        Some(JsonValue::String(s)) => CellValue::Plain(s.clone()),
        Some(JsonValue::Number(n)) => CellValue::Plain(number_text(n)),
        Some(other) => CellValue::Plain(other.to_string()),
    }
}

/// Whole floats print without a fraction (`1.0` shows as `1`).
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

impl CellValue {
    /// Text as it appears in a table cell.
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(NULL_MARKER),
            CellValue::Json(s) | CellValue::Plain(s) => Cow::Borrowed(s),
            CellValue::Truncated { shown, .. } => Cow::Owned(format!("{shown}{ELLIPSIS}")),
        }
    }

    /// Untruncated text, used for copy/export.
    pub fn full_text(&self) -> &str {
        match self {
            CellValue::Null => NULL_MARKER,
            CellValue::Json(s) | CellValue::Plain(s) => s,
            CellValue::Truncated { full, .. } => full,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Plain(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Plain(s)
    }
}
