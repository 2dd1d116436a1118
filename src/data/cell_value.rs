use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// One row of a result page, keyed by column name. Columns absent from the
/// map read as `Null`.
pub type Row = HashMap<String, CellValue>;

/// A single scalar cell as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Anything non-scalar (lists, structs) is kept verbatim and shown as JSON.
    Other(JsonValue),
}

impl CellValue {
    /// Null, or a string with nothing but whitespace in it.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric interpretation of the cell. Strings count when the whole
    /// (trimmed) text parses as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_finite() => Some(*f),
            CellValue::String(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }
}

/// Parse a label or cell string the way the table treats "numeric-looking"
/// text: surrounding whitespace ignored, NaN and infinities rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(s) => f.write_str(s),
            CellValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<JsonValue> for CellValue {
    fn from(value: JsonValue) -> Self {
        serde_json::from_value(value.clone()).unwrap_or(CellValue::Other(value))
    }
}

/// Look up a cell, treating a missing key as null.
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a CellValue {
    static NULL: CellValue = CellValue::Null;
    row.get(column).unwrap_or(&NULL)
}
