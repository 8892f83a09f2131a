//! Driver-independent cell values
//!
//! Every backend converts its native cell representation into [`Value`], so the
//! formatters and the CSV exporter only ever deal with one closed set of kinds.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A single typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Integer(i64),
    /// Decimal or floating point number
    Float(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time of day
    Timestamp(NaiveDateTime),
    /// Text
    Text(String),
    /// Raw bytes
    Binary(Vec<u8>),
    /// A value the driver produced but querysh has no formatter for.
    /// Carries the driver's type name.
    Unsupported(String),
}

/// One row of a result set, positionally aligned with the result set's columns
pub type Row = Vec<Value>;

/// Column metadata of a result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name as reported by the driver
    pub name: String,
    /// Declared type, if the driver knows it
    pub declared_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
        }
    }
}

impl Value {
    /// Render the value as a plain CSV field.
    ///
    /// No null substitution or truncation happens here: NULL becomes an
    /// empty field and text is written verbatim.
    pub fn to_csv_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Value::Text(s) => s.clone(),
            Value::Binary(bytes) => format!("0x{}", hex::encode(bytes)),
            Value::Unsupported(type_name) => format!("<{type_name}>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}
