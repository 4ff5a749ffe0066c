use clap::ValueEnum;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Values that travel as statement parameters or come back as row cells.
///
/// The D1 wire format only knows JSON scalars, so the set is deliberately small:
/// ```rust
/// use d1_middleware::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("alice".into()),
///     RowValues::Float(2.5),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// NULL value
    Null,
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    /// Whether the value reads as a number: integers, floats, and text holding a plain
    /// decimal or exponent literal.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        match self {
            RowValues::Int(_) | RowValues::Float(_) => true,
            RowValues::Text(s) => numeric_text(s).is_some(),
            RowValues::Bool(_) | RowValues::Null => false,
        }
    }

    /// Integer coercion used by `%d` placeholders.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coerce_int(&self) -> i64 {
        match self {
            RowValues::Int(i) => *i,
            RowValues::Float(f) => f.trunc() as i64,
            RowValues::Text(s) => leading_number(s).map_or(0, |f| f.trunc() as i64),
            RowValues::Bool(b) => i64::from(*b),
            RowValues::Null => 0,
        }
    }

    /// Float coercion used by `%f` placeholders.
    #[must_use]
    pub fn coerce_float(&self) -> f64 {
        match self {
            RowValues::Float(f) => *f,
            RowValues::Text(s) => leading_number(s).unwrap_or(0.0),
            RowValues::Null => 0.0,
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(_) | RowValues::Bool(_) => self.coerce_int() as f64,
        }
    }

    /// String coercion used by `%s` placeholders and as the key of keyed result maps.
    #[must_use]
    pub fn coerce_text(&self) -> String {
        match self {
            RowValues::Text(s) => s.clone(),
            RowValues::Int(i) => i.to_string(),
            RowValues::Float(f) => f.to_string(),
            RowValues::Bool(true) => "1".to_string(),
            RowValues::Bool(false) | RowValues::Null => String::new(),
        }
    }

    /// Convert a JSON cell from a response record.
    ///
    /// Nested arrays/objects are not produced by D1 for scalar columns; if one shows up it
    /// is kept as its JSON text.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => RowValues::Null,
            JsonValue::Bool(b) => RowValues::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RowValues::Int(i)
                } else if let Some(f) = n.as_f64() {
                    RowValues::Float(f)
                } else {
                    RowValues::Text(n.to_string())
                }
            }
            JsonValue::String(s) => RowValues::Text(s.clone()),
            other => RowValues::Text(other.to_string()),
        }
    }
}

impl Serialize for RowValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RowValues::Int(i) => serializer.serialize_i64(*i),
            RowValues::Float(f) => serializer.serialize_f64(*f),
            RowValues::Text(s) => serializer.serialize_str(s),
            RowValues::Bool(b) => serializer.serialize_bool(*b),
            RowValues::Null => serializer.serialize_unit(),
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<i32> for RowValues {
    fn from(value: i32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<u32> for RowValues {
    fn from(value: u32) -> Self {
        RowValues::Int(i64::from(value))
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Shape of a single record returned by `get_row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum RecordShape {
    /// Record with named field access (`CustomDbRow`)
    #[default]
    Object,
    /// Ordered column name -> value map
    Associative,
    /// Values in column order
    Positional,
}

/// Shape of the full result set returned by `get_results`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum ResultsShape {
    /// One record with named field access per row
    #[default]
    Object,
    /// Records keyed by their first column's value; later rows replace earlier ones
    ObjectKeyed,
    /// One ordered column name -> value map per row
    Associative,
    /// One positional value list per row
    Positional,
}

/// Trimmed text that is entirely a decimal/exponent literal.
pub(crate) fn numeric_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (end, value) = scan_number(trimmed)?;
    (end == trimmed.len()).then_some(value)
}

/// Longest numeric prefix after leading whitespace ("12abc" -> 12).
fn leading_number(s: &str) -> Option<f64> {
    scan_number(s.trim_start()).map(|(_, value)| value)
}

fn scan_number(s: &str) -> Option<(usize, f64)> {
    let bytes = s.as_bytes();
    let mut idx = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        idx += 1;
    }
    let int_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    let mut digits = idx - int_start;
    if bytes.get(idx) == Some(&b'.') {
        let frac_start = idx + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || digits > 0 {
            digits += frac_end - frac_start;
            idx = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if matches!(bytes.get(idx), Some(b'e' | b'E')) {
        let mut exp = idx + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits_start {
            idx = exp;
        }
    }
    s[..idx].parse::<f64>().ok().map(|value| (idx, value))
}
