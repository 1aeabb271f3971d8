//! Typed SQL values.
//!
//! [`SqlValue`] is the parameter currency of the crate: every literal bound
//! during predicate translation becomes one, and [`crate::materialize`]
//! reads row cells back as them. Execution is out of scope here, so values
//! stay plain data instead of driver-specific trait objects.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A typed SQL literal or parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

/// The type of a [`SqlValue`], used for property typing and filter
/// compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Double,
    Decimal,
    Text,
    Bytes,
    Date,
    Time,
    Timestamp,
    Uuid,
}

impl ValueType {
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::Decimal => "decimal",
            ValueType::Text => "text",
            ValueType::Bytes => "bytes",
            ValueType::Date => "date",
            ValueType::Time => "time",
            ValueType::Timestamp => "timestamp",
            ValueType::Uuid => "uuid",
        }
    }

    /// Whether a value of `other` may be compared against this type.
    /// The numeric kinds (int, double, decimal) are mutually comparable;
    /// everything else must match exactly.
    pub fn is_comparable_with(&self, other: ValueType) -> bool {
        if *self == other {
            return true;
        }
        self.is_numeric() && other.is_numeric()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Double | ValueType::Decimal)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SqlValue {
    /// The type of this value, or `None` for NULL.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(_) => Some(ValueType::Bool),
            SqlValue::Int(_) => Some(ValueType::Int),
            SqlValue::Double(_) => Some(ValueType::Double),
            SqlValue::Decimal(_) => Some(ValueType::Decimal),
            SqlValue::Text(_) => Some(ValueType::Text),
            SqlValue::Bytes(_) => Some(ValueType::Bytes),
            SqlValue::Date(_) => Some(ValueType::Date),
            SqlValue::Time(_) => Some(ValueType::Time),
            SqlValue::Timestamp(_) => Some(ValueType::Timestamp),
            SqlValue::Uuid(_) => Some(ValueType::Uuid),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

/// Diagnostic rendering. This is for logs and error messages, never for
/// SQL emission; parameters are always sent as placeholders.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(true) => f.write_str("TRUE"),
            SqlValue::Bool(false) => f.write_str("FALSE"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Double(v) => write!(f, "{v}"),
            SqlValue::Decimal(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            SqlValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            SqlValue::Date(v) => write!(f, "'{v}'"),
            SqlValue::Time(v) => write!(f, "'{v}'"),
            SqlValue::Timestamp(v) => write!(f, "'{}'", v.to_rfc3339()),
            SqlValue::Uuid(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Double(v as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Double(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(SqlValue::from(42_i32), SqlValue::Int(42));
        assert_eq!(SqlValue::from("abc"), SqlValue::Text("abc".into()));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(1.5_f64)), SqlValue::Double(1.5));
    }

    #[test]
    fn numeric_kinds_are_mutually_comparable() {
        assert!(ValueType::Int.is_comparable_with(ValueType::Decimal));
        assert!(ValueType::Double.is_comparable_with(ValueType::Int));
        assert!(ValueType::Text.is_comparable_with(ValueType::Text));
        assert!(!ValueType::Text.is_comparable_with(ValueType::Int));
        assert!(!ValueType::Uuid.is_comparable_with(ValueType::Text));
    }

    #[test]
    fn display_escapes_text() {
        assert_eq!(SqlValue::from("o'brien").to_string(), "'o''brien'");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
        assert_eq!(SqlValue::Bool(true).to_string(), "TRUE");
    }

    #[test]
    fn value_type_round_trip() {
        assert_eq!(SqlValue::Int(1).value_type(), Some(ValueType::Int));
        assert_eq!(SqlValue::Null.value_type(), None);
        let t: ValueType = serde_json::from_str("\"timestamp\"").unwrap();
        assert_eq!(t, ValueType::Timestamp);
    }
}
