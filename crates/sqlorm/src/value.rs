//! Canonical value model and driver-value coercion.
//!
//! Drivers hand back loosely typed column data ([`RawValue`]); everything the
//! rest of the crate touches is the canonical [`Value`]. Coercion is lossy in
//! exactly one place: a raw value the driver reports in an unrecognized
//! representation degrades to empty text with a warning instead of failing
//! the whole row fetch (see [`Value::from_raw`]).

use crate::error::{OrmError, OrmResult};
use bytes::Bytes;

/// A canonical column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Binary blob
    Blob(Bytes),
}

/// A column value as returned by a database client library, before coercion.
///
/// `Other` carries a human-readable description of whatever the driver
/// produced; it exists so unrecognized representations can be observed in
/// logs rather than silently dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Other(String),
}

impl Value {
    /// Normalize a driver value into its canonical form.
    ///
    /// Typed values pass through. Byte buffers are decoded to text when they
    /// are valid UTF-8 (drivers commonly return text-typed columns as raw
    /// bytes); otherwise they stay binary. An unrecognized representation
    /// degrades to empty text with a warning: callers depend on a row fetch
    /// not aborting over a single odd column, so this is deliberately NOT a
    /// hard error even though it loses the original content.
    pub fn from_raw(raw: RawValue) -> Value {
        match raw {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Int(n) => Value::Int(n),
            RawValue::Float(f) => Value::Float(f),
            RawValue::Text(s) => Value::Text(s),
            RawValue::Bytes(b) => match String::from_utf8(b) {
                Ok(s) => Value::Text(s),
                Err(e) => Value::Blob(Bytes::from(e.into_bytes())),
            },
            RawValue::Other(desc) => {
                tracing::warn!(raw = %desc, "unexpected driver value type, coercing to empty text");
                Value::Text(String::new())
            }
        }
    }

    /// Whether this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }
}

/// Convert a Rust value into a canonical [`Value`] for binding.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for i32 {
    fn to_value(&self) -> Value {
        Value::Int(i64::from(*self))
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(Bytes::from(self.clone()))
    }
}

impl ToValue for Bytes {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Convert a canonical [`Value`] back into a Rust field type.
///
/// Implementations report failures as validation errors; record mappers wrap
/// them with the column name (see the `Record` derive).
pub trait FromValue: Sized {
    fn from_value(value: Value) -> OrmResult<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> OrmResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            // Backends without a boolean type return 0/1 integers.
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Int(n) => i32::try_from(n)
                .map_err(|_| OrmError::validation(format!("integer {n} out of range for i32"))),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(n) => Ok(n as f64),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Blob(b) => Ok(b.to_vec()),
            Value::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("blob", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn mismatch(expected: &str, got: &Value) -> OrmError {
    OrmError::validation(format!("expected {expected}, got {}", got.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_typed_values_pass_through() {
        assert_eq!(Value::from_raw(RawValue::Bool(true)), Value::Bool(true));
        assert_eq!(Value::from_raw(RawValue::Int(42)), Value::Int(42));
        assert_eq!(Value::from_raw(RawValue::Float(1.5)), Value::Float(1.5));
        assert_eq!(
            Value::from_raw(RawValue::Text("x".into())),
            Value::Text("x".into())
        );
        assert_eq!(Value::from_raw(RawValue::Null), Value::Null);
    }

    #[test]
    fn coerce_utf8_bytes_to_text() {
        let v = Value::from_raw(RawValue::Bytes(b"2015-01-17".to_vec()));
        assert_eq!(v, Value::Text("2015-01-17".into()));
    }

    #[test]
    fn coerce_binary_bytes_stay_blob() {
        let v = Value::from_raw(RawValue::Bytes(vec![0xff, 0xfe, 0x00]));
        assert_eq!(v, Value::Blob(Bytes::from(vec![0xff, 0xfe, 0x00])));
    }

    #[test]
    fn coerce_unknown_degrades_to_empty_text() {
        let v = Value::from_raw(RawValue::Other("decimal(10,2)".into()));
        assert_eq!(v, Value::Text(String::new()));
    }

    #[test]
    fn from_value_option_null() {
        let v: Option<i64> = FromValue::from_value(Value::Null).unwrap();
        assert_eq!(v, None);
        let v: Option<i64> = FromValue::from_value(Value::Int(9)).unwrap();
        assert_eq!(v, Some(9));
    }

    #[test]
    fn from_value_bool_accepts_int_zero_one() {
        assert!(!bool::from_value(Value::Int(0)).unwrap());
        assert!(bool::from_value(Value::Int(1)).unwrap());
        assert!(bool::from_value(Value::Int(2)).is_err());
    }

    #[test]
    fn from_value_i32_range_check() {
        assert_eq!(i32::from_value(Value::Int(7)).unwrap(), 7);
        assert!(i32::from_value(Value::Int(i64::MAX)).is_err());
    }

    #[test]
    fn from_value_type_mismatch() {
        assert!(String::from_value(Value::Int(1)).is_err());
        assert!(i64::from_value(Value::Text("1".into())).is_err());
    }
}
