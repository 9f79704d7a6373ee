//! Value types for the document data model
//!
//! This module defines:
//! - Value: closed tagged union of every type the database can store
//!
//! ## Canonical Value Model
//!
//! The Value enum has exactly 9 variants:
//! - Null, Bool, Integer, Double, Duration, Text, Blob, Array, Document
//!
//! Array and Document hold shared references to capability trait objects
//! ([`Array`], [`Document`]), so the same Value can wrap an owned buffer, a
//! lazily parsed JSON view or any other representation. Values are
//! immutable: casts and arithmetic produce new values, and mutation goes
//! through owned buffers ([`FieldBuffer`], [`ValueBuffer`]).
//!
//! ## Equality
//!
//! `PartialEq` is *structural identity*: same variant, same payload, same
//! field order. It is what round-trip tests want. SQL equality, where
//! `Integer(1) == Double(1.0)` and document field order is irrelevant, lives
//! in [`crate::compare`].

use crate::array::{Array, ValueBuffer};
use crate::document::{Document, FieldBuffer};
use crate::error::Result;
use crate::types::ValueType;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A single database value
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point (IEEE-754)
    Double(f64),
    /// Signed nanosecond count
    Duration(i64),
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Blob(Vec<u8>),
    /// Array of values
    Array(Arc<dyn Array>),
    /// Document (ordered named values)
    Document(Arc<dyn Document>),
}

impl Value {
    /// Wrap any array representation
    pub fn array(array: impl Array + 'static) -> Self {
        Value::Array(Arc::new(array))
    }

    /// Wrap any document representation
    pub fn document(document: impl Document + 'static) -> Self {
        Value::Document(Arc::new(document))
    }

    /// Value equal to the zero value of the given type
    ///
    /// Zero values: `false`, `0`, `0.0`, `0s`, empty text, empty blob,
    /// empty array, empty document. The zero value of Null is Null.
    pub fn zero_value(ty: ValueType) -> Self {
        match ty {
            ValueType::Null => Value::Null,
            ValueType::Bool => Value::Bool(false),
            ValueType::Integer => Value::Integer(0),
            ValueType::Double => Value::Double(0.0),
            ValueType::Duration => Value::Duration(0),
            ValueType::Text => Value::Text(String::new()),
            ValueType::Blob => Value::Blob(Vec::new()),
            ValueType::Array => Value::array(ValueBuffer::new()),
            ValueType::Document => Value::document(FieldBuffer::new()),
        }
    }

    /// Get the type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Integer(_) => ValueType::Integer,
            Value::Double(_) => ValueType::Double,
            Value::Duration(_) => ValueType::Duration,
            Value::Text(_) => ValueType::Text,
            Value::Blob(_) => ValueType::Blob,
            Value::Array(_) => ValueType::Array,
            Value::Document(_) => ValueType::Document,
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is an integer or a double
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Double(_))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Double value
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the nanosecond count if this is a Duration value
    pub fn as_duration(&self) -> Option<i64> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Get as &str if this is a Text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as &[u8] if this is a Blob value
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Get the array if this is an Array value
    pub fn as_array(&self) -> Option<&dyn Array> {
        match self {
            Value::Array(a) => Some(a.as_ref()),
            _ => None,
        }
    }

    /// Get the document if this is a Document value
    pub fn as_document(&self) -> Option<&dyn Document> {
        match self {
            Value::Document(d) => Some(d.as_ref()),
            _ => None,
        }
    }

    /// Check whether the value equals the zero value of its type
    ///
    /// Null is never a zero value.
    pub fn is_zero_value(&self) -> Result<bool> {
        match self {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(!*b),
            Value::Integer(i) => Ok(*i == 0),
            Value::Double(f) => Ok(*f == 0.0),
            Value::Duration(d) => Ok(*d == 0),
            Value::Text(s) => Ok(s.is_empty()),
            Value::Blob(b) => Ok(b.is_empty()),
            Value::Array(a) => crate::array::array_is_empty(a.as_ref()),
            Value::Document(d) => crate::document::document_is_empty(d.as_ref()),
        }
    }

    /// Check whether the value is "true" in a boolean context
    ///
    /// Null is falsy; every other value is truthy unless it is the zero value
    /// of its type.
    pub fn is_truthy(&self) -> Result<bool> {
        if self.is_null() {
            return Ok(false);
        }
        Ok(!self.is_zero_value()?)
    }

    /// Recursively materialize nested arrays and documents into owned buffers
    ///
    /// Scalars are cloned. The result shares no state with lazily parsed or
    /// externally owned representations and can be mutated freely.
    pub fn deep_copy(&self) -> Result<Value> {
        match self {
            Value::Array(a) => Ok(Value::array(ValueBuffer::copy_from(a.as_ref())?)),
            Value::Document(d) => Ok(Value::document(FieldBuffer::copy_from(d.as_ref())?)),
            other => Ok(other.clone()),
        }
    }
}

// Structural identity; see module docs.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                match (
                    crate::array::collect_values(a.as_ref()),
                    crate::array::collect_values(b.as_ref()),
                ) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            (Value::Document(a), Value::Document(b)) => {
                match (
                    crate::document::collect_fields(a.as_ref()),
                    crate::document::collect_fields(b.as_ref()),
                ) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            other => match crate::json::to_json_string(other) {
                Ok(s) => f.write_str(&s),
                Err(_) => write!(f, "<{}>", other.type_name()),
            },
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Double(f as f64)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Blob(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::array(ValueBuffer::from(a))
    }
}

impl From<ValueBuffer> for Value {
    fn from(a: ValueBuffer) -> Self {
        Value::array(a)
    }
}

impl From<FieldBuffer> for Value {
    fn from(d: FieldBuffer) -> Self {
        Value::document(d)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::document(m)
    }
}

impl From<std::time::Duration> for Value {
    /// Durations beyond `i64::MAX` nanoseconds saturate
    fn from(d: std::time::Duration) -> Self {
        Value::Duration(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
