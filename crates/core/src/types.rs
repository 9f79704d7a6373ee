//! Value type discriminators
//!
//! This module defines:
//! - ValueType: the closed set of types a [`Value`](crate::Value) can hold
//! - Family: the comparison families used by the comparator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of a value
///
/// The discriminants are grouped by family so that new types can be added
/// without renumbering. They double as the type tags of the streaming
/// encoding.
///
/// ## ValueType Values
///
/// These values are part of the on-disk format and MUST NOT change:
/// - Null = 0x80
/// - Bool = 0x81
/// - Integer = 0x90
/// - Double = 0xA0
/// - Duration = 0xB0
/// - Text = 0xC0
/// - Blob = 0xD0
/// - Array = 0xE0
/// - Document = 0xF0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[repr(u8)]
pub enum ValueType {
    /// Absence of a value
    Null = 0x80,
    /// Boolean
    Bool = 0x81,
    /// 64-bit signed integer
    Integer = 0x90,
    /// 64-bit IEEE-754 floating point
    Double = 0xA0,
    /// Signed nanosecond count
    Duration = 0xB0,
    /// UTF-8 text
    Text = 0xC0,
    /// Raw bytes
    Blob = 0xD0,
    /// Ordered sequence of values
    Array = 0xE0,
    /// Ordered sequence of named values
    Document = 0xF0,
}

/// All value types, in discriminant order
pub const ALL_VALUE_TYPES: [ValueType; 9] = [
    ValueType::Null,
    ValueType::Bool,
    ValueType::Integer,
    ValueType::Double,
    ValueType::Duration,
    ValueType::Text,
    ValueType::Blob,
    ValueType::Array,
    ValueType::Document,
];

impl ValueType {
    /// Convert to byte representation
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Try to create from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x80 => Some(ValueType::Null),
            0x81 => Some(ValueType::Bool),
            0x90 => Some(ValueType::Integer),
            0xA0 => Some(ValueType::Double),
            0xB0 => Some(ValueType::Duration),
            0xC0 => Some(ValueType::Text),
            0xD0 => Some(ValueType::Blob),
            0xE0 => Some(ValueType::Array),
            0xF0 => Some(ValueType::Document),
            _ => None,
        }
    }

    /// Lowercase type name, as used in error messages and casts
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Double => "double",
            ValueType::Duration => "duration",
            ValueType::Text => "text",
            ValueType::Blob => "blob",
            ValueType::Array => "array",
            ValueType::Document => "document",
        }
    }

    /// Check if this is an integer or a double
    pub fn is_number(&self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Double)
    }

    /// Check if this is text or blob
    pub fn is_bytes_like(&self) -> bool {
        matches!(self, ValueType::Text | ValueType::Blob)
    }

    /// Check if this is an array or a document
    pub fn is_composite(&self) -> bool {
        matches!(self, ValueType::Array | ValueType::Document)
    }

    /// Comparison family of this type
    pub fn family(&self) -> Family {
        match self {
            ValueType::Null => Family::Null,
            ValueType::Bool | ValueType::Integer | ValueType::Double => Family::Numeric,
            ValueType::Duration => Family::Duration,
            ValueType::Text | ValueType::Blob => Family::Bytes,
            ValueType::Array => Family::Array,
            ValueType::Document => Family::Document,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type name: {0}")]
pub struct UnknownTypeName(pub String);

impl FromStr for ValueType {
    type Err = UnknownTypeName;

    /// Parse a type name (case-insensitive), accepting common SQL aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "null" => Ok(ValueType::Null),
            "bool" | "boolean" => Ok(ValueType::Bool),
            "integer" | "int" | "bigint" => Ok(ValueType::Integer),
            "double" | "real" | "float" => Ok(ValueType::Double),
            "duration" => Ok(ValueType::Duration),
            "text" | "string" | "varchar" => Ok(ValueType::Text),
            "blob" | "bytes" => Ok(ValueType::Blob),
            "array" => Ok(ValueType::Array),
            "document" | "object" => Ok(ValueType::Document),
            _ => Err(UnknownTypeName(s.to_string())),
        }
    }
}

/// Comparison family
///
/// Values of different families never compare equal; their relative order
/// is the family order below.
///
/// Ordering: Null < Numeric < Duration < Bytes < Array < Document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Null only
    Null,
    /// Bool, Integer and Double
    Numeric,
    /// Duration
    Duration,
    /// Text and Blob
    Bytes,
    /// Array
    Array,
    /// Document
    Document,
}
