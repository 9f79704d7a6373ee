//! JSON boundary for values
//!
//! This module defines:
//! - `Serialize` / `Deserialize` for [`Value`]
//! - Text helpers: [`to_json_string`], [`from_json_str`]
//! - Lazy views: [`JsonDocument`] and [`JsonArray`] keep raw JSON text and
//!   parse it on demand; nested objects and arrays stay lazy
//! - Adapters exposing `serde_json` maps and arrays as documents and arrays
//!
//! # Mapping
//!
//! | Value | JSON |
//! |-------|------|
//! | Null | `null` |
//! | Bool | `true` / `false` |
//! | Integer | number without fraction or exponent |
//! | Double | number; integral doubles keep a `.0` |
//! | Duration | string such as `"1h2m3s"` (decodes back as Text) |
//! | Text | string |
//! | Blob | base64 string (decodes back as Text) |
//! | Array | array |
//! | Document | object, fields in order, duplicates kept |
//!
//! On decode, numbers with a fraction or exponent become Doubles, other
//! numbers Integers; integers beyond the i64 range fall back to Double.
//! Non-finite doubles have no JSON form and fail to encode.

use crate::array::{Array, ValueBuffer};
use crate::document::{Document, FieldBuffer};
use crate::duration::format_duration;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::types::ValueType;
use crate::Value;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Double(f) => {
                if !f.is_finite() {
                    return Err(ser::Error::custom(format!(
                        "cannot encode non-finite double {} as JSON",
                        f
                    )));
                }
                serializer.serialize_f64(*f)
            }
            Value::Duration(d) => serializer.serialize_str(&format_duration(*d)),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&BASE64.encode(b))
                } else {
                    serializer.serialize_bytes(b)
                }
            }
            Value::Array(a) => {
                let mut seq = serializer.serialize_seq(a.len_hint())?;
                let mut ser_err = None;
                let walked = a.iterate(&mut |_, v| {
                    seq.serialize_element(v).map_err(|e| {
                        let msg = e.to_string();
                        ser_err = Some(e);
                        Error::Unsupported(msg)
                    })
                });
                if let Some(e) = ser_err {
                    return Err(e);
                }
                walked.map_err(<S::Error as ser::Error>::custom)?;
                seq.end()
            }
            Value::Document(d) => {
                let mut map = serializer.serialize_map(d.len_hint())?;
                let mut ser_err = None;
                let walked = d.iterate(&mut |k, v| {
                    map.serialize_entry(k, v).map_err(|e| {
                        let msg = e.to_string();
                        ser_err = Some(e);
                        Error::Unsupported(msg)
                    })
                });
                if let Some(e) = ser_err {
                    return Err(e);
                }
                walked.map_err(<S::Error as ser::Error>::custom)?;
                map.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> std::result::Result<Value, E> {
        Ok(Value::Integer(i))
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> std::result::Result<Value, E> {
        Ok(match i64::try_from(u) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Double(u as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> std::result::Result<Value, E> {
        Ok(Value::Double(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> std::result::Result<Value, E> {
        Ok(Value::Text(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> std::result::Result<Value, E> {
        Ok(Value::Text(s))
    }

    fn visit_bytes<E: de::Error>(self, b: &[u8]) -> std::result::Result<Value, E> {
        Ok(Value::Blob(b.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, b: Vec<u8>) -> std::result::Result<Value, E> {
        Ok(Value::Blob(b))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut vb = ValueBuffer::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(v) = seq.next_element::<Value>()? {
            vb.append(v);
        }
        Ok(Value::from(vb))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let mut fb = FieldBuffer::with_capacity(map.size_hint().unwrap_or(0).min(4096));
        while let Some((k, v)) = map.next_entry::<String, Value>()? {
            fb.add(k, v);
        }
        Ok(Value::from(fb))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Value, D::Error> {
        d.deserialize_any(ValueVisitor)
    }
}

// =============================================================================
// Text helpers
// =============================================================================

/// Encode a value as compact JSON
pub fn to_json_string(v: &Value) -> Result<String> {
    serde_json::to_string(v).map_err(|e| Error::Unsupported(e.to_string()))
}

/// Encode a value as indented JSON
pub fn to_json_string_pretty(v: &Value) -> Result<String> {
    serde_json::to_string_pretty(v).map_err(|e| Error::Unsupported(e.to_string()))
}

/// Decode JSON text into owned values
pub fn from_json_str(s: &str) -> Result<Value> {
    serde_json::from_str(s).map_err(|e| Error::parse(json_target(s), s, e))
}

/// Decode JSON bytes into owned values
pub fn from_json_slice(b: &[u8]) -> Result<Value> {
    serde_json::from_slice(b)
        .map_err(|e| Error::parse(json_target_bytes(b), &String::from_utf8_lossy(b), e))
}

/// Decode JSON text and check the result against `limits`
pub fn from_json_str_with_limits(s: &str, limits: &Limits) -> Result<Value> {
    if let Err(e) = limits.validate_encoded_len(s.len()) {
        tracing::warn!(len = s.len(), reason = e.reason_code(), "rejecting oversized JSON input");
        return Err(e.into());
    }
    let v = from_json_str(s)?;
    limits.validate_value(&v)?;
    Ok(v)
}

/// Type a parse of `s` was aiming for, for error reporting
fn json_target(s: &str) -> ValueType {
    json_target_bytes(s.as_bytes())
}

fn json_target_bytes(b: &[u8]) -> ValueType {
    match b.iter().find(|c| !c.is_ascii_whitespace()) {
        Some(b'[') => ValueType::Array,
        Some(b'"') => ValueType::Text,
        Some(b't') | Some(b'f') => ValueType::Bool,
        Some(b'n') => ValueType::Null,
        Some(c) if c.is_ascii_digit() || *c == b'-' => ValueType::Double,
        _ => ValueType::Document,
    }
}

/// Convert a `serde_json` value into owned values
pub fn from_serde_json(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => {
            Value::from(items.iter().map(from_serde_json).collect::<ValueBuffer>())
        }
        serde_json::Value::Object(map) => Value::from(
            map.iter()
                .map(|(k, v)| (k.clone(), from_serde_json(v)))
                .collect::<FieldBuffer>(),
        ),
    }
}

/// Convert a value into a `serde_json` value using the JSON mapping
pub fn to_serde_json(v: &Value) -> Result<serde_json::Value> {
    serde_json::to_value(v).map_err(|e| Error::Unsupported(e.to_string()))
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        from_serde_json(&v)
    }
}

// =============================================================================
// Lazy views
// =============================================================================

/// Document backed by raw JSON object text
///
/// Construction is free; every iteration or lookup parses the text again.
/// Nested objects and arrays are handed out as further lazy views. Use
/// [`FieldBuffer::copy_from`] to materialize.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    raw: String,
}

impl JsonDocument {
    /// Wrap JSON text without validating it
    ///
    /// Malformed text surfaces as a parse error on first use.
    pub fn new(raw: impl Into<String>) -> Self {
        JsonDocument { raw: raw.into() }
    }

    /// Wrap JSON text after checking that it is a well-formed object
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let doc = JsonDocument::new(raw);
        doc.entries()?;
        Ok(doc)
    }

    /// The raw JSON text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn entries(&self) -> Result<Vec<(String, Box<RawValue>)>> {
        let mut de = serde_json::Deserializer::from_str(&self.raw);
        let entries = RawEntries::deserialize(&mut de)
            .and_then(|e| de.end().map(|_| e))
            .map_err(|e| Error::parse(ValueType::Document, &self.raw, e))?;
        Ok(entries.0)
    }
}

impl Document for JsonDocument {
    fn iterate(&self, f: &mut dyn FnMut(&str, &Value) -> Result<()>) -> Result<()> {
        for (name, raw) in self.entries()? {
            let v = lazy_value(&raw)?;
            f(&name, &v)?;
        }
        Ok(())
    }

    fn get_by_field(&self, field: &str) -> Result<Value> {
        match self.entries()?.into_iter().find(|(name, _)| name == field) {
            Some((_, raw)) => lazy_value(&raw),
            None => Err(Error::field_not_found(field)),
        }
    }
}

/// Array backed by raw JSON array text
#[derive(Debug, Clone)]
pub struct JsonArray {
    raw: String,
}

impl JsonArray {
    /// Wrap JSON text without validating it
    pub fn new(raw: impl Into<String>) -> Self {
        JsonArray { raw: raw.into() }
    }

    /// Wrap JSON text after checking that it is a well-formed array
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let arr = JsonArray::new(raw);
        arr.elements()?;
        Ok(arr)
    }

    /// The raw JSON text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn elements(&self) -> Result<Vec<Box<RawValue>>> {
        serde_json::from_str(&self.raw).map_err(|e| Error::parse(ValueType::Array, &self.raw, e))
    }
}

impl Array for JsonArray {
    fn iterate(&self, f: &mut dyn FnMut(usize, &Value) -> Result<()>) -> Result<()> {
        for (i, raw) in self.elements()?.iter().enumerate() {
            let v = lazy_value(raw)?;
            f(i, &v)?;
        }
        Ok(())
    }

    fn get_by_index(&self, index: usize) -> Result<Value> {
        match self.elements()?.get(index) {
            Some(raw) => lazy_value(raw),
            None => Err(Error::IndexOutOfRange { index }),
        }
    }
}

/// Composites become lazy views; scalars are decoded now
fn lazy_value(raw: &RawValue) -> Result<Value> {
    let text = raw.get();
    match text.as_bytes().first() {
        Some(b'{') => Ok(Value::document(JsonDocument::new(text))),
        Some(b'[') => Ok(Value::array(JsonArray::new(text))),
        _ => from_json_str(text),
    }
}

/// Object entries in source order, duplicates kept
struct RawEntries(Vec<(String, Box<RawValue>)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<RawEntries, A::Error> {
                let mut out = Vec::new();
                while let Some(entry) = map.next_entry::<String, Box<RawValue>>()? {
                    out.push(entry);
                }
                Ok(RawEntries(out))
            }
        }

        d.deserialize_map(EntriesVisitor)
    }
}

// =============================================================================
// Adapters
// =============================================================================

/// `serde_json` object as a document; iteration follows the map's order
impl Document for serde_json::Map<String, serde_json::Value> {
    fn iterate(&self, f: &mut dyn FnMut(&str, &Value) -> Result<()>) -> Result<()> {
        for (name, v) in self {
            f(name, &from_serde_json(v))?;
        }
        Ok(())
    }

    fn get_by_field(&self, field: &str) -> Result<Value> {
        self.get(field)
            .map(from_serde_json)
            .ok_or_else(|| Error::field_not_found(field))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}

/// `serde_json` array as an array
impl Array for Vec<serde_json::Value> {
    fn iterate(&self, f: &mut dyn FnMut(usize, &Value) -> Result<()>) -> Result<()> {
        for (i, v) in self.iter().enumerate() {
            f(i, &from_serde_json(v))?;
        }
        Ok(())
    }

    fn get_by_index(&self, index: usize) -> Result<Value> {
        self.get(index)
            .map(from_serde_json)
            .ok_or(Error::IndexOutOfRange { index })
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}
