//! Order-preserving encoding for index and storage keys
//!
//! Byte-wise comparison of two keys agrees with [`compare`] on the values
//! they encode. A key has two parts:
//!
//! ```text
//! key = sort key | suffix
//! ```
//!
//! The sort key alone decides ordering. Values the comparator treats as
//! equal (`1`, `1.0` and `true`; `"a"` and the blob `a`; documents that
//! differ only in field order) have identical sort keys. The suffix then
//! records what the sort key normalizes away, so decoding is exact.
//!
//! ## Sort Key Format
//!
//! ```text
//! Null:      0x02
//! Number:    0x10 | ordered f64 (8 bytes)        Bool, Integer, Double
//! Duration:  0x18 | i64 with sign bit flipped (8 bytes, big-endian)
//! Bytes:     0x20 | escaped bytes | 0x00 0x01    Text, Blob
//! Array:     0x30 | element* | 0x00
//! Document:  0x40 | (0x01 | inverted name | value)* | 0x00
//! ```
//!
//! Ordered f64 maps NaN to all zero bytes and -0.0 to +0.0; other values
//! flip the sign bit (positives) or every bit (negatives). Document fields
//! appear sorted by name with duplicates removed, and names are stored
//! complemented because the comparator ranks a document with the smaller
//! field name higher.
//!
//! ## Suffix Format
//!
//! Written after the whole sort key, walking the value in the same order:
//!
//! ```text
//! Number:    kind (0 bool, 1 integer, 2 double) | exact i64 or f64 bits
//! Bytes:     kind (0 text, 1 blob)
//! Document:  field count (u32) | per field in original order:
//!              position in sort key (u32), or 0xFFFFFFFF | name | full key
//!              for a duplicate field
//!            then the suffix of each sort key field
//! ```
//!
//! No key is a prefix of another, so a run of keys can be split again
//! with [`decode_prefix`]. A run of keys does not sort part by part,
//! though: the suffix of `1` and of `1.0` would decide the order before
//! the next part is reached. Composite index keys use [`encode_tuple`],
//! which writes every sort key ahead of every suffix:
//!
//! ```text
//! tuple = sort key* | 0x00 | suffix*
//! ```
//!
//! [`compare`]: docmodel_core::compare()

use crate::escape::{
    read_escaped, read_escaped_inverted, write_escaped, write_escaped_inverted, Cursor,
};
use byteorder::{BigEndian, ByteOrder};
use docmodel_core::compare::compare_f64;
use docmodel_core::document::{collect_fields, sorted_fields};
use docmodel_core::{
    DecodeError, Error, FieldBuffer, LimitError, Limits, Result, Value, ValueBuffer,
};
use std::cmp::Ordering;
use tracing::warn;

// Sort key tags. END sorts below every value so shorter composites sort first.
const END: u8 = 0x00;
const FIELD: u8 = 0x01;
const NULL: u8 = 0x02;
const NUMBER: u8 = 0x10;
const DURATION: u8 = 0x18;
const BYTES: u8 = 0x20;
const ARRAY: u8 = 0x30;
const DOCUMENT: u8 = 0x40;

// Suffix kinds
const KIND_BOOL: u8 = 0;
const KIND_INTEGER: u8 = 1;
const KIND_DOUBLE: u8 = 2;
const KIND_TEXT: u8 = 0;
const KIND_BLOB: u8 = 1;

/// Field position marking a duplicate name, stored in full
const DUPLICATE: u32 = u32::MAX;

const SIGN_BIT: u64 = 1 << 63;

// ============================================================================
// Encoding
// ============================================================================

/// Encode a value as an order-preserving key
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(&mut out, value)?;
    Ok(out)
}

/// Append the key for `value` to `out`
///
/// Keys appended one after another split cleanly with [`decode_prefix`]
/// but do not order as a tuple; see [`encode_tuple`].
pub fn encode_into(out: &mut Vec<u8>, value: &Value) -> Result<()> {
    write_sort_key(out, value)?;
    write_suffix(out, value)
}

/// Sort key alone
///
/// Byte order of sort keys is exactly the comparator order, including
/// equality. The sort key cannot be decoded back to a value.
pub fn sort_key(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_sort_key(&mut out, value)?;
    Ok(out)
}

/// Encode several values as one composite key
///
/// Tuple keys sort by their first part, then their second, and so on, and
/// a tuple that is a prefix of another sorts first.
///
/// ```
/// use docmodel_core::Value;
/// use docmodel_encoding::ordered;
///
/// let a = ordered::encode_tuple(&[Value::Integer(1), Value::Integer(5)]).unwrap();
/// let b = ordered::encode_tuple(&[Value::Double(1.0), Value::Integer(3)]).unwrap();
/// assert!(a > b);
/// assert_eq!(ordered::decode_tuple(&b).unwrap(), vec![Value::Double(1.0), Value::Integer(3)]);
/// ```
pub fn encode_tuple(values: &[Value]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for v in values {
        write_sort_key(&mut out, v)?;
    }
    out.push(END);
    for v in values {
        write_suffix(&mut out, v)?;
    }
    Ok(out)
}

fn write_sort_key(out: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push(NULL),
        Value::Bool(b) => push_number(out, if *b { 1.0 } else { 0.0 }),
        Value::Integer(i) => push_number(out, *i as f64),
        Value::Double(d) => push_number(out, *d),
        Value::Duration(d) => {
            out.push(DURATION);
            push_u64(out, (*d as u64) ^ SIGN_BIT);
        }
        Value::Text(s) => {
            out.push(BYTES);
            write_escaped(out, s.as_bytes());
        }
        Value::Blob(b) => {
            out.push(BYTES);
            write_escaped(out, b);
        }
        Value::Array(arr) => {
            out.push(ARRAY);
            arr.iterate(&mut |_, v| write_sort_key(out, v))?;
            out.push(END);
        }
        Value::Document(doc) => {
            out.push(DOCUMENT);
            for (name, v) in sorted_fields(doc.as_ref())? {
                out.push(FIELD);
                write_escaped_inverted(out, name.as_bytes());
                write_sort_key(out, &v)?;
            }
            out.push(END);
        }
    }
    Ok(())
}

fn write_suffix(out: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Null | Value::Duration(_) => {}
        Value::Bool(_) => out.push(KIND_BOOL),
        Value::Integer(i) => {
            out.push(KIND_INTEGER);
            push_u64(out, *i as u64);
        }
        Value::Double(d) => {
            out.push(KIND_DOUBLE);
            push_u64(out, d.to_bits());
        }
        Value::Text(_) => out.push(KIND_TEXT),
        Value::Blob(_) => out.push(KIND_BLOB),
        Value::Array(arr) => arr.iterate(&mut |_, v| write_suffix(out, v))?,
        Value::Document(doc) => {
            let fields = collect_fields(doc.as_ref())?;
            let layout = FieldLayout::new(&fields);
            push_u32(out, to_u32(fields.len())?);
            for (i, (name, v)) in fields.iter().enumerate() {
                match layout.positions[i] {
                    Some(pos) => push_u32(out, to_u32(pos)?),
                    None => {
                        push_u32(out, DUPLICATE);
                        write_escaped(out, name.as_bytes());
                        encode_into(out, v)?;
                    }
                }
            }
            for &i in &layout.sorted {
                write_suffix(out, &fields[i].1)?;
            }
        }
    }
    Ok(())
}

/// Where each field of a document lands in its sort key
struct FieldLayout {
    /// Indices of first occurrences, sorted by name
    sorted: Vec<usize>,
    /// Sort key position of each field, `None` for later duplicates
    positions: Vec<Option<usize>>,
}

impl FieldLayout {
    fn new(fields: &[(String, Value)]) -> Self {
        let mut order: Vec<usize> = (0..fields.len()).collect();
        // Stable, so the first occurrence of a name stays ahead of the rest
        order.sort_by(|&a, &b| fields[a].0.cmp(&fields[b].0));
        order.dedup_by(|later, first| fields[*later].0 == fields[*first].0);

        let mut positions = vec![None; fields.len()];
        for (pos, &i) in order.iter().enumerate() {
            positions[i] = Some(pos);
        }
        FieldLayout {
            sorted: order,
            positions,
        }
    }
}

fn push_number(out: &mut Vec<u8>, d: f64) {
    out.push(NUMBER);
    push_u64(out, ordered_f64_bits(d));
}

/// Map an f64 to bits whose unsigned order matches [`compare_f64`]
fn ordered_f64_bits(d: f64) -> u64 {
    if d.is_nan() {
        return 0;
    }
    let d = if d == 0.0 { 0.0 } else { d };
    let bits = d.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits | SIGN_BIT
    }
}

fn f64_from_ordered_bits(bits: u64) -> f64 {
    if bits == 0 {
        f64::NAN
    } else if bits & SIGN_BIT != 0 {
        f64::from_bits(bits ^ SIGN_BIT)
    } else {
        f64::from_bits(!bits)
    }
}

fn push_u64(out: &mut Vec<u8>, v: u64) {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, v);
    out.extend_from_slice(&buf);
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, v);
    out.extend_from_slice(&buf);
}

fn to_u32(n: usize) -> Result<u32> {
    u32::try_from(n)
        .ok()
        .filter(|&v| v != DUPLICATE)
        .ok_or_else(|| Error::Unsupported(format!("document with {} fields in ordered key", n)))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a key that holds exactly one value
pub fn decode(bytes: &[u8]) -> Result<Value> {
    decode_with_limits(bytes, &Limits::default())
}

/// Decode one value under the given limits, rejecting trailing bytes
pub fn decode_with_limits(bytes: &[u8], limits: &Limits) -> Result<Value> {
    let (value, len) = decode_prefix_with_limits(bytes, limits)?;
    if len != bytes.len() {
        let err = DecodeError::TrailingBytes { offset: len };
        warn!(target: "docmodel::ordered", offset = len, error = %err, "ordered decode failed");
        return Err(err.into());
    }
    Ok(value)
}

/// Decode the first key in `bytes`, returning the value and bytes consumed
///
/// ```
/// use docmodel_core::Value;
/// use docmodel_encoding::ordered;
///
/// let mut key = ordered::encode(&Value::from("user")).unwrap();
/// ordered::encode_into(&mut key, &Value::Integer(7)).unwrap();
///
/// let (first, used) = ordered::decode_prefix(&key).unwrap();
/// assert_eq!(first, Value::from("user"));
/// assert_eq!(ordered::decode(&key[used..]).unwrap(), Value::Integer(7));
/// ```
pub fn decode_prefix(bytes: &[u8]) -> Result<(Value, usize)> {
    decode_prefix_with_limits(bytes, &Limits::default())
}

/// [`decode_prefix`] under the given limits
pub fn decode_prefix_with_limits(bytes: &[u8], limits: &Limits) -> Result<(Value, usize)> {
    let result = limits
        .validate_encoded_len(bytes.len())
        .map_err(Error::from)
        .and_then(|()| {
            let mut decoder = Decoder {
                cursor: Cursor::new(bytes),
                limits,
            };
            let value = decoder.value(0)?;
            Ok((value, decoder.cursor.position()))
        });
    if let Err(e) = &result {
        log_failure(e);
    }
    result
}

/// Decode a key written by [`encode_tuple`]
pub fn decode_tuple(bytes: &[u8]) -> Result<Vec<Value>> {
    decode_tuple_with_limits(bytes, &Limits::default())
}

/// [`decode_tuple`] under the given limits
pub fn decode_tuple_with_limits(bytes: &[u8], limits: &Limits) -> Result<Vec<Value>> {
    let result = limits
        .validate_encoded_len(bytes.len())
        .map_err(Error::from)
        .and_then(|()| {
            let mut decoder = Decoder {
                cursor: Cursor::new(bytes),
                limits,
            };
            let mut parts = Vec::new();
            while !decoder.at_end()? {
                decoder.check_len(parts.len() + 1, limits.max_array_len, "array_too_long")?;
                parts.push(decoder.skeleton(0)?);
            }
            let mut values = Vec::with_capacity(parts.len());
            for part in parts {
                values.push(decoder.fill(part, 0)?);
            }
            decoder.cursor.finish()?;
            Ok(values)
        });
    if let Err(e) = &result {
        log_failure(e);
    }
    result
}

fn log_failure(err: &Error) {
    match err {
        Error::MalformedEncoding(d) => {
            warn!(target: "docmodel::ordered", offset = ?d.offset(), error = %d, "ordered decode failed")
        }
        other => warn!(target: "docmodel::ordered", error = %other, "ordered decode rejected"),
    }
}

/// Sort key parsed ahead of its suffix
enum Skeleton {
    Null,
    Number(f64),
    Duration(i64),
    Bytes(Vec<u8>),
    Array(Vec<Skeleton>),
    Document(Vec<(String, Skeleton)>),
}

struct Decoder<'a, 'l> {
    cursor: Cursor<'a>,
    limits: &'l Limits,
}

impl<'a, 'l> Decoder<'a, 'l> {
    fn value(&mut self, depth: usize) -> Result<Value> {
        let skeleton = self.skeleton(depth)?;
        self.fill(skeleton, depth)
    }

    fn skeleton(&mut self, depth: usize) -> Result<Skeleton> {
        if depth > self.limits.max_nesting_depth {
            return Err(DecodeError::NestingTooDeep {
                depth,
                max: self.limits.max_nesting_depth,
            }
            .into());
        }
        let offset = self.cursor.position();
        let tag = self.cursor.byte()?;
        let skeleton = match tag {
            NULL => Skeleton::Null,
            NUMBER => {
                let bits = self.u64()?;
                let d = f64_from_ordered_bits(bits);
                if bits != 0 && d.is_nan() {
                    return Err(unexpected(bits.to_be_bytes()[0], offset + 1, "ordered number"));
                }
                Skeleton::Number(d)
            }
            DURATION => Skeleton::Duration((self.u64()? ^ SIGN_BIT) as i64),
            BYTES => {
                let bytes = read_escaped(&mut self.cursor)?;
                self.check_len(bytes.len(), self.limits.max_string_bytes, "text_too_long")?;
                Skeleton::Bytes(bytes)
            }
            ARRAY => {
                let mut items = Vec::new();
                while !self.at_end()? {
                    self.check_len(items.len() + 1, self.limits.max_array_len, "array_too_long")?;
                    items.push(self.skeleton(depth + 1)?);
                }
                Skeleton::Array(items)
            }
            DOCUMENT => {
                let mut fields: Vec<(String, Skeleton)> = Vec::new();
                while !self.at_end()? {
                    self.check_len(
                        fields.len() + 1,
                        self.limits.max_document_fields,
                        "document_too_many_fields",
                    )?;
                    self.cursor.expect(FIELD, "field marker or end")?;
                    let name_offset = self.cursor.position();
                    let name = utf8(read_escaped_inverted(&mut self.cursor)?, name_offset)?;
                    if let Some((prev, _)) = fields.last() {
                        if prev.as_str() >= name.as_str() {
                            return Err(unexpected(FIELD, name_offset - 1, "ascending field names"));
                        }
                    }
                    let value = self.skeleton(depth + 1)?;
                    fields.push((name, value));
                }
                Skeleton::Document(fields)
            }
            tag => return Err(DecodeError::UnknownTag { tag, offset }.into()),
        };
        Ok(skeleton)
    }

    /// Read the suffix for `skeleton` and build the exact value
    fn fill(&mut self, skeleton: Skeleton, depth: usize) -> Result<Value> {
        let value = match skeleton {
            Skeleton::Null => Value::Null,
            Skeleton::Duration(d) => Value::Duration(d),
            Skeleton::Number(n) => {
                let offset = self.cursor.position();
                match self.cursor.byte()? {
                    KIND_BOOL if n == 0.0 || n == 1.0 => Value::Bool(n == 1.0),
                    KIND_INTEGER => {
                        let i = self.u64()? as i64;
                        self.check_number(i as f64, n, offset)?;
                        Value::Integer(i)
                    }
                    KIND_DOUBLE => {
                        let d = f64::from_bits(self.u64()?);
                        self.check_number(d, n, offset)?;
                        Value::Double(d)
                    }
                    byte => return Err(unexpected(byte, offset, "number kind")),
                }
            }
            Skeleton::Bytes(bytes) => {
                let offset = self.cursor.position();
                match self.cursor.byte()? {
                    KIND_TEXT => Value::Text(utf8(bytes, offset)?),
                    KIND_BLOB => Value::Blob(bytes),
                    byte => return Err(unexpected(byte, offset, "bytes kind")),
                }
            }
            Skeleton::Array(items) => {
                let mut out = ValueBuffer::with_capacity(items.len());
                for item in items {
                    out.append(self.fill(item, depth + 1)?);
                }
                Value::array(out)
            }
            Skeleton::Document(fields) => Value::document(self.fill_document(fields, depth)?),
        };
        Ok(value)
    }

    fn fill_document(
        &mut self,
        fields: Vec<(String, Skeleton)>,
        depth: usize,
    ) -> Result<FieldBuffer> {
        let count_offset = self.cursor.position();
        let count = self.u32()? as usize;
        self.check_len(count, self.limits.max_document_fields, "document_too_many_fields")?;

        enum Slot {
            Sorted(usize),
            Duplicate(String, Value),
        }
        let mut slots = Vec::with_capacity(count.min(fields.len()));
        let mut seen = vec![false; fields.len()];
        for _ in 0..count {
            let offset = self.cursor.position();
            let pos = self.u32()?;
            if pos == DUPLICATE {
                let name_offset = self.cursor.position();
                let name = utf8(read_escaped(&mut self.cursor)?, name_offset)?;
                let value = self.value(depth + 1)?;
                slots.push(Slot::Duplicate(name, value));
                continue;
            }
            let pos = pos as usize;
            match seen.get_mut(pos) {
                Some(used) if !*used => *used = true,
                _ => {
                    return Err(unexpected(
                        self.peek_back(offset),
                        offset,
                        "unused field position",
                    ))
                }
            }
            slots.push(Slot::Sorted(pos));
        }
        if seen.iter().any(|used| !used) {
            return Err(unexpected(
                self.peek_back(count_offset),
                count_offset,
                "a position for every field",
            ));
        }

        let mut sorted = Vec::with_capacity(fields.len());
        for (name, skeleton) in fields {
            let value = self.fill(skeleton, depth + 1)?;
            sorted.push(Some((name, value)));
        }

        let mut out = FieldBuffer::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Slot::Sorted(pos) => {
                    if let Some((name, value)) = sorted[pos].take() {
                        out.add(name, value);
                    }
                }
                Slot::Duplicate(name, value) => {
                    out.add(name, value);
                }
            }
        }
        Ok(out)
    }

    fn check_number(&self, exact: f64, sort: f64, offset: usize) -> Result<()> {
        if compare_f64(exact, sort) != Ordering::Equal {
            return Err(unexpected(
                self.peek_back(offset),
                offset,
                "number matching its sort key",
            ));
        }
        Ok(())
    }

    fn check_len(&self, actual: usize, max: usize, reason: &str) -> Result<()> {
        if actual > max {
            return Err(LimitError::ValueTooLarge {
                reason: reason.to_string(),
                actual,
                max,
            }
            .into());
        }
        Ok(())
    }

    fn at_end(&mut self) -> std::result::Result<bool, DecodeError> {
        match self.cursor.peek() {
            None => Err(DecodeError::Truncated {
                offset: self.cursor.position(),
            }),
            Some(END) => {
                self.cursor.byte()?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    fn u64(&mut self) -> std::result::Result<u64, DecodeError> {
        Ok(BigEndian::read_u64(self.cursor.take(8)?))
    }

    fn u32(&mut self) -> std::result::Result<u32, DecodeError> {
        Ok(BigEndian::read_u32(self.cursor.take(4)?))
    }

    /// Byte at an offset already consumed, for error reports
    fn peek_back(&self, offset: usize) -> u8 {
        self.cursor.byte_at(offset).unwrap_or(0)
    }
}

fn utf8(bytes: Vec<u8>, offset: usize) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset }.into())
}

fn unexpected(byte: u8, offset: usize, expected: &'static str) -> Error {
    DecodeError::UnexpectedByte {
        byte,
        offset,
        expected,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_core::compare;

    fn key(v: impl Into<Value>) -> Vec<u8> {
        encode(&v.into()).unwrap()
    }

    fn skey(v: impl Into<Value>) -> Vec<u8> {
        sort_key(&v.into()).unwrap()
    }

    fn doc(fields: &[(&str, i64)]) -> Value {
        let mut buf = FieldBuffer::new();
        for (name, v) in fields {
            buf.add(*name, *v);
        }
        buf.into()
    }

    fn roundtrip(v: Value) {
        let bytes = encode(&v).unwrap();
        let back = decode(&bytes).unwrap();
        assert_eq!(back, v, "round trip of {}", v);
    }

    #[test]
    fn test_integer_order() {
        assert!(key(-5) < key(0));
        assert!(key(0) < key(5));
        assert!(key(i64::MIN) < key(-1));
        assert!(key(1) < key(i64::MAX));
    }

    #[test]
    fn test_text_order() {
        assert!(key("ab") < key("abc"));
        assert!(key("abc") < key("b"));
        assert!(key("") < key("\0"));
        assert!(key("a\0") < key("a\x01"));
    }

    #[test]
    fn test_family_order() {
        let ordered = vec![
            Value::Null,
            Value::Double(f64::NAN),
            Value::Double(f64::NEG_INFINITY),
            Value::Integer(-1),
            Value::Bool(false),
            Value::Double(0.5),
            Value::Integer(1),
            Value::Double(f64::INFINITY),
            Value::Duration(i64::MIN),
            Value::Duration(0),
            Value::Duration(i64::MAX),
            Value::Text(String::new()),
            Value::Blob(vec![0x00]),
            Value::Text("z".into()),
            Value::from(ValueBuffer::new()),
            vec![Value::Null].into(),
            vec![Value::Integer(1)].into(),
            Value::from(FieldBuffer::new()),
            doc(&[("z", 1)]),
            doc(&[("a", 1)]),
        ];
        for pair in ordered.windows(2) {
            assert_eq!(compare(&pair[0], &pair[1]).unwrap(), Ordering::Less);
            assert!(
                key(pair[0].clone()) < key(pair[1].clone()),
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_comparator_equal_values_share_sort_key() {
        assert_eq!(skey(1), skey(1.0));
        assert_eq!(skey(true), skey(1));
        assert_eq!(skey(-0.0), skey(0));
        assert_eq!(skey("foo"), skey(Value::Blob(b"foo".to_vec())));
        assert_eq!(
            skey(doc(&[("a", 1), ("b", 2)])),
            skey(doc(&[("b", 2), ("a", 1), ("a", 9)]))
        );
        // Full keys still tell them apart
        assert_ne!(key(1), key(1.0));
        assert_ne!(key(true), key(1));
    }

    #[test]
    fn test_document_order_follows_comparator() {
        let cases = [
            (doc(&[("a", 1)]), doc(&[("a", 2)])),
            (doc(&[("a", 1)]), doc(&[("a", 1), ("b", 0)])),
            (doc(&[("b", 5)]), doc(&[("a", 1)])),
            (doc(&[("ab", 1)]), doc(&[("a", 1)])),
            (doc(&[("a\0", 1)]), doc(&[("a", 1)])),
        ];
        for (lo, hi) in cases {
            assert_eq!(compare(&lo, &hi).unwrap(), Ordering::Less, "{} < {}", lo, hi);
            assert!(key(lo.clone()) < key(hi.clone()), "{} < {}", lo, hi);
        }
    }

    #[test]
    fn test_roundtrip_exact() {
        roundtrip(Value::Null);
        roundtrip(Value::Bool(true));
        roundtrip(Value::Bool(false));
        roundtrip(Value::Integer(i64::MAX));
        roundtrip(Value::Integer(i64::MAX - 1));
        roundtrip(Value::Integer(i64::MIN));
        roundtrip(Value::Double(-0.0));
        roundtrip(Value::Double(1e300));
        roundtrip(Value::Duration(-1));
        roundtrip(Value::Text("h\0llo".into()));
        roundtrip(Value::Blob(vec![0xFF, 0x00]));
        roundtrip(vec![Value::Integer(1), Value::Double(1.0), Value::Bool(true)].into());
        roundtrip(doc(&[("b", 2), ("a", 1), ("b", 3)]));
        roundtrip(
            FieldBuffer::new()
                .with_field("z", vec![Value::from(doc(&[("y", 1), ("x", 2)]))])
                .with_field("", Value::Null)
                .into(),
        );
    }

    #[test]
    fn test_nan_roundtrip_keeps_bits() {
        let weird = f64::from_bits(0x7FF8_0000_0000_0001);
        match decode(&key(weird)).unwrap() {
            Value::Double(d) => assert_eq!(d.to_bits(), weird.to_bits()),
            other => panic!("expected double, got {:?}", other),
        }
        match decode(&key(-0.0)).unwrap() {
            Value::Double(d) => assert!(d == 0.0 && d.is_sign_negative()),
            other => panic!("expected double, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_prefix_splits_composite_keys() {
        let parts = vec![
            Value::from("tenant"),
            doc(&[("k", 1)]),
            Value::Integer(-3),
            Value::Null,
        ];
        let mut bytes = Vec::new();
        for p in &parts {
            encode_into(&mut bytes, p).unwrap();
        }
        let mut rest = &bytes[..];
        let mut out = Vec::new();
        while !rest.is_empty() {
            let (v, used) = decode_prefix(rest).unwrap();
            out.push(v);
            rest = &rest[used..];
        }
        assert_eq!(out, parts);
    }

    fn tuple(parts: &[Value]) -> Vec<u8> {
        encode_tuple(parts).unwrap()
    }

    #[test]
    fn test_tuple_orders_by_first_part() {
        let a = tuple(&[Value::from("a"), Value::Integer(999)]);
        let b = tuple(&[Value::from("ab"), Value::Integer(0)]);
        assert!(a < b);
    }

    #[test]
    fn test_tuple_equal_parts_defer_to_next_part() {
        // 1 and 1.0 compare equal, so the second part decides
        let a = tuple(&[Value::Integer(1), Value::Integer(5)]);
        let b = tuple(&[Value::Double(1.0), Value::Integer(3)]);
        assert!(a > b);

        let a = tuple(&[Value::from("k"), Value::Integer(1)]);
        let b = tuple(&[Value::Blob(b"k".to_vec()), Value::Integer(2)]);
        assert!(a < b);

        let a = tuple(&[doc(&[("x", 1), ("y", 2)]), Value::Null]);
        let b = tuple(&[doc(&[("y", 2), ("x", 1)]), Value::Bool(false)]);
        assert!(a < b);
    }

    #[test]
    fn test_tuple_prefix_sorts_first() {
        assert!(tuple(&[]) < tuple(&[Value::Null]));
        assert!(tuple(&[Value::Integer(1)]) < tuple(&[Value::Integer(1), Value::Null]));
        assert!(tuple(&[Value::Integer(2)]) > tuple(&[Value::Integer(1), Value::Integer(9)]));
    }

    #[test]
    fn test_tuple_roundtrip_exact() {
        let parts = vec![
            Value::Bool(true),
            Value::Double(-0.0),
            Value::Blob(vec![0, 0xFF]),
            doc(&[("b", 2), ("a", 1), ("b", 3)]),
            vec![Value::Integer(1), Value::Double(1.0)].into(),
        ];
        let bytes = tuple(&parts);
        let back = decode_tuple(&bytes).unwrap();
        assert_eq!(tuple(&back), bytes);
        assert_eq!(back, parts);
        assert_eq!(decode_tuple(&tuple(&[])).unwrap(), Vec::<Value>::new());

        assert!(decode_tuple(&bytes[..bytes.len() - 1]).is_err());
        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(
            decode_tuple(&trailing),
            Err(Error::MalformedEncoding(DecodeError::TrailingBytes { .. }))
        ));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode(&[0x07]),
            Err(Error::MalformedEncoding(DecodeError::UnknownTag {
                tag: 0x07,
                offset: 0
            }))
        );
        let bytes = key(42);
        for cut in 0..bytes.len() {
            assert!(matches!(
                decode(&bytes[..cut]),
                Err(Error::MalformedEncoding(DecodeError::Truncated { .. }))
            ));
        }
        let mut trailing = key(Value::Null);
        trailing.push(0x02);
        assert!(matches!(
            decode(&trailing),
            Err(Error::MalformedEncoding(DecodeError::TrailingBytes { offset: 1 }))
        ));
        // Text kind over bytes that are not UTF-8
        let mut bad = vec![BYTES];
        write_escaped(&mut bad, &[0xFF]);
        bad.push(KIND_TEXT);
        assert!(matches!(
            decode(&bad),
            Err(Error::MalformedEncoding(DecodeError::InvalidUtf8 { .. }))
        ));
    }

    #[test]
    fn test_rejects_inconsistent_suffix() {
        let mut bytes = sort_key(&Value::Integer(5)).unwrap();
        bytes.push(KIND_INTEGER);
        push_u64(&mut bytes, 6);
        assert!(matches!(
            decode(&bytes),
            Err(Error::MalformedEncoding(DecodeError::UnexpectedByte { .. }))
        ));

        let mut bytes = sort_key(&Value::Integer(5)).unwrap();
        bytes.push(KIND_BOOL);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn test_rejects_unsorted_document_fields() {
        let mut bytes = vec![DOCUMENT];
        for name in ["b", "a"] {
            bytes.push(FIELD);
            write_escaped_inverted(&mut bytes, name.as_bytes());
            bytes.push(NULL);
        }
        bytes.push(END);
        assert!(matches!(
            decode(&bytes),
            Err(Error::MalformedEncoding(DecodeError::UnexpectedByte { .. }))
        ));
    }

    #[test]
    fn test_limits() {
        let limits = Limits::with_small_limits();
        let mut v = Value::Null;
        for _ in 0..=limits.max_nesting_depth {
            v = vec![v].into();
        }
        assert!(matches!(
            decode_with_limits(&encode(&v).unwrap(), &limits),
            Err(Error::MalformedEncoding(DecodeError::NestingTooDeep { .. }))
        ));
        let hostile = vec![ARRAY; 100_000];
        assert!(matches!(
            decode(&hostile),
            Err(Error::MalformedEncoding(DecodeError::NestingTooDeep { .. }))
        ));
        let long = Value::Text("x".repeat(limits.max_string_bytes + 1));
        assert!(matches!(
            decode_with_limits(&encode(&long).unwrap(), &limits),
            Err(Error::LimitExceeded(_))
        ));
    }
}
