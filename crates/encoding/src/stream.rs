//! Self-describing streaming encoding
//!
//! Every value starts with its one-byte [`ValueType`] tag. The length of a
//! value is always discoverable by scanning forward, so a reader holding a
//! partial buffer can tell whether it has a complete value without any
//! length header.
//!
//! ## Value Format
//!
//! ```text
//! Null:      0x80
//! Bool:      0x81 | 0x00 or 0x01
//! Integer:   0x90 | i64 (8 bytes, big-endian)
//! Double:    0xA0 | f64 bits (8 bytes, big-endian)
//! Duration:  0xB0 | i64 nanoseconds (8 bytes, big-endian)
//! Text:      0xC0 | escaped UTF-8 | 0x00 0x01
//! Blob:      0xD0 | escaped bytes | 0x00 0x01
//! Array:     0xE0 | value (0x1F value)* | 0x1E
//! Document:  0xF0 | (0x1F name value)* | 0x1D
//! ```
//!
//! Field names use the same escaped form as Text. Inside a string a 0x00
//! byte is written as 0x00 0xFF, so the terminator never appears in the
//! payload. Every field opens with 0x1F, so the byte after a field's value
//! is always framing and a name may start with any byte.
//!
//! Array elements need no marker of their own: every element starts with a
//! tag byte, and no tag collides with 0x1E.

use crate::escape::{read_escaped, scan_escaped, write_escaped, Cursor, Scan};
use byteorder::{BigEndian, ByteOrder};
use docmodel_core::{
    Array, DecodeError, Document, Error, FieldBuffer, LimitError, Limits, Result, Value,
    ValueBuffer, ValueType,
};
use tracing::{trace, warn};

/// Separates consecutive array elements and opens each document field
pub const VALUE_DELIMITER: u8 = 0x1F;

/// Closes an array
pub const ARRAY_END: u8 = 0x1E;

/// Closes a document
pub const DOCUMENT_END: u8 = 0x1D;

// ============================================================================
// Encoding
// ============================================================================

/// Encode a value
///
/// Fails only when a lazily parsed array or document fails to iterate.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(&mut out, value)?;
    Ok(out)
}

/// Append the encoding of `value` to `out`
pub fn encode_into(out: &mut Vec<u8>, value: &Value) -> Result<()> {
    out.push(value.value_type().as_byte());
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(u8::from(*b)),
        Value::Integer(i) | Value::Duration(i) => push_i64(out, *i),
        Value::Double(d) => push_u64(out, d.to_bits()),
        Value::Text(s) => write_escaped(out, s.as_bytes()),
        Value::Blob(b) => write_escaped(out, b),
        Value::Array(arr) => encode_array_body(out, arr.as_ref())?,
        Value::Document(doc) => encode_document_body(out, doc.as_ref())?,
    }
    Ok(())
}

/// Encode a document as a standalone record
pub fn encode_document(doc: &dyn Document) -> Result<Vec<u8>> {
    let mut out = vec![ValueType::Document.as_byte()];
    encode_document_body(&mut out, doc)?;
    Ok(out)
}

fn encode_array_body(out: &mut Vec<u8>, arr: &dyn Array) -> Result<()> {
    arr.iterate(&mut |i, v| {
        if i > 0 {
            out.push(VALUE_DELIMITER);
        }
        encode_into(out, v)
    })?;
    out.push(ARRAY_END);
    Ok(())
}

fn encode_document_body(out: &mut Vec<u8>, doc: &dyn Document) -> Result<()> {
    doc.iterate(&mut |name, v| {
        out.push(VALUE_DELIMITER);
        write_escaped(out, name.as_bytes());
        encode_into(out, v)
    })?;
    out.push(DOCUMENT_END);
    Ok(())
}

fn push_i64(out: &mut Vec<u8>, v: i64) {
    let mut buf = [0u8; 8];
    BigEndian::write_i64(&mut buf, v);
    out.extend_from_slice(&buf);
}

fn push_u64(out: &mut Vec<u8>, v: u64) {
    let mut buf = [0u8; 8];
    BigEndian::write_u64(&mut buf, v);
    out.extend_from_slice(&buf);
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode exactly one value using default limits
pub fn decode(bytes: &[u8]) -> Result<Value> {
    decode_with_limits(bytes, &Limits::default())
}

/// Decode exactly one value, rejecting trailing bytes
pub fn decode_with_limits(bytes: &[u8], limits: &Limits) -> Result<Value> {
    let result = limits
        .validate_encoded_len(bytes.len())
        .map_err(Error::from)
        .and_then(|()| {
            let mut decoder = Decoder::new(bytes, limits);
            let value = decoder.value(0)?;
            decoder.cursor.finish()?;
            Ok(value)
        });
    if let Err(e) = &result {
        log_failure(e, bytes.len());
    }
    result
}

/// Decode a record written by [`encode_document`]
pub fn decode_document(bytes: &[u8]) -> Result<FieldBuffer> {
    decode_document_with_limits(bytes, &Limits::default())
}

/// Decode a document record under the given limits
pub fn decode_document_with_limits(bytes: &[u8], limits: &Limits) -> Result<FieldBuffer> {
    let result = limits
        .validate_encoded_len(bytes.len())
        .map_err(Error::from)
        .and_then(|()| {
            let mut decoder = Decoder::new(bytes, limits);
            decoder.expect_tag(ValueType::Document, "document tag")?;
            let doc = decoder.document_body(0)?;
            decoder.cursor.finish()?;
            Ok(doc)
        });
    if let Err(e) = &result {
        log_failure(e, bytes.len());
    }
    result
}

/// Length in bytes of the first complete value in `bytes`
///
/// Returns [`DecodeError::Truncated`] when the buffer holds only part of a
/// value. Nothing is allocated.
pub fn value_len(bytes: &[u8]) -> std::result::Result<usize, DecodeError> {
    value_len_with_limits(bytes, &Limits::default())
}

/// [`value_len`] with a caller-provided nesting limit
pub fn value_len_with_limits(
    bytes: &[u8],
    limits: &Limits,
) -> std::result::Result<usize, DecodeError> {
    let mut scanner = Scanner::default();
    match scanner.advance(bytes, limits.max_nesting_depth)? {
        Some(len) => Ok(len),
        None => Err(DecodeError::Truncated {
            offset: bytes.len(),
        }),
    }
}

fn log_failure(err: &Error, len: usize) {
    match err {
        Error::MalformedEncoding(e) => {
            warn!(target: "docmodel::stream", offset = ?e.offset(), len, error = %e, "stream decode failed")
        }
        other => warn!(target: "docmodel::stream", len, error = %other, "stream decode rejected"),
    }
}

struct Decoder<'a, 'l> {
    cursor: Cursor<'a>,
    limits: &'l Limits,
}

impl<'a, 'l> Decoder<'a, 'l> {
    fn new(bytes: &'a [u8], limits: &'l Limits) -> Self {
        Decoder {
            cursor: Cursor::new(bytes),
            limits,
        }
    }

    fn tag(&mut self) -> std::result::Result<ValueType, DecodeError> {
        let offset = self.cursor.position();
        let tag = self.cursor.byte()?;
        ValueType::from_byte(tag).ok_or(DecodeError::UnknownTag { tag, offset })
    }

    fn expect_tag(&mut self, want: ValueType, expected: &'static str) -> Result<()> {
        let offset = self.cursor.position();
        let ty = self.tag()?;
        if ty != want {
            return Err(DecodeError::UnexpectedByte {
                byte: ty.as_byte(),
                offset,
                expected,
            }
            .into());
        }
        Ok(())
    }

    fn value(&mut self, depth: usize) -> Result<Value> {
        check_depth(depth, self.limits.max_nesting_depth)?;
        let ty = self.tag()?;
        let value = match ty {
            ValueType::Null => Value::Null,
            ValueType::Bool => {
                let offset = self.cursor.position();
                match self.cursor.byte()? {
                    0x00 => Value::Bool(false),
                    0x01 => Value::Bool(true),
                    byte => {
                        return Err(DecodeError::UnexpectedByte {
                            byte,
                            offset,
                            expected: "bool byte 0x00 or 0x01",
                        }
                        .into())
                    }
                }
            }
            ValueType::Integer => Value::Integer(BigEndian::read_i64(self.cursor.take(8)?)),
            ValueType::Double => {
                Value::Double(f64::from_bits(BigEndian::read_u64(self.cursor.take(8)?)))
            }
            ValueType::Duration => Value::Duration(BigEndian::read_i64(self.cursor.take(8)?)),
            ValueType::Text => Value::Text(self.text("text_too_long")?),
            ValueType::Blob => {
                let bytes = read_escaped(&mut self.cursor)?;
                self.check_string_len(bytes.len(), "blob_too_long")?;
                Value::Blob(bytes)
            }
            ValueType::Array => Value::array(self.array_body(depth)?),
            ValueType::Document => Value::document(self.document_body(depth)?),
        };
        Ok(value)
    }

    fn text(&mut self, reason: &str) -> Result<String> {
        let offset = self.cursor.position();
        let bytes = read_escaped(&mut self.cursor)?;
        self.check_string_len(bytes.len(), reason)?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset }.into())
    }

    fn array_body(&mut self, depth: usize) -> Result<ValueBuffer> {
        let mut out = ValueBuffer::new();
        loop {
            if self.at_end(ARRAY_END)? {
                return Ok(out);
            }
            if !out.is_empty() {
                self.cursor
                    .expect(VALUE_DELIMITER, "value delimiter or array end")?;
            }
            if out.len() == self.limits.max_array_len {
                return Err(too_large("array_too_long", out.len() + 1, self.limits.max_array_len));
            }
            out.append(self.value(depth + 1)?);
        }
    }

    fn document_body(&mut self, depth: usize) -> Result<FieldBuffer> {
        let mut out = FieldBuffer::new();
        loop {
            if self.at_end(DOCUMENT_END)? {
                return Ok(out);
            }
            self.cursor
                .expect(VALUE_DELIMITER, "field marker or document end")?;
            if out.len() == self.limits.max_document_fields {
                return Err(too_large(
                    "document_too_many_fields",
                    out.len() + 1,
                    self.limits.max_document_fields,
                ));
            }
            let name = self.text("text_too_long")?;
            let value = self.value(depth + 1)?;
            out.add(name, value);
        }
    }

    /// Consume `end` if it is the next byte
    fn at_end(&mut self, end: u8) -> std::result::Result<bool, DecodeError> {
        match self.cursor.peek() {
            None => Err(DecodeError::Truncated {
                offset: self.cursor.position(),
            }),
            Some(b) if b == end => {
                self.cursor.byte()?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// Like [`value`](Self::value), but arrays and documents stay encoded
    fn view(&mut self, depth: usize) -> Result<Value> {
        let ty = self.cursor.peek().and_then(ValueType::from_byte);
        if !matches!(ty, Some(ValueType::Array | ValueType::Document)) {
            return self.value(depth);
        }
        let start = self.cursor.position();
        skip_value(&mut self.cursor, depth, self.limits.max_nesting_depth)?;
        let bytes = self.cursor.input()[start..self.cursor.position()].to_vec();
        let limits = self.limits.clone();
        Ok(match ty {
            Some(ValueType::Array) => Value::array(EncodedArray { bytes, limits }),
            _ => Value::document(EncodedDocument { bytes, limits }),
        })
    }

    fn check_string_len(&self, len: usize, reason: &str) -> Result<()> {
        if len > self.limits.max_string_bytes {
            return Err(too_large(reason, len, self.limits.max_string_bytes));
        }
        Ok(())
    }
}

fn check_depth(depth: usize, max: usize) -> std::result::Result<(), DecodeError> {
    if depth > max {
        return Err(DecodeError::NestingTooDeep { depth, max });
    }
    Ok(())
}

fn too_large(reason: &str, actual: usize, max: usize) -> Error {
    LimitError::ValueTooLarge {
        reason: reason.to_string(),
        actual,
        max,
    }
    .into()
}

/// Advance `cursor` past the value it is positioned at
fn skip_value(
    cursor: &mut Cursor<'_>,
    depth: usize,
    max_depth: usize,
) -> std::result::Result<(), DecodeError> {
    let mut scanner = Scanner::starting_at(cursor.position(), depth);
    match scanner.advance(cursor.input(), max_depth)? {
        Some(end) => {
            cursor.advance_to(end);
            Ok(())
        }
        None => Err(DecodeError::Truncated {
            offset: cursor.input().len(),
        }),
    }
}

// ============================================================================
// Scanning
// ============================================================================

/// What the scanner expects next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// A tagged value
    Value,
    /// Rest of a Text or Blob payload
    Bytes,
    /// Rest of a field name, then its value
    Name,
    /// First element of an array, or its end
    FirstElement,
    /// Delimiter or end marker of the innermost open composite
    Next,
    /// The outermost value is complete
    Done,
}

/// Resumable scan for the end of one encoded value
///
/// Nothing is decoded or allocated beyond one byte per open composite.
/// When input runs out the scanner keeps its place, so input that arrives
/// a byte at a time is still scanned once overall.
#[derive(Debug, Clone)]
struct Scanner {
    pos: usize,
    /// Nesting depth of the value being scanned
    depth: usize,
    /// End marker of each open composite, innermost last
    open: Vec<u8>,
    step: Step,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner::starting_at(0, 0)
    }
}

impl Scanner {
    fn starting_at(pos: usize, depth: usize) -> Self {
        Scanner {
            pos,
            depth,
            open: Vec::new(),
            step: Step::Value,
        }
    }

    /// Continue over `input`, which must extend the input of earlier calls
    ///
    /// Returns the end offset once the value is complete, `None` while more
    /// input is needed.
    fn advance(
        &mut self,
        input: &[u8],
        max_depth: usize,
    ) -> std::result::Result<Option<usize>, DecodeError> {
        loop {
            match self.step {
                Step::Done => return Ok(Some(self.pos)),
                Step::Value => {
                    let tag = match input.get(self.pos) {
                        Some(&tag) => tag,
                        None => return Ok(None),
                    };
                    check_depth(self.depth + self.open.len(), max_depth)?;
                    let ty = ValueType::from_byte(tag).ok_or(DecodeError::UnknownTag {
                        tag,
                        offset: self.pos,
                    })?;
                    match ty {
                        ValueType::Null => self.close_value(1),
                        ValueType::Bool => {
                            if input.len() - self.pos < 2 {
                                return Ok(None);
                            }
                            self.close_value(2);
                        }
                        ValueType::Integer | ValueType::Double | ValueType::Duration => {
                            if input.len() - self.pos < 9 {
                                return Ok(None);
                            }
                            self.close_value(9);
                        }
                        ValueType::Text | ValueType::Blob => {
                            self.pos += 1;
                            self.step = Step::Bytes;
                        }
                        ValueType::Array => {
                            self.pos += 1;
                            self.open.push(ARRAY_END);
                            self.step = Step::FirstElement;
                        }
                        ValueType::Document => {
                            self.pos += 1;
                            self.open.push(DOCUMENT_END);
                            self.step = Step::Next;
                        }
                    }
                }
                Step::Bytes | Step::Name => match scan_escaped(input, self.pos)? {
                    Scan::Partial(at) => {
                        self.pos = at;
                        return Ok(None);
                    }
                    Scan::Complete(end) => {
                        self.pos = end;
                        self.step = if self.step == Step::Name {
                            Step::Value
                        } else {
                            self.after_value()
                        };
                    }
                },
                Step::FirstElement => match input.get(self.pos) {
                    None => return Ok(None),
                    Some(&ARRAY_END) => self.close_composite(),
                    Some(_) => self.step = Step::Value,
                },
                Step::Next => {
                    let byte = match input.get(self.pos) {
                        Some(&byte) => byte,
                        None => return Ok(None),
                    };
                    let in_document = self.open.last() == Some(&DOCUMENT_END);
                    if Some(&byte) == self.open.last() {
                        self.close_composite();
                    } else if byte == VALUE_DELIMITER {
                        self.pos += 1;
                        self.step = if in_document { Step::Name } else { Step::Value };
                    } else {
                        return Err(DecodeError::UnexpectedByte {
                            byte,
                            offset: self.pos,
                            expected: if in_document {
                                "field marker or document end"
                            } else {
                                "value delimiter or array end"
                            },
                        });
                    }
                }
            }
        }
    }

    fn close_value(&mut self, width: usize) {
        self.pos += width;
        self.step = self.after_value();
    }

    fn close_composite(&mut self) {
        self.pos += 1;
        self.open.pop();
        self.step = self.after_value();
    }

    fn after_value(&self) -> Step {
        if self.open.is_empty() {
            Step::Done
        } else {
            Step::Next
        }
    }
}

// ============================================================================
// Incremental decoding
// ============================================================================

/// Decodes values from input that arrives in pieces
///
/// ```
/// use docmodel_core::Value;
/// use docmodel_encoding::stream::{encode, StreamDecoder};
///
/// let bytes = encode(&Value::from("hello")).unwrap();
/// let mut decoder = StreamDecoder::new();
/// decoder.feed(&bytes[..3]);
/// assert!(decoder.next_value().unwrap().is_none());
/// decoder.feed(&bytes[3..]);
/// assert_eq!(decoder.next_value().unwrap(), Some(Value::from("hello")));
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    limits: Limits,
    /// Progress through the value at the front of `buffer`
    scanner: Scanner,
}

impl StreamDecoder {
    /// Decoder with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder with custom limits
    pub fn with_limits(limits: Limits) -> Self {
        StreamDecoder {
            buffer: Vec::new(),
            limits,
            scanner: Scanner::default(),
        }
    }

    /// Append received bytes
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received but not yet returned as a value
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete value, or `None` until more input arrives
    ///
    /// Malformed input is an error and stays in the buffer; the caller
    /// decides whether to [`reset`](Self::reset).
    pub fn next_value(&mut self) -> Result<Option<Value>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        match self
            .scanner
            .advance(&self.buffer, self.limits.max_nesting_depth)
        {
            Ok(Some(len)) => {
                let value = decode_with_limits(&self.buffer[..len], &self.limits)?;
                self.buffer.drain(..len);
                self.scanner = Scanner::default();
                Ok(Some(value))
            }
            Ok(None) => {
                self.limits.validate_encoded_len(self.buffer.len())?;
                trace!(target: "docmodel::stream", buffered = self.buffer.len(), "waiting for more input");
                Ok(None)
            }
            Err(e) => {
                warn!(target: "docmodel::stream", offset = ?e.offset(), error = %e, "stream decode failed");
                Err(e.into())
            }
        }
    }

    /// Drop any buffered bytes
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.scanner = Scanner::default();
    }
}

// ============================================================================
// Encoded views
// ============================================================================

/// Check that `bytes` hold exactly one value of type `ty`
fn check_record(
    bytes: &[u8],
    limits: &Limits,
    ty: ValueType,
    expected: &'static str,
) -> Result<()> {
    limits.validate_encoded_len(bytes.len())?;
    let len = value_len_with_limits(bytes, limits)?;
    if bytes[0] != ty.as_byte() {
        return Err(DecodeError::UnexpectedByte {
            byte: bytes[0],
            offset: 0,
            expected,
        }
        .into());
    }
    if len != bytes.len() {
        return Err(DecodeError::TrailingBytes { offset: len }.into());
    }
    Ok(())
}

/// Document read directly from its encoded record
///
/// Field lookups scan the record and skip values they do not need, so a
/// single field can be read without decoding the rest. Nested arrays and
/// documents come back as [`EncodedArray`] and [`EncodedDocument`] views.
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    bytes: Vec<u8>,
    limits: Limits,
}

impl EncodedDocument {
    /// Wrap a document record, checking that it is one complete document
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        Self::with_limits(bytes, Limits::default())
    }

    /// Wrap a document record under custom limits
    pub fn with_limits(bytes: Vec<u8>, limits: Limits) -> Result<Self> {
        check_record(&bytes, &limits, ValueType::Document, "document tag")?;
        Ok(EncodedDocument { bytes, limits })
    }

    /// The encoded record
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Walk fields, handing each name and a decoder positioned at its value
    fn walk(
        &self,
        f: &mut dyn FnMut(&str, &mut Decoder<'_, '_>) -> Result<bool>,
    ) -> Result<()> {
        let mut decoder = Decoder::new(&self.bytes, &self.limits);
        decoder.expect_tag(ValueType::Document, "document tag")?;
        while !decoder.at_end(DOCUMENT_END)? {
            decoder
                .cursor
                .expect(VALUE_DELIMITER, "field marker or document end")?;
            let name = decoder.text("text_too_long")?;
            if !f(&name, &mut decoder)? {
                break;
            }
        }
        Ok(())
    }
}

impl Document for EncodedDocument {
    fn iterate(&self, f: &mut dyn FnMut(&str, &Value) -> Result<()>) -> Result<()> {
        self.walk(&mut |name, decoder| {
            let value = decoder.view(1)?;
            f(name, &value)?;
            Ok(true)
        })
    }

    fn get_by_field(&self, field: &str) -> Result<Value> {
        let mut found = None;
        let max_depth = self.limits.max_nesting_depth;
        self.walk(&mut |name, decoder| {
            if name == field {
                found = Some(decoder.view(1)?);
                return Ok(false);
            }
            skip_value(&mut decoder.cursor, 1, max_depth)?;
            Ok(true)
        })?;
        found.ok_or_else(|| Error::field_not_found(field))
    }
}

/// Array read directly from its encoded form
///
/// ```
/// use docmodel_core::{Array, Value};
/// use docmodel_encoding::stream::{encode, EncodedArray};
///
/// let bytes = encode(&vec![Value::from(1), Value::from("two")].into()).unwrap();
/// let view = EncodedArray::new(bytes).unwrap();
/// assert_eq!(view.get_by_index(1).unwrap(), Value::from("two"));
/// ```
#[derive(Debug, Clone)]
pub struct EncodedArray {
    bytes: Vec<u8>,
    limits: Limits,
}

impl EncodedArray {
    /// Wrap an encoded array, checking that it is one complete array
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        Self::with_limits(bytes, Limits::default())
    }

    /// Wrap an encoded array under custom limits
    pub fn with_limits(bytes: Vec<u8>, limits: Limits) -> Result<Self> {
        check_record(&bytes, &limits, ValueType::Array, "array tag")?;
        Ok(EncodedArray { bytes, limits })
    }

    /// The encoded array
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn walk(
        &self,
        f: &mut dyn FnMut(usize, &mut Decoder<'_, '_>) -> Result<bool>,
    ) -> Result<()> {
        let mut decoder = Decoder::new(&self.bytes, &self.limits);
        decoder.expect_tag(ValueType::Array, "array tag")?;
        let mut index = 0;
        while !decoder.at_end(ARRAY_END)? {
            if index > 0 {
                decoder
                    .cursor
                    .expect(VALUE_DELIMITER, "value delimiter or array end")?;
            }
            if !f(index, &mut decoder)? {
                break;
            }
            index += 1;
        }
        Ok(())
    }
}

impl Array for EncodedArray {
    fn iterate(&self, f: &mut dyn FnMut(usize, &Value) -> Result<()>) -> Result<()> {
        self.walk(&mut |index, decoder| {
            let value = decoder.view(1)?;
            f(index, &value)?;
            Ok(true)
        })
    }

    fn get_by_index(&self, index: usize) -> Result<Value> {
        let mut found = None;
        let max_depth = self.limits.max_nesting_depth;
        self.walk(&mut |i, decoder| {
            if i == index {
                found = Some(decoder.view(1)?);
                return Ok(false);
            }
            skip_value(&mut decoder.cursor, 1, max_depth)?;
            Ok(true)
        })?;
        found.ok_or(Error::IndexOutOfRange { index })
    }
}
