//! Error types for the document data model
//!
//! This module defines the error taxonomy shared by every operation in the
//! data model: lookups, casts, arithmetic, path traversal and decoding.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::limits::LimitError;
use crate::path::PathParseError;
use crate::types::ValueType;
use thiserror::Error;

/// Result type alias for data model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document data model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Field lookup failed on a document
    #[error("field not found: {field}")]
    FieldNotFound {
        /// Name of the missing field
        field: String,
    },

    /// Index lookup failed on an array
    #[error("index out of range: {index}")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
    },

    /// Operation applied to an incompatible type
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Encoded bytes could not be decoded
    #[error("malformed encoding: {0}")]
    MalformedEncoding(#[from] DecodeError),

    /// Numeric conversion would drop a fractional part
    #[error("cannot convert {value} to integer without loss of precision")]
    PrecisionLoss {
        /// The value that could not be represented
        value: f64,
    },

    /// Numeric conversion or operation exceeds the target range
    #[error("overflow: {0}")]
    Overflow(String),

    /// Text could not be parsed as the requested type
    #[error("cannot parse {input:?} as {target}: {reason}")]
    Parse {
        /// Target type of the parse
        target: ValueType,
        /// Offending input (possibly truncated)
        input: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Path text could not be parsed
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathParseError),

    /// A configured limit was exceeded
    #[error("limit exceeded: {0}")]
    LimitExceeded(#[from] LimitError),

    /// Value has no representation in the target format
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create a FieldNotFound error
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Error::FieldNotFound {
            field: field.into(),
        }
    }

    /// Create a Parse error, truncating very long inputs
    pub fn parse(target: ValueType, input: &str, reason: impl ToString) -> Self {
        const MAX_ECHO: usize = 64;
        let input = match input.char_indices().nth(MAX_ECHO) {
            Some((end, _)) => format!("{}...", &input[..end]),
            None => input.to_string(),
        };
        Error::Parse {
            target,
            input,
            reason: reason.to_string(),
        }
    }

    /// Check if this error reports a missing field or index
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::FieldNotFound { .. } | Error::IndexOutOfRange { .. }
        )
    }
}

/// Decoding failures for the binary encodings
///
/// Every variant carries the byte offset at which decoding stopped, so
/// callers recovering a damaged record can report where the damage starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before the value was complete
    #[error("truncated input at offset {offset}")]
    Truncated {
        /// Offset where more bytes were needed
        offset: usize,
    },

    /// Type tag not recognized by the codec
    #[error("unknown type tag 0x{tag:02x} at offset {offset}")]
    UnknownTag {
        /// The tag byte
        tag: u8,
        /// Offset of the tag
        offset: usize,
    },

    /// Text payload is not valid UTF-8
    #[error("invalid UTF-8 text at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the text payload
        offset: usize,
    },

    /// A byte that is not allowed at this position
    #[error("unexpected byte 0x{byte:02x} at offset {offset}, expected {expected}")]
    UnexpectedByte {
        /// The byte found
        byte: u8,
        /// Offset of the byte
        offset: usize,
        /// What the decoder was looking for
        expected: &'static str,
    },

    /// Bytes left over after a complete value
    #[error("trailing bytes after value at offset {offset}")]
    TrailingBytes {
        /// Offset of the first unconsumed byte
        offset: usize,
    },

    /// Nested arrays/documents deeper than the configured maximum
    #[error("nesting depth {depth} exceeds maximum of {max}")]
    NestingTooDeep {
        /// Depth reached
        depth: usize,
        /// Configured maximum
        max: usize,
    },
}

impl DecodeError {
    /// Offset at which decoding failed
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::Truncated { offset }
            | DecodeError::UnknownTag { offset, .. }
            | DecodeError::InvalidUtf8 { offset }
            | DecodeError::UnexpectedByte { offset, .. }
            | DecodeError::TrailingBytes { offset } => Some(*offset),
            DecodeError::NestingTooDeep { .. } => None,
        }
    }

    /// Check if more input could complete the value
    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::Truncated { .. })
    }
}
