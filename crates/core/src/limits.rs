//! Size limits for values
//!
//! This module defines configurable size limits enforced when validating
//! values and when decoding untrusted bytes. Violations result in
//! [`Error::LimitExceeded`](crate::Error::LimitExceeded).
//!
//! Custom limits can be passed to the decoders; everything else uses
//! [`Limits::default`].

use crate::error::Result;
use crate::Value;
use thiserror::Error;

/// Size limits for values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting depth of arrays and documents (default: 128)
    pub max_nesting_depth: usize,

    /// Maximum text or blob length in bytes (default: 16MB)
    pub max_string_bytes: usize,

    /// Maximum array length (default: 1M elements)
    pub max_array_len: usize,

    /// Maximum document fields (default: 1M fields)
    pub max_document_fields: usize,

    /// Maximum encoded value size in bytes (default: 32MB)
    pub max_encoded_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_nesting_depth: 128,
            max_string_bytes: 16 * 1024 * 1024,  // 16MB
            max_array_len: 1_000_000,
            max_document_fields: 1_000_000,
            max_encoded_bytes: 32 * 1024 * 1024, // 32MB
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    ///
    /// This is useful for unit tests that need to test limit enforcement
    /// without creating extremely large values.
    pub fn with_small_limits() -> Self {
        Limits {
            max_nesting_depth: 10,
            max_string_bytes: 1000,
            max_array_len: 100,
            max_document_fields: 100,
            max_encoded_bytes: 2000,
        }
    }

    /// Validate a value against size limits
    ///
    /// This validates:
    /// - Text and blob length
    /// - Array length
    /// - Document field count
    /// - Nesting depth (recursive)
    ///
    /// Does NOT validate encoded size; see [`Limits::validate_encoded_len`].
    /// Iteration errors from lazily parsed composites propagate unchanged.
    pub fn validate_value(&self, value: &Value) -> Result<()> {
        self.validate_value_impl(value, 0)
    }

    fn validate_value_impl(&self, value: &Value, depth: usize) -> Result<()> {
        self.validate_depth(depth)?;

        match value {
            Value::Null
            | Value::Bool(_)
            | Value::Integer(_)
            | Value::Double(_)
            | Value::Duration(_) => Ok(()),

            Value::Text(s) => self.validate_string_len(s.len(), "text_too_long"),
            Value::Blob(b) => self.validate_string_len(b.len(), "blob_too_long"),

            Value::Array(arr) => {
                let mut count = 0usize;
                arr.iterate(&mut |_, v| {
                    count += 1;
                    if count > self.max_array_len {
                        return Err(LimitError::ValueTooLarge {
                            reason: "array_too_long".to_string(),
                            actual: count,
                            max: self.max_array_len,
                        }
                        .into());
                    }
                    self.validate_value_impl(v, depth + 1)
                })
            }

            Value::Document(doc) => {
                let mut count = 0usize;
                doc.iterate(&mut |_, v| {
                    count += 1;
                    if count > self.max_document_fields {
                        return Err(LimitError::ValueTooLarge {
                            reason: "document_too_many_fields".to_string(),
                            actual: count,
                            max: self.max_document_fields,
                        }
                        .into());
                    }
                    self.validate_value_impl(v, depth + 1)
                })
            }
        }
    }

    /// Validate a nesting depth
    pub fn validate_depth(&self, depth: usize) -> std::result::Result<(), LimitError> {
        if depth > self.max_nesting_depth {
            return Err(LimitError::NestingTooDeep {
                actual: depth,
                max: self.max_nesting_depth,
            });
        }
        Ok(())
    }

    /// Validate an encoded value length
    pub fn validate_encoded_len(&self, len: usize) -> std::result::Result<(), LimitError> {
        if len > self.max_encoded_bytes {
            return Err(LimitError::ValueTooLarge {
                reason: "encoding_too_large".to_string(),
                actual: len,
                max: self.max_encoded_bytes,
            });
        }
        Ok(())
    }

    fn validate_string_len(
        &self,
        len: usize,
        reason: &str,
    ) -> std::result::Result<(), crate::Error> {
        if len > self.max_string_bytes {
            return Err(LimitError::ValueTooLarge {
                reason: reason.to_string(),
                actual: len,
                max: self.max_string_bytes,
            }
            .into());
        }
        Ok(())
    }
}

/// Limit validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Value exceeds size limits
    #[error("value too large ({reason}): {actual} exceeds maximum {max}")]
    ValueTooLarge {
        /// Reason code for the violation
        reason: String,
        /// Actual size
        actual: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Value nesting exceeds maximum depth
    #[error("nesting too deep: {actual} levels exceeds maximum {max}")]
    NestingTooDeep {
        /// Actual nesting depth
        actual: usize,
        /// Maximum allowed depth
        max: usize,
    },
}

impl LimitError {
    /// Short machine-readable reason code
    pub fn reason_code(&self) -> &str {
        match self {
            LimitError::ValueTooLarge { reason, .. } => reason,
            LimitError::NestingTooDeep { .. } => "nesting_too_deep",
        }
    }
}
