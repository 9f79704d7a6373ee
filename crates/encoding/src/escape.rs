//! Escaped byte strings and the shared input cursor
//!
//! Both codecs store variable-length bytes without a length header, so a
//! reader can find the end of a string by scanning forward. Two flavours:
//!
//! ```text
//! plain:      0x00 -> 0x00 0xFF        terminator 0x00 0x01
//! inverted:   b -> !b, 0xFF -> 0xFF 0x00   terminator 0xFF 0xFF
//! ```
//!
//! The plain form sorts like the raw bytes and no encoding is a prefix of
//! another. The inverted form sorts in reverse, which the order-preserving
//! codec uses for document field names.

use docmodel_core::DecodeError;

/// Escape byte in the plain form
const ESCAPE: u8 = 0x00;
/// Follows ESCAPE to stand for a literal 0x00
const ESCAPED_ZERO: u8 = 0xFF;
/// Follows ESCAPE to end the string
const TERMINATOR: u8 = 0x01;

const INV_ESCAPE: u8 = 0xFF;
const INV_ESCAPED: u8 = 0x00;
const INV_TERMINATOR: u8 = 0xFF;

// ============================================================================
// Cursor
// ============================================================================

/// Forward-only cursor over encoded input
///
/// Offsets reported in errors are relative to the start of the slice the
/// cursor was created over.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a [u8]) -> Self {
        Cursor { input, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    pub(crate) fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Move forward to `pos`, which a scan of [`input`](Self::input) found
    pub(crate) fn advance_to(&mut self, pos: usize) {
        debug_assert!(pos >= self.pos && pos <= self.input.len());
        self.pos = pos;
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    pub(crate) fn byte_at(&self, offset: usize) -> Option<u8> {
        self.input.get(offset).copied()
    }

    pub(crate) fn byte(&mut self) -> Result<u8, DecodeError> {
        let b = self.peek().ok_or(DecodeError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                offset: self.input.len(),
            });
        }
        let out = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn expect(&mut self, want: u8, expected: &'static str) -> Result<(), DecodeError> {
        let offset = self.pos;
        let byte = self.byte()?;
        if byte != want {
            return Err(DecodeError::UnexpectedByte {
                byte,
                offset,
                expected,
            });
        }
        Ok(())
    }

    pub(crate) fn finish(&self) -> Result<(), DecodeError> {
        if self.remaining() > 0 {
            return Err(DecodeError::TrailingBytes { offset: self.pos });
        }
        Ok(())
    }
}

// ============================================================================
// Plain form
// ============================================================================

/// Append `bytes` in escaped form followed by the terminator
pub fn write_escaped(out: &mut Vec<u8>, bytes: &[u8]) {
    out.reserve(bytes.len() + 2);
    for &b in bytes {
        out.push(b);
        if b == ESCAPE {
            out.push(ESCAPED_ZERO);
        }
    }
    out.push(ESCAPE);
    out.push(TERMINATOR);
}

pub(crate) fn read_escaped(cursor: &mut Cursor<'_>) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    loop {
        let b = cursor.byte()?;
        if b != ESCAPE {
            out.push(b);
            continue;
        }
        let offset = cursor.position();
        match cursor.byte()? {
            ESCAPED_ZERO => out.push(0x00),
            TERMINATOR => return Ok(out),
            byte => {
                return Err(DecodeError::UnexpectedByte {
                    byte,
                    offset,
                    expected: "escaped zero or terminator",
                })
            }
        }
    }
}

/// Progress of a scan over an escaped string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    /// The string, terminator included, ends just before this offset
    Complete(usize),
    /// Input ran out; scanning can resume from this offset
    Partial(usize),
}

/// Find the end of an escaped string that starts at `from`
///
/// A partial result never points past an escape byte whose second half is
/// missing, so resuming from it loses nothing.
pub(crate) fn scan_escaped(input: &[u8], from: usize) -> Result<Scan, DecodeError> {
    let mut pos = from;
    loop {
        let rest = input.get(pos..).unwrap_or(&[]);
        let at = match rest.iter().position(|&b| b == ESCAPE) {
            Some(i) => pos + i,
            None => return Ok(Scan::Partial(input.len())),
        };
        match input.get(at + 1) {
            None => return Ok(Scan::Partial(at)),
            Some(&ESCAPED_ZERO) => pos = at + 2,
            Some(&TERMINATOR) => return Ok(Scan::Complete(at + 2)),
            Some(&byte) => {
                return Err(DecodeError::UnexpectedByte {
                    byte,
                    offset: at + 1,
                    expected: "escaped zero or terminator",
                })
            }
        }
    }
}

// ============================================================================
// Inverted form
// ============================================================================

/// Append `bytes` complemented and escaped, so larger inputs sort first
pub fn write_escaped_inverted(out: &mut Vec<u8>, bytes: &[u8]) {
    out.reserve(bytes.len() + 2);
    for &b in bytes {
        let c = !b;
        out.push(c);
        if c == INV_ESCAPE {
            out.push(INV_ESCAPED);
        }
    }
    out.push(INV_ESCAPE);
    out.push(INV_TERMINATOR);
}

pub(crate) fn read_escaped_inverted(cursor: &mut Cursor<'_>) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    loop {
        let c = cursor.byte()?;
        if c != INV_ESCAPE {
            out.push(!c);
            continue;
        }
        let offset = cursor.position();
        match cursor.byte()? {
            INV_ESCAPED => out.push(0x00),
            INV_TERMINATOR => return Ok(out),
            byte => {
                return Err(DecodeError::UnexpectedByte {
                    byte,
                    offset,
                    expected: "inverted escape or terminator",
                })
            }
        }
    }
}
