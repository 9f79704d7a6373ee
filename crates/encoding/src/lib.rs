//! Binary encodings for document model values
//!
//! Two independent formats:
//! - [`stream`]: self-describing, tag-prefixed and delimiter-terminated,
//!   decodable incrementally from partial buffers
//! - [`ordered`]: order-preserving keys whose byte order matches the
//!   value comparator
//!
//! Both decoders treat input as untrusted: malformed bytes produce a typed
//! [`DecodeError`] and nesting depth is bounded by [`Limits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod escape;
pub mod ordered;
pub mod stream;

pub use docmodel_core::{DecodeError, Limits};
pub use escape::{write_escaped, write_escaped_inverted};
pub use stream::{value_len, EncodedArray, EncodedDocument, StreamDecoder};
