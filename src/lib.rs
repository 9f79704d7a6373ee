//! Docmodel - value and document data model for an embedded document database
//!
//! Typed values, document and array abstractions, path navigation, a
//! structural diff engine and two binary encodings, re-exported from the
//! member crates.
//!
//! # Quick Start
//!
//! ```
//! use docmodel::{ordered, stream, Document, FieldBuffer, Path, Value};
//!
//! let doc: Value = FieldBuffer::new()
//!     .with_field("name", "alice")
//!     .with_field("tags", vec![Value::from("admin")])
//!     .into();
//!
//! let path: Path = "tags[0]".parse().unwrap();
//! assert_eq!(docmodel::path::get(&doc, &path).unwrap(), Value::from("admin"));
//!
//! let bytes = stream::encode(&doc).unwrap();
//! assert_eq!(stream::decode(&bytes).unwrap(), doc);
//!
//! let key = ordered::encode(&Value::Integer(-5)).unwrap();
//! assert!(key < ordered::encode(&Value::Integer(5)).unwrap());
//! # let _ = doc.as_document().unwrap().get_by_field("name");
//! ```
//!
//! # Layout
//!
//! - [`docmodel_core`]: Value, Document / Array, cast, arithmetic,
//!   compare, Path, diff, JSON, limits and errors
//! - [`docmodel_encoding`]: the streaming and order-preserving codecs

pub use docmodel_core::*;
pub use docmodel_encoding::{ordered, stream, EncodedArray, EncodedDocument, StreamDecoder};
