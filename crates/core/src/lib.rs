//! Core types and traits for the document data model
//!
//! This crate defines the value model shared by the query and storage layers:
//! - Value: closed union of every storable type
//! - ValueType: type discriminators and comparison families
//! - Document / Array: capability traits, with owned FieldBuffer / ValueBuffer
//! - cast / arithmetic: conversion and operator rules
//! - compare: the total order over values and the predicates derived from it
//! - Path: field / index navigation with copy-on-write set and delete
//! - diff: structural diff and patch application
//! - json: JSON boundary, lazy JSON views and serde_json adapters
//! - Limits and Error: configuration and the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arithmetic;
pub mod array;
pub mod cast;
pub mod compare;
pub mod diff;
pub mod document;
pub mod duration;
pub mod error;
pub mod json;
pub mod limits;
pub mod path;
pub mod types;
pub mod value;

pub use arithmetic::{calculate, ArithmeticOp};
pub use array::{array_contains, array_len, sort_array, Array, ValueBuffer};
pub use cast::cast;
pub use compare::{
    compare, is_equal, is_greater_than, is_greater_than_or_equal, is_less_than,
    is_less_than_or_equal, is_not_equal,
};
pub use diff::{apply_ops, diff, Op, OpKind};
pub use document::{document_len, fields, Document, FieldBuffer};
pub use error::{DecodeError, Error, Result};
pub use json::{from_json_str, to_json_string, JsonArray, JsonDocument};
pub use limits::{LimitError, Limits};
pub use path::{Path, PathFragment, PathParseError};
pub use types::{Family, ValueType, ALL_VALUE_TYPES};
pub use value::Value;
