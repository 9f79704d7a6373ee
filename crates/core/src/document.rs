//! Document capability trait and the owned FieldBuffer
//!
//! A document is an ordered, possibly duplicate-keyed sequence of named
//! values. Callers only ever see it through [`Document`]: iterate in a
//! stable order, or look up a field by name (first match wins).
//!
//! [`FieldBuffer`] is the canonical owned, mutable implementation. Any other
//! representation is frozen into one with [`FieldBuffer::copy_from`].

use crate::array::ValueBuffer;
use crate::error::{Error, Result};
use crate::path::{Path, PathFragment};
use crate::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Capability contract for document values
///
/// Implementations must call the callback for every field, in a stable
/// order, and stop at the first error the callback returns.
pub trait Document: fmt::Debug + Send + Sync {
    /// Visit every field in order
    fn iterate(&self, f: &mut dyn FnMut(&str, &Value) -> Result<()>) -> Result<()>;

    /// Value of the first field with this name
    ///
    /// Returns [`Error::FieldNotFound`] when no field matches.
    fn get_by_field(&self, field: &str) -> Result<Value>;

    /// Number of fields, when known without iterating
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

// ============================================================================
// Helpers over any Document
// ============================================================================

/// Field names in iteration order
pub fn fields(doc: &dyn Document) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(doc.len_hint().unwrap_or(0));
    doc.iterate(&mut |name, _| {
        names.push(name.to_string());
        Ok(())
    })?;
    Ok(names)
}

/// Number of fields, duplicates included
pub fn document_len(doc: &dyn Document) -> Result<usize> {
    if let Some(n) = doc.len_hint() {
        return Ok(n);
    }
    let mut n = 0;
    doc.iterate(&mut |_, _| {
        n += 1;
        Ok(())
    })?;
    Ok(n)
}

/// Check whether a document has no fields
pub fn document_is_empty(doc: &dyn Document) -> Result<bool> {
    Ok(document_len(doc)? == 0)
}

/// Clone every (name, value) pair in iteration order
pub fn collect_fields(doc: &dyn Document) -> Result<Vec<(String, Value)>> {
    let mut out = Vec::with_capacity(doc.len_hint().unwrap_or(0));
    doc.iterate(&mut |name, v| {
        out.push((name.to_string(), v.clone()));
        Ok(())
    })?;
    Ok(out)
}

/// Fields sorted by name, keeping only the first occurrence of each name
///
/// This is the canonical view used wherever documents are treated as
/// ordered by field name: comparison, diff and the order-preserving codec.
pub fn sorted_fields(doc: &dyn Document) -> Result<Vec<(String, Value)>> {
    let mut out = collect_fields(doc)?;
    // Stable sort keeps the first occurrence ahead of later duplicates.
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out.dedup_by(|later, earlier| later.0 == earlier.0);
    Ok(out)
}

// ============================================================================
// FieldBuffer
// ============================================================================

/// Owned, mutable document
///
/// Fields keep insertion order. Duplicate names are allowed; lookups,
/// replacement and deletion act on the first match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldBuffer {
    fields: Vec<(String, Value)>,
}

impl FieldBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        FieldBuffer {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a field, even if the name already exists
    pub fn add(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    /// Builder form of [`FieldBuffer::add`]
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add(field, value);
        self
    }

    /// Replace the first field with this name, or append it
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.position(&field) {
            Some(i) => self.fields[i].1 = value,
            None => self.fields.push((field, value)),
        }
    }

    /// Replace the value of the first field with this name
    pub fn replace(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let i = self
            .position(field)
            .ok_or_else(|| Error::field_not_found(field))?;
        self.fields[i].1 = value.into();
        Ok(())
    }

    /// Remove the first field with this name, returning its value
    ///
    /// The relative order of the remaining fields is preserved.
    pub fn delete(&mut self, field: &str) -> Result<Value> {
        let i = self
            .position(field)
            .ok_or_else(|| Error::field_not_found(field))?;
        Ok(self.fields.remove(i).1)
    }

    /// Borrow the value of the first field with this name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == field).map(|(_, v)| v)
    }

    /// Mutably borrow the value of the first field with this name
    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == field)
            .map(|(_, v)| v)
    }

    /// Check if a field with this name exists
    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Number of fields, duplicates included
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the buffer has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over (name, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Remove every field, keeping the allocation
    pub fn reset(&mut self) {
        self.fields.clear();
    }

    /// Consume the buffer, returning its fields
    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }

    /// Append every field of `doc` without copying nested composites
    ///
    /// Nested arrays and documents stay shared with `doc`; use
    /// [`FieldBuffer::copy_from`] before mutating them.
    pub fn scan_document(&mut self, doc: &dyn Document) -> Result<()> {
        doc.iterate(&mut |name, v| {
            self.fields.push((name.to_string(), v.clone()));
            Ok(())
        })
    }

    /// Deep copy any document into an owned buffer
    ///
    /// Nested arrays and documents are recursively materialized into
    /// [`ValueBuffer`]s and [`FieldBuffer`]s, so the result shares no state
    /// with `doc`.
    pub fn copy_from(doc: &dyn Document) -> Result<FieldBuffer> {
        let mut fb = FieldBuffer::with_capacity(doc.len_hint().unwrap_or(0));
        doc.iterate(&mut |name, v| {
            fb.fields.push((name.to_string(), v.deep_copy()?));
            Ok(())
        })?;
        Ok(fb)
    }

    /// Rewrite every scalar leaf in place
    ///
    /// Arrays and documents are recursed into (and materialized as owned
    /// buffers), never passed to `f`. The callback receives the path of the
    /// leaf relative to this buffer. On error the buffer keeps the changes
    /// made so far.
    pub fn apply<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&Path, &Value) -> Result<Value>,
    {
        let mut path = Path::root();
        apply_fields(self, &mut path, &mut f)
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|(n, _)| n == field)
    }
}

fn apply_fields(
    fb: &mut FieldBuffer,
    path: &mut Path,
    f: &mut dyn FnMut(&Path, &Value) -> Result<Value>,
) -> Result<()> {
    for (name, value) in fb.fields.iter_mut() {
        path.push(PathFragment::Field(name.clone()));
        let result = apply_leaf(value, path, f);
        path.pop();
        result?;
    }
    Ok(())
}

/// Shared leaf-rewriting walk for FieldBuffer::apply and ValueBuffer::apply
pub(crate) fn apply_leaf(
    value: &mut Value,
    path: &mut Path,
    f: &mut dyn FnMut(&Path, &Value) -> Result<Value>,
) -> Result<()> {
    match value {
        Value::Document(d) => {
            let mut fb = FieldBuffer::copy_from(d.as_ref())?;
            apply_fields(&mut fb, path, f)?;
            *value = Value::from(fb);
        }
        Value::Array(a) => {
            let mut vb = ValueBuffer::copy_from(a.as_ref())?;
            crate::array::apply_values(&mut vb, path, f)?;
            *value = Value::from(vb);
        }
        scalar => {
            *scalar = f(path, scalar)?;
        }
    }
    Ok(())
}

impl Document for FieldBuffer {
    fn iterate(&self, f: &mut dyn FnMut(&str, &Value) -> Result<()>) -> Result<()> {
        for (name, v) in &self.fields {
            f(name, v)?;
        }
        Ok(())
    }

    fn get_by_field(&self, field: &str) -> Result<Value> {
        self.get(field)
            .cloned()
            .ok_or_else(|| Error::field_not_found(field))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldBuffer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FieldBuffer {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Adapters
// ============================================================================

/// Sorted map as a document; iteration follows key order
impl Document for BTreeMap<String, Value> {
    fn iterate(&self, f: &mut dyn FnMut(&str, &Value) -> Result<()>) -> Result<()> {
        for (name, v) in self {
            f(name, v)?;
        }
        Ok(())
    }

    fn get_by_field(&self, field: &str) -> Result<Value> {
        self.get(field)
            .cloned()
            .ok_or_else(|| Error::field_not_found(field))
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.len())
    }
}
