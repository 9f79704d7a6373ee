//! Array capability trait and the owned ValueBuffer

use crate::compare;
use crate::document::apply_leaf;
use crate::error::{Error, Result};
use crate::path::{Path, PathFragment};
use crate::Value;
use std::cmp::Ordering;
use std::fmt;

/// Capability contract for array values
///
/// Implementations must call the callback for every element, in index
/// order, and stop at the first error the callback returns.
pub trait Array: fmt::Debug + Send + Sync {
    /// Visit every element with its index
    fn iterate(&self, f: &mut dyn FnMut(usize, &Value) -> Result<()>) -> Result<()>;

    /// Value at `index`
    ///
    /// Returns [`Error::IndexOutOfRange`] past the end.
    fn get_by_index(&self, index: usize) -> Result<Value>;

    /// Number of elements, when known without iterating
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

// ============================================================================
// Helpers over any Array
// ============================================================================

/// Number of elements
pub fn array_len(array: &dyn Array) -> Result<usize> {
    if let Some(n) = array.len_hint() {
        return Ok(n);
    }
    let mut n = 0;
    array.iterate(&mut |_, _| {
        n += 1;
        Ok(())
    })?;
    Ok(n)
}

/// Check whether an array has no elements
pub fn array_is_empty(array: &dyn Array) -> Result<bool> {
    Ok(array_len(array)? == 0)
}

/// Clone every element in index order
pub fn collect_values(array: &dyn Array) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(array.len_hint().unwrap_or(0));
    array.iterate(&mut |_, v| {
        out.push(v.clone());
        Ok(())
    })?;
    Ok(out)
}

/// Check whether any element compares equal to `value`
///
/// Uses comparator equality, so `Integer(1)` matches `Double(1.0)`.
pub fn array_contains(array: &dyn Array, value: &Value) -> Result<bool> {
    let mut found = false;
    let mut first_err = None;
    array.iterate(&mut |_, v| {
        if found || first_err.is_some() {
            return Ok(());
        }
        match compare::is_equal(v, value) {
            Ok(true) => found = true,
            Ok(false) => {}
            Err(e) => first_err = Some(e),
        }
        Ok(())
    })?;
    match first_err {
        Some(e) => Err(e),
        None => Ok(found),
    }
}

/// Return the elements of `array` sorted by the comparator
///
/// The sort is stable: comparator-equal elements keep their relative order.
pub fn sort_array(array: &dyn Array) -> Result<ValueBuffer> {
    let mut vb = ValueBuffer::from(collect_values(array)?);
    vb.sort()?;
    Ok(vb)
}

// ============================================================================
// ValueBuffer
// ============================================================================

/// Owned, mutable array
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueBuffer {
    values: Vec<Value>,
}

impl ValueBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        ValueBuffer {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append a value
    pub fn append(&mut self, value: impl Into<Value>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    /// Builder form of [`ValueBuffer::append`]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.append(value);
        self
    }

    /// Replace the value at `index`
    pub fn replace(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index })?;
        *slot = value.into();
        Ok(())
    }

    /// Remove the value at `index`, shifting later values down
    pub fn remove(&mut self, index: usize) -> Result<Value> {
        if index >= self.values.len() {
            return Err(Error::IndexOutOfRange { index });
        }
        Ok(self.values.remove(index))
    }

    /// Borrow the value at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the buffer has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over values in order
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Borrow the values as a slice
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Remove every value, keeping the allocation
    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// Consume the buffer, returning its values
    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }

    /// Append every element of `array` without copying nested composites
    pub fn scan_array(&mut self, array: &dyn Array) -> Result<()> {
        array.iterate(&mut |_, v| {
            self.values.push(v.clone());
            Ok(())
        })
    }

    /// Deep copy any array into an owned buffer
    pub fn copy_from(array: &dyn Array) -> Result<ValueBuffer> {
        let mut vb = ValueBuffer::with_capacity(array.len_hint().unwrap_or(0));
        array.iterate(&mut |_, v| {
            vb.values.push(v.deep_copy()?);
            Ok(())
        })?;
        Ok(vb)
    }

    /// Rewrite every scalar leaf in place
    ///
    /// Same contract as [`FieldBuffer::apply`](crate::FieldBuffer::apply); paths start with an index.
    pub fn apply<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&Path, &Value) -> Result<Value>,
    {
        let mut path = Path::root();
        apply_values(self, &mut path, &mut f)
    }

    /// Sort in place by the comparator (stable)
    ///
    /// The comparator can fail on composites whose iteration fails; the
    /// first such error is returned and the element order is unspecified.
    pub fn sort(&mut self) -> Result<()> {
        let mut err = None;
        self.values.sort_by(|a, b| match compare::compare(a, b) {
            Ok(ord) => ord,
            Err(e) => {
                err.get_or_insert(e);
                Ordering::Equal
            }
        });
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub(crate) fn apply_values(
    vb: &mut ValueBuffer,
    path: &mut Path,
    f: &mut dyn FnMut(&Path, &Value) -> Result<Value>,
) -> Result<()> {
    for (i, value) in vb.values.iter_mut().enumerate() {
        path.push(PathFragment::Index(i));
        let result = apply_leaf(value, path, f);
        path.pop();
        result?;
    }
    Ok(())
}

impl Array for ValueBuffer {
    fn iterate(&self, f: &mut dyn FnMut(usize, &Value) -> Result<()>) -> Result<()> {
        for (i, v) in self.values.iter().enumerate() {
            f(i, v)?;
        }
        Ok(())
    }

    fn get_by_index(&self, index: usize) -> Result<Value> {
        self.values
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfRange { index })
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.values.len())
    }
}

impl From<Vec<Value>> for ValueBuffer {
    fn from(values: Vec<Value>) -> Self {
        ValueBuffer { values }
    }
}

impl<V: Into<Value>> FromIterator<V> for ValueBuffer {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        ValueBuffer {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for ValueBuffer {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueBuffer {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
