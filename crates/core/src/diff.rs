//! Structural diff between documents and patch application
//!
//! [`diff`] walks two documents in field-name order and emits the Set and
//! Delete operations that turn the first into the second. The output order
//! follows that traversal, so the same pair of documents always yields the
//! same list. [`apply_ops`] replays such a list against a root value.

use crate::array::{array_len, collect_values, Array, ValueBuffer};
use crate::compare;
use crate::document::{sorted_fields, Document};
use crate::error::Result;
use crate::path::{self, Path, PathFragment};
use crate::Value;
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Kind of diff operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Store `value` at `path`
    Set,
    /// Remove the value at `path`; `value` holds the removed value
    Delete,
}

/// One step of a diff
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    /// What to do
    pub kind: OpKind,
    /// Where to do it
    pub path: Path,
    /// New value for Set, previous value for Delete
    pub value: Value,
}

impl Op {
    /// Create a Set operation
    pub fn set(path: Path, value: Value) -> Self {
        Op {
            kind: OpKind::Set,
            path,
            value,
        }
    }

    /// Create a Delete operation carrying the removed value
    pub fn delete(path: Path, old: Value) -> Self {
        Op {
            kind: OpKind::Delete,
            path,
            value: old,
        }
    }

    /// Check if this is a Set
    pub fn is_set(&self) -> bool {
        self.kind == OpKind::Set
    }

    /// Check if this is a Delete
    pub fn is_delete(&self) -> bool {
        self.kind == OpKind::Delete
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Set => write!(f, "SET {} = {}", self.path, self.value),
            OpKind::Delete => write!(f, "DELETE {}", self.path),
        }
    }
}

// =============================================================================
// Diff
// =============================================================================

/// Operations that turn `d1` into `d2`
///
/// ```
/// use docmodel_core::{diff, from_json_str, Op, Path, Value};
///
/// let a = from_json_str(r#"{"a": {"b": [1, 2, 3]}}"#).unwrap();
/// let b = from_json_str(r#"{"a": {"b": [1, 2, 4]}}"#).unwrap();
/// let ops = diff(a.as_document().unwrap(), b.as_document().unwrap()).unwrap();
/// assert_eq!(ops, vec![Op::set("a.b[2]".parse().unwrap(), Value::Integer(4))]);
/// ```
pub fn diff(d1: &dyn Document, d2: &dyn Document) -> Result<Vec<Op>> {
    let mut ops = Vec::new();
    let mut path = Path::root();
    diff_documents(&mut path, d1, d2, &mut ops)?;
    debug!(ops = ops.len(), "computed document diff");
    Ok(ops)
}

fn diff_documents(
    path: &mut Path,
    d1: &dyn Document,
    d2: &dyn Document,
    ops: &mut Vec<Op>,
) -> Result<()> {
    let left = sorted_fields(d1)?;
    let right = sorted_fields(d2)?;
    let (mut i, mut j) = (0, 0);

    while i < left.len() || j < right.len() {
        let order = match (left.get(i), right.get(j)) {
            (Some((ln, _)), Some((rn, _))) => ln.cmp(rn),
            (Some(_), None) => Ordering::Less,
            _ => Ordering::Greater,
        };
        match order {
            Ordering::Less => {
                let (name, old) = &left[i];
                ops.push(Op::delete(path.extend_field(name.as_str()), old.clone()));
                i += 1;
            }
            Ordering::Greater => {
                let (name, new) = &right[j];
                ops.push(Op::set(path.extend_field(name.as_str()), new.clone()));
                j += 1;
            }
            Ordering::Equal => {
                path.push(PathFragment::Field(left[i].0.clone()));
                let result = diff_values(path, &left[i].1, &right[j].1, ops);
                path.pop();
                result?;
                i += 1;
                j += 1;
            }
        }
    }
    Ok(())
}

fn diff_arrays(path: &mut Path, a1: &dyn Array, a2: &dyn Array, ops: &mut Vec<Op>) -> Result<()> {
    let left = collect_values(a1)?;
    let right = collect_values(a2)?;

    for idx in 0..left.len().max(right.len()) {
        match (left.get(idx), right.get(idx)) {
            (Some(old), None) => ops.push(Op::delete(path.extend_index(idx), old.clone())),
            (None, Some(new)) => ops.push(Op::set(path.extend_index(idx), new.clone())),
            (Some(old), Some(new)) => {
                path.push(PathFragment::Index(idx));
                let result = diff_values(path, old, new, ops);
                path.pop();
                result?;
            }
            (None, None) => {}
        }
    }
    Ok(())
}

fn diff_values(path: &mut Path, old: &Value, new: &Value, ops: &mut Vec<Op>) -> Result<()> {
    match (old, new) {
        (Value::Document(a), Value::Document(b)) => diff_documents(path, a.as_ref(), b.as_ref(), ops),
        (Value::Array(a), Value::Array(b)) => diff_arrays(path, a.as_ref(), b.as_ref(), ops),
        _ => {
            if old.value_type() != new.value_type() || !compare::is_equal(old, new)? {
                ops.push(Op::set(path.clone(), new.clone()));
            }
            Ok(())
        }
    }
}

// =============================================================================
// Patch application
// =============================================================================

/// Apply operations in order, returning the new root
///
/// Each operation goes through [`path::set`] / [`path::delete`], so `root`
/// is never modified. Two extensions make diff output replayable:
/// - a Set at an array index equal to the array length appends;
/// - a run of consecutive Deletes of indexes in the same array is applied
///   from the highest index down, so every index in the run refers to the
///   array as it was before the run.
///
/// On error, nothing is returned; earlier operations are not observable.
pub fn apply_ops(root: &Value, ops: &[Op]) -> Result<Value> {
    let mut current = root.clone();
    let mut i = 0;

    while i < ops.len() {
        let op = &ops[i];
        match op.kind {
            OpKind::Set => {
                current = apply_set(&current, &op.path, op.value.clone())?;
                i += 1;
            }
            OpKind::Delete => {
                let run = index_delete_run(&ops[i..]);
                if run > 1 {
                    let mut batch: Vec<&Op> = ops[i..i + run].iter().collect();
                    batch.sort_by(|a, b| b.path.cmp(&a.path));
                    for op in batch {
                        current = path::delete(&current, &op.path)?;
                    }
                    i += run;
                } else {
                    current = path::delete(&current, &op.path)?;
                    i += 1;
                }
            }
        }
    }

    debug!(ops = ops.len(), "applied operations");
    Ok(current)
}

/// Length of the leading run of Deletes that target indexes of one array
fn index_delete_run(ops: &[Op]) -> usize {
    let parent_of = |op: &Op| match (op.kind, op.path.last_fragment()) {
        (OpKind::Delete, Some(PathFragment::Index(_))) => op.path.parent(),
        _ => None,
    };
    let first = match ops.first().and_then(parent_of) {
        Some(parent) => parent,
        None => return 0,
    };
    ops.iter()
        .take_while(|op| parent_of(op).as_ref() == Some(&first))
        .count()
}

fn apply_set(root: &Value, target: &Path, value: Value) -> Result<Value> {
    if let (Some(PathFragment::Index(idx)), Some(parent)) = (target.last_fragment(), target.parent()) {
        if let Value::Array(a) = path::get(root, &parent)? {
            if array_len(a.as_ref())? == *idx {
                let mut vb = ValueBuffer::new();
                vb.scan_array(a.as_ref())?;
                vb.append(value);
                return path::set(root, &parent, Value::from(vb));
            }
        }
    }
    path::set(root, target, value)
}
