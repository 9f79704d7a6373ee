//! Total order over values
//!
//! Every predicate in this module is derived from [`compare`]; nothing
//! orders values independently of it.
//!
//! ## Ordering
//!
//! Values first order by family:
//! `Null < Bool/Integer/Double < Duration < Text/Blob < Array < Document`.
//!
//! Within a family:
//! - Numbers (bools count as 0/1) compare as `f64`. NaN equals NaN and sorts
//!   below every other number; `-0.0` equals `0.0`. Integers beyond 2^53
//!   compare by their nearest double, so distinct large integers can compare
//!   equal. The order stays consistent, which is what indexes need.
//! - Durations compare by nanosecond count.
//! - Text and blobs compare lexicographically by raw bytes.
//! - Arrays compare element by element; a strict prefix is lesser.
//! - Documents compare field by field in field-name order (first occurrence
//!   of a duplicated name wins). A field present on only one side makes that
//!   side greater; a document that runs out of fields first is lesser.
//!   Documents with different field sets are therefore ordered, never an
//!   error, and equal only with identical field sets and equal values.
//!
//! The order-preserving encoding reproduces exactly this order byte-wise.

use crate::array::collect_values;
use crate::document::sorted_fields;
use crate::error::Result;
use crate::types::Family;
use crate::Value;
use std::cmp::Ordering;

/// Compare two values
///
/// Only fails when iterating a lazily backed array or document fails.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering> {
    let (fa, fb) = (a.value_type().family(), b.value_type().family());
    if fa != fb {
        return Ok(fa.cmp(&fb));
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ok(Ordering::Equal),
        (Value::Duration(x), Value::Duration(y)) => Ok(x.cmp(y)),
        (Value::Array(x), Value::Array(y)) => {
            compare_sequences(&collect_values(x.as_ref())?, &collect_values(y.as_ref())?)
        }
        (Value::Document(x), Value::Document(y)) => compare_documents(
            &sorted_fields(x.as_ref())?,
            &sorted_fields(y.as_ref())?,
        ),
        _ => match fa {
            Family::Numeric => Ok(compare_f64(numeric(a), numeric(b))),
            Family::Bytes => Ok(bytes(a).cmp(bytes(b))),
            // Same family implies one of the arms above
            _ => Ok(Ordering::Equal),
        },
    }
}

/// Numeric view of a Bool, Integer or Double
pub(crate) fn numeric(v: &Value) -> f64 {
    match v {
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Integer(i) => *i as f64,
        Value::Double(f) => *f,
        _ => f64::NAN,
    }
}

fn bytes(v: &Value) -> &[u8] {
    match v {
        Value::Text(s) => s.as_bytes(),
        Value::Blob(b) => b,
        _ => &[],
    }
}

/// Total order on doubles: NaN first (all NaNs equal), then IEEE order
/// with `-0.0 == 0.0`
pub fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn compare_sequences(a: &[Value], b: &[Value]) -> Result<Ordering> {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = compare(x, y)?;
        if ord != Ordering::Equal {
            return Ok(ord);
        }
    }
    Ok(a.len().cmp(&b.len()))
}

fn compare_documents(a: &[(String, Value)], b: &[(String, Value)]) -> Result<Ordering> {
    let (mut i, mut j) = (0, 0);
    loop {
        match (a.get(i), b.get(j)) {
            (None, None) => return Ok(Ordering::Equal),
            (None, Some(_)) => return Ok(Ordering::Less),
            (Some(_), None) => return Ok(Ordering::Greater),
            (Some((ln, lv)), Some((rn, rv))) => match ln.cmp(rn) {
                Ordering::Equal => {
                    let ord = compare(lv, rv)?;
                    if ord != Ordering::Equal {
                        return Ok(ord);
                    }
                    i += 1;
                    j += 1;
                }
                // Left holds a field the right lacks
                Ordering::Less => return Ok(Ordering::Greater),
                Ordering::Greater => return Ok(Ordering::Less),
            },
        }
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// `a = b`
pub fn is_equal(a: &Value, b: &Value) -> Result<bool> {
    Ok(compare(a, b)? == Ordering::Equal)
}

/// `a != b`
pub fn is_not_equal(a: &Value, b: &Value) -> Result<bool> {
    Ok(compare(a, b)? != Ordering::Equal)
}

/// `a > b`
pub fn is_greater_than(a: &Value, b: &Value) -> Result<bool> {
    Ok(compare(a, b)? == Ordering::Greater)
}

/// `a >= b`
pub fn is_greater_than_or_equal(a: &Value, b: &Value) -> Result<bool> {
    Ok(compare(a, b)? != Ordering::Less)
}

/// `a < b`
pub fn is_less_than(a: &Value, b: &Value) -> Result<bool> {
    Ok(compare(a, b)? == Ordering::Less)
}

/// `a <= b`
pub fn is_less_than_or_equal(a: &Value, b: &Value) -> Result<bool> {
    Ok(compare(a, b)? != Ordering::Greater)
}
