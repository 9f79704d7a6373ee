//! Arithmetic and bitwise operators over values
//!
//! Operand rules, applied in order:
//! 1. Any Null operand yields Null.
//! 2. Duration with Duration supports Add and Sub and stays a Duration.
//! 3. Any other Duration, Array or Document operand is a type mismatch.
//! 4. Text and Blob operands yield Null.
//! 5. Bools promote to integers (`true = 1`). Two integers stay integers,
//!    except when Add, Sub, Mul or Div overflow, which yields a Double.
//!    Any Double operand makes the operation floating point.
//!
//! Division or modulo by zero yields Null. Bitwise operators on doubles
//! truncate both operands to integers and yield an Integer.

use crate::error::{Error, Result};
use crate::Value;
use std::fmt;

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `&`
    BitwiseAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
}

impl ArithmeticOp {
    /// Operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
            ArithmeticOp::BitwiseAnd => "&",
            ArithmeticOp::BitwiseOr => "|",
            ArithmeticOp::BitwiseXor => "^",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Apply `op` to two values
pub fn calculate(a: &Value, b: &Value, op: ArithmeticOp) -> Result<Value> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }

    match (a, b) {
        (Value::Duration(x), Value::Duration(y)) => return durations(*x, *y, op),
        (Value::Duration(_) | Value::Array(_) | Value::Document(_), _)
        | (_, Value::Duration(_) | Value::Array(_) | Value::Document(_)) => {
            return Err(Error::TypeMismatch(format!(
                "cannot compute {} {} {}",
                a.type_name(),
                op,
                b.type_name()
            )));
        }
        (Value::Text(_) | Value::Blob(_), _) | (_, Value::Text(_) | Value::Blob(_)) => {
            return Ok(Value::Null);
        }
        _ => {}
    }

    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => Ok(integers(x, y, op)),
        _ => Ok(doubles(as_double(a), as_double(b), op)),
    }
}

fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Integer(i) => Some(*i),
        _ => None,
    }
}

fn as_double(v: &Value) -> f64 {
    match v {
        Value::Double(f) => *f,
        other => as_integer(other).unwrap_or(0) as f64,
    }
}

fn integers(x: i64, y: i64, op: ArithmeticOp) -> Value {
    let promote = |f: f64| Value::Double(f);
    match op {
        ArithmeticOp::Add => x
            .checked_add(y)
            .map_or_else(|| promote(x as f64 + y as f64), Value::Integer),
        ArithmeticOp::Sub => x
            .checked_sub(y)
            .map_or_else(|| promote(x as f64 - y as f64), Value::Integer),
        ArithmeticOp::Mul => x
            .checked_mul(y)
            .map_or_else(|| promote(x as f64 * y as f64), Value::Integer),
        ArithmeticOp::Div => {
            if y == 0 {
                return Value::Null;
            }
            // Only i64::MIN / -1 overflows
            x.checked_div(y)
                .map_or_else(|| promote(-(x as f64)), Value::Integer)
        }
        ArithmeticOp::Mod => {
            if y == 0 {
                return Value::Null;
            }
            Value::Integer(x.wrapping_rem(y))
        }
        ArithmeticOp::BitwiseAnd => Value::Integer(x & y),
        ArithmeticOp::BitwiseOr => Value::Integer(x | y),
        ArithmeticOp::BitwiseXor => Value::Integer(x ^ y),
    }
}

fn doubles(x: f64, y: f64, op: ArithmeticOp) -> Value {
    match op {
        ArithmeticOp::Add => Value::Double(x + y),
        ArithmeticOp::Sub => Value::Double(x - y),
        ArithmeticOp::Mul => Value::Double(x * y),
        ArithmeticOp::Div => {
            if y == 0.0 {
                return Value::Null;
            }
            Value::Double(x / y)
        }
        ArithmeticOp::Mod => {
            let r = x % y;
            if r.is_nan() {
                return Value::Null;
            }
            Value::Double(r)
        }
        ArithmeticOp::BitwiseAnd => Value::Integer((x as i64) & (y as i64)),
        ArithmeticOp::BitwiseOr => Value::Integer((x as i64) | (y as i64)),
        ArithmeticOp::BitwiseXor => Value::Integer((x as i64) ^ (y as i64)),
    }
}

fn durations(x: i64, y: i64, op: ArithmeticOp) -> Result<Value> {
    let result = match op {
        ArithmeticOp::Add => x.checked_add(y),
        ArithmeticOp::Sub => x.checked_sub(y),
        _ => {
            return Err(Error::TypeMismatch(format!(
                "cannot compute duration {} duration",
                op
            )))
        }
    };
    result
        .map(Value::Duration)
        .ok_or_else(|| Error::Overflow(format!("duration {} duration overflows", op)))
}

impl Value {
    /// `self + other`
    pub fn add(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::Add)
    }

    /// `self - other`
    pub fn sub(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::Sub)
    }

    /// `self * other`
    pub fn mul(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::Mul)
    }

    /// `self / other`
    pub fn div(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::Div)
    }

    /// `self % other`
    pub fn rem(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::Mod)
    }

    /// `self & other`
    pub fn bitwise_and(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::BitwiseAnd)
    }

    /// `self | other`
    pub fn bitwise_or(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::BitwiseOr)
    }

    /// `self ^ other`
    pub fn bitwise_xor(&self, other: &Value) -> Result<Value> {
        calculate(self, other, ArithmeticOp::BitwiseXor)
    }
}
