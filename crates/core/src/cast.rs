//! Type conversion between values
//!
//! [`cast`] implements the full conversion table:
//!
//! | From \ To | Bool | Integer | Double | Duration | Text | Blob | Array | Document |
//! |-----------|------|---------|--------|----------|------|------|-------|----------|
//! | Bool      | =    | 0/1     |        |          | JSON |      |       |          |
//! | Integer   | != 0 | =       | exact  |          | JSON |      |       |          |
//! | Double    |      | checked | =      |          | JSON |      |       |          |
//! | Duration  |      | nanos   |        | =        | text |      |       |          |
//! | Text      | parse| parse   | parse  | parse    | =    | base64 | JSON | JSON   |
//! | Blob      |      |         |        |          | base64 | =  |       |          |
//! | Array     |      |         |        |          | JSON |      | =     |          |
//! | Document  |      |         |        |          | JSON |      |       | =        |
//!
//! Null casts to Null for every target. Empty cells are type mismatches.
//! Blob and Text convert through standard base64 in both directions, the
//! same convention JSON uses for blobs.

use crate::duration::{format_duration, parse_duration};
use crate::error::{Error, Result};
use crate::json;
use crate::types::ValueType;
use crate::Value;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Convert `v` to `target`
///
/// ```
/// use docmodel_core::{cast, Error, Value, ValueType};
///
/// assert_eq!(cast(&Value::Integer(10), ValueType::Double).unwrap(), Value::Double(10.0));
/// assert!(matches!(
///     cast(&Value::from("10.5"), ValueType::Integer),
///     Err(Error::PrecisionLoss { .. })
/// ));
/// ```
pub fn cast(v: &Value, target: ValueType) -> Result<Value> {
    if v.value_type() == target || v.is_null() {
        return Ok(v.clone());
    }

    match target {
        ValueType::Bool => cast_as_bool(v),
        ValueType::Integer => cast_as_integer(v),
        ValueType::Double => cast_as_double(v),
        ValueType::Duration => cast_as_duration(v),
        ValueType::Text => cast_as_text(v),
        ValueType::Blob => cast_as_blob(v),
        ValueType::Array => cast_as_array(v),
        ValueType::Document => cast_as_document(v),
        ValueType::Null => Err(mismatch(v, target)),
    }
}

impl Value {
    /// Convert this value to `target`; see [`cast`]
    pub fn cast_as(&self, target: ValueType) -> Result<Value> {
        cast(self, target)
    }
}

fn mismatch(v: &Value, target: ValueType) -> Error {
    Error::TypeMismatch(format!("cannot cast {} as {}", v.type_name(), target))
}

fn cast_as_bool(v: &Value) -> Result<Value> {
    match v {
        Value::Integer(i) => Ok(Value::Bool(*i != 0)),
        Value::Text(s) => parse_bool(s).map(Value::Bool),
        _ => Err(mismatch(v, ValueType::Bool)),
    }
}

/// Boolean literals: `1 t T TRUE true True` and `0 f F FALSE false False`
fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(Error::parse(ValueType::Bool, s, "invalid boolean literal")),
    }
}

fn cast_as_integer(v: &Value) -> Result<Value> {
    match v {
        Value::Bool(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Double(f) => double_to_integer(*f).map(Value::Integer),
        Value::Duration(d) => Ok(Value::Integer(*d)),
        Value::Text(s) => {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
            let f = s
                .parse::<f64>()
                .map_err(|e| Error::parse(ValueType::Integer, s, e))?;
            double_to_integer(f).map(Value::Integer)
        }
        _ => Err(mismatch(v, ValueType::Integer)),
    }
}

/// Convert a double to an integer without losing information
///
/// NaN and values with a fractional part fail with
/// [`Error::PrecisionLoss`]; values outside the i64 range, infinities
/// included, fail with [`Error::Overflow`].
pub fn double_to_integer(f: f64) -> Result<i64> {
    // 2^63 is exactly representable; i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return Err(Error::PrecisionLoss { value: f });
    }
    if f >= LIMIT || f < -LIMIT {
        return Err(Error::Overflow(format!("{} is out of the integer range", f)));
    }
    if f.fract() != 0.0 {
        return Err(Error::PrecisionLoss { value: f });
    }
    Ok(f as i64)
}

fn cast_as_double(v: &Value) -> Result<Value> {
    match v {
        Value::Integer(i) => Ok(Value::Double(*i as f64)),
        Value::Text(s) => s
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| Error::parse(ValueType::Double, s, e)),
        _ => Err(mismatch(v, ValueType::Double)),
    }
}

fn cast_as_duration(v: &Value) -> Result<Value> {
    match v {
        Value::Text(s) => parse_duration(s).map(Value::Duration),
        _ => Err(mismatch(v, ValueType::Duration)),
    }
}

fn cast_as_text(v: &Value) -> Result<Value> {
    match v {
        Value::Duration(d) => Ok(Value::Text(format_duration(*d))),
        Value::Blob(b) => Ok(Value::Text(BASE64.encode(b))),
        other => json::to_json_string(other).map(Value::Text),
    }
}

fn cast_as_blob(v: &Value) -> Result<Value> {
    match v {
        Value::Text(s) => BASE64
            .decode(s)
            .map(Value::Blob)
            .map_err(|e| Error::parse(ValueType::Blob, s, e)),
        _ => Err(mismatch(v, ValueType::Blob)),
    }
}

fn cast_as_array(v: &Value) -> Result<Value> {
    match v {
        Value::Text(s) => match json::from_json_str(s) {
            Ok(parsed @ Value::Array(_)) => Ok(parsed),
            Ok(other) => Err(Error::parse(
                ValueType::Array,
                s,
                format!("expected a JSON array, found {}", other.type_name()),
            )),
            Err(e) => Err(Error::parse(ValueType::Array, s, e)),
        },
        _ => Err(mismatch(v, ValueType::Array)),
    }
}

fn cast_as_document(v: &Value) -> Result<Value> {
    match v {
        Value::Text(s) => match json::from_json_str(s) {
            Ok(parsed @ Value::Document(_)) => Ok(parsed),
            Ok(other) => Err(Error::parse(
                ValueType::Document,
                s,
                format!("expected a JSON object, found {}", other.type_name()),
            )),
            Err(e) => Err(Error::parse(ValueType::Document, s, e)),
        },
        _ => Err(mismatch(v, ValueType::Document)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ALL_VALUE_TYPES;
    use crate::FieldBuffer;

    fn samples() -> Vec<Value> {
        vec![
            Value::Null,
            Value::Bool(true),
            Value::Integer(-7),
            Value::Double(2.0),
            Value::Double(2.5),
            Value::Duration(1_500_000_000),
            Value::from("true"),
            Value::from("12"),
            Value::from("[1, 2]"),
            Value::Blob(vec![0, 1, 254]),
            Value::from(vec![Value::from(1), Value::from("a")]),
            Value::from(FieldBuffer::new().with_field("a", 1)),
        ]
    }

    #[test]
    fn test_identity_and_null() {
        for v in samples() {
            assert_eq!(cast(&v, v.value_type()).unwrap(), v);
        }
        for ty in ALL_VALUE_TYPES {
            assert_eq!(cast(&Value::Null, ty).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_bool_integer() {
        assert_eq!(cast(&Value::Bool(true), ValueType::Integer).unwrap(), Value::Integer(1));
        assert_eq!(cast(&Value::Bool(false), ValueType::Integer).unwrap(), Value::Integer(0));
        assert_eq!(cast(&Value::Integer(-3), ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(cast(&Value::Integer(0), ValueType::Bool).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_double_to_integer() {
        assert_eq!(cast(&Value::Double(10.0), ValueType::Integer).unwrap(), Value::Integer(10));
        assert_eq!(
            cast(&Value::Double(10.5), ValueType::Integer).unwrap_err(),
            Error::PrecisionLoss { value: 10.5 }
        );
        assert!(matches!(
            cast(&Value::Double(1e19), ValueType::Integer),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            cast(&Value::Double(f64::NEG_INFINITY), ValueType::Integer),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            cast(&Value::Double(f64::NAN), ValueType::Integer),
            Err(Error::PrecisionLoss { .. })
        ));
        assert_eq!(double_to_integer(-9_223_372_036_854_775_808.0).unwrap(), i64::MIN);
    }

    #[test]
    fn test_integer_to_double() {
        assert_eq!(cast(&Value::Integer(10), ValueType::Double).unwrap(), Value::Double(10.0));
    }

    #[test]
    fn test_text_to_numbers() {
        assert_eq!(cast(&Value::from("42"), ValueType::Integer).unwrap(), Value::Integer(42));
        assert_eq!(cast(&Value::from("42.0"), ValueType::Integer).unwrap(), Value::Integer(42));
        assert_eq!(
            cast(&Value::from("10.5"), ValueType::Integer).unwrap_err(),
            Error::PrecisionLoss { value: 10.5 }
        );
        assert!(matches!(
            cast(&Value::from("abc"), ValueType::Integer),
            Err(Error::Parse { target: ValueType::Integer, .. })
        ));
        assert_eq!(cast(&Value::from("1.25"), ValueType::Double).unwrap(), Value::Double(1.25));
        assert!(matches!(
            cast(&Value::from(""), ValueType::Double),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_text_to_bool() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(cast(&Value::from(t), ValueType::Bool).unwrap(), Value::Bool(true));
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(cast(&Value::from(f), ValueType::Bool).unwrap(), Value::Bool(false));
        }
        assert!(matches!(
            cast(&Value::from("yes"), ValueType::Bool),
            Err(Error::Parse { target: ValueType::Bool, .. })
        ));
    }

    #[test]
    fn test_to_text() {
        let text = |v: Value| cast(&v, ValueType::Text).unwrap();
        assert_eq!(text(Value::Bool(false)), Value::from("false"));
        assert_eq!(text(Value::Integer(10)), Value::from("10"));
        assert_eq!(text(Value::Double(10.0)), Value::from("10.0"));
        assert_eq!(text(Value::Double(0.5)), Value::from("0.5"));
        assert_eq!(text(Value::Duration(150_000_000)), Value::from("150ms"));
        assert_eq!(text(Value::Blob(b"hi".to_vec())), Value::from("aGk="));
        assert_eq!(
            text(Value::from(vec![Value::from(1), Value::from("a")])),
            Value::from("[1,\"a\"]")
        );
        assert_eq!(
            text(Value::from(FieldBuffer::new().with_field("a", Value::Null))),
            Value::from("{\"a\":null}")
        );
    }

    #[test]
    fn test_text_blob_base64_roundtrip() {
        let blob = Value::Blob(vec![0, 1, 2, 255]);
        let text = cast(&blob, ValueType::Text).unwrap();
        assert_eq!(text, Value::from("AAEC/w=="));
        assert_eq!(cast(&text, ValueType::Blob).unwrap(), blob);
        assert!(matches!(
            cast(&Value::from("not base64!"), ValueType::Blob),
            Err(Error::Parse { target: ValueType::Blob, .. })
        ));
    }

    #[test]
    fn test_text_duration() {
        assert_eq!(
            cast(&Value::from("1m30s"), ValueType::Duration).unwrap(),
            Value::Duration(90_000_000_000)
        );
        assert_eq!(
            cast(&Value::Duration(-5), ValueType::Integer).unwrap(),
            Value::Integer(-5)
        );
        assert!(cast(&Value::from("soon"), ValueType::Duration).is_err());
    }

    #[test]
    fn test_text_to_composites() {
        let arr = cast(&Value::from("[1, 2.5, \"x\"]"), ValueType::Array).unwrap();
        assert_eq!(
            arr,
            Value::from(vec![Value::Integer(1), Value::Double(2.5), Value::from("x")])
        );
        let doc = cast(&Value::from(r#"{"a": {"b": true}}"#), ValueType::Document).unwrap();
        assert_eq!(
            crate::path::get(&doc, &"a.b".parse().unwrap()).unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            cast(&Value::from("{}"), ValueType::Array),
            Err(Error::Parse { target: ValueType::Array, .. })
        ));
        assert!(matches!(
            cast(&Value::from("{"), ValueType::Document),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_mismatches() {
        let cases = [
            (Value::Bool(true), ValueType::Array),
            (Value::Bool(true), ValueType::Double),
            (Value::Double(1.0), ValueType::Bool),
            (Value::Integer(1), ValueType::Duration),
            (Value::Integer(1), ValueType::Blob),
            (Value::Blob(vec![]), ValueType::Integer),
            (Value::from(vec![Value::Null]), ValueType::Document),
            (Value::from(FieldBuffer::new()), ValueType::Array),
            (Value::Integer(1), ValueType::Null),
        ];
        for (v, ty) in cases {
            assert!(
                matches!(cast(&v, ty), Err(Error::TypeMismatch(_))),
                "{:?} as {}",
                v,
                ty
            );
        }
    }

    #[test]
    fn test_cast_idempotent() {
        for v in samples() {
            for ty in ALL_VALUE_TYPES {
                if let Ok(once) = cast(&v, ty) {
                    assert_eq!(cast(&once, ty).unwrap(), once, "{:?} as {}", v, ty);
                }
            }
        }
    }
}
