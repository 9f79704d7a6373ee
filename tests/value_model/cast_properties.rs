//! Cast invariants

use crate::common::{arb_value, identical};
use docmodel::{cast, Error, Value, ValueType, ALL_VALUE_TYPES};
use proptest::prelude::*;

fn arb_type() -> impl Strategy<Value = ValueType> {
    prop::sample::select(ALL_VALUE_TYPES.to_vec())
}

proptest! {
    #[test]
    fn prop_cast_is_idempotent(v in arb_value(), ty in arb_type()) {
        if let Ok(once) = cast(&v, ty) {
            let twice = cast(&once, ty).unwrap();
            prop_assert!(identical(&once, &twice), "{} -> {} -> {}", v, once, twice);
        }
    }

    #[test]
    fn prop_cast_result_has_target_type(v in arb_value(), ty in arb_type()) {
        if let Ok(out) = cast(&v, ty) {
            prop_assert!(out.is_null() || out.value_type() == ty);
        }
    }

    #[test]
    fn prop_integer_double_integer(i in -(1i64 << 53)..(1i64 << 53)) {
        let d = cast(&Value::Integer(i), ValueType::Double).unwrap();
        prop_assert_eq!(cast(&d, ValueType::Integer).unwrap(), Value::Integer(i));
    }
}

#[test]
fn test_double_to_integer_edges() {
    let cases = [
        (9.223372036854775807e18, true),
        (-9.223372036854775808e18, false),
        (f64::INFINITY, true),
    ];
    for (d, overflows) in cases {
        let result = cast(&Value::Double(d), ValueType::Integer);
        assert_eq!(
            matches!(result, Err(Error::Overflow(_))),
            overflows,
            "{} gave {:?}",
            d,
            result
        );
    }
    assert_eq!(
        cast(&Value::Double(-9.223372036854775808e18), ValueType::Integer).unwrap(),
        Value::Integer(i64::MIN)
    );
    assert!(matches!(
        cast(&Value::Double(f64::NAN), ValueType::Integer),
        Err(Error::PrecisionLoss { .. })
    ));
}

#[test]
fn test_composites_through_text() {
    let doc = crate::common::json(r#"{"b": [1, 2.5, "x", null], "a": {"t": true}}"#);
    let text = cast(&doc, ValueType::Text).unwrap();
    assert_eq!(
        text,
        Value::from(r#"{"b":[1,2.5,"x",null],"a":{"t":true}}"#)
    );
    assert_eq!(cast(&text, ValueType::Document).unwrap(), doc);
    assert!(matches!(
        cast(&text, ValueType::Array),
        Err(Error::Parse {
            target: ValueType::Array,
            ..
        })
    ));
}

#[test]
fn test_mismatched_pairs_are_type_errors() {
    let pairs = [
        (Value::Bool(true), ValueType::Array),
        (Value::Bool(true), ValueType::Double),
        (Value::Double(1.0), ValueType::Bool),
        (Value::Integer(1), ValueType::Document),
        (Value::Blob(vec![1]), ValueType::Integer),
    ];
    for (v, ty) in pairs {
        assert!(
            matches!(cast(&v, ty), Err(Error::TypeMismatch(_))),
            "{} as {}",
            v,
            ty
        );
    }
}
