//! Fixed scenarios with known answers
//!
//! Each test pins one documented behavior end to end.

use crate::common::{json, path};
use docmodel::{
    array_contains, cast, diff, path as paths, sort_array, Error, Op, Value, ValueType,
};

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn test_sort_numbers_across_integer_and_double() {
    let arr = json("[1.4, 3, 2.1, -5]");
    let sorted = sort_array(arr.as_array().unwrap()).unwrap();
    assert_eq!(Value::from(sorted), json("[-5, 1.4, 2.1, 3]"));
}

#[test]
fn test_sort_by_type_family() {
    let arr = json(r#"["foo", ["a"], {}, null, true, 10]"#);
    let sorted = sort_array(arr.as_array().unwrap()).unwrap();
    assert_eq!(Value::from(sorted), json(r#"[null, true, 10, "foo", ["a"], {}]"#));
}

#[test]
fn test_sort_is_stable_for_equal_numbers() {
    let arr = json("[1.0, true, 1, 0]");
    let sorted = sort_array(arr.as_array().unwrap()).unwrap();
    assert_eq!(Value::from(sorted), json("[0, 1.0, true, 1]"));
}

// =============================================================================
// Diff
// =============================================================================

#[test]
fn test_diff_single_array_element() {
    let a = json(r#"{"a": {"b": [1, 2, 3]}}"#);
    let b = json(r#"{"a": {"b": [1, 2, 4]}}"#);
    let ops = diff(a.as_document().unwrap(), b.as_document().unwrap()).unwrap();
    assert_eq!(ops, vec![Op::set(path("a.b[2]"), Value::Integer(4))]);
    assert_eq!(ops[0].to_string(), "SET a.b[2] = 4");
}

#[test]
fn test_diff_follows_field_name_order() {
    let a = json(r#"{"z": 1, "m": 2, "a": 3}"#);
    let b = json(r#"{"a": 3, "b": true, "z": 2}"#);
    let ops = diff(a.as_document().unwrap(), b.as_document().unwrap()).unwrap();
    let rendered: Vec<String> = ops.iter().map(|op| op.to_string()).collect();
    assert_eq!(rendered, vec!["SET b = true", "DELETE m", "SET z = 2"]);
}

// =============================================================================
// Path set
// =============================================================================

#[test]
fn test_set_adds_field_to_empty_document() {
    let updated = paths::set(&json("{}"), &path("a"), Value::Integer(1)).unwrap();
    assert_eq!(updated, json(r#"{"a": 1}"#));
}

#[test]
fn test_set_never_extends_arrays() {
    let root = json(r#"{"a": {"b": [1, 2, 3]}}"#);
    let err = paths::set(&root, &path("a.b[1000]"), Value::Integer(1)).unwrap_err();
    assert_eq!(err, Error::IndexOutOfRange { index: 1000 });
}

#[test]
fn test_set_leaves_original_untouched() {
    let root = json(r#"{"a": {"b": [1, 2, 3]}, "c": "keep"}"#);
    let before = root.clone();
    let updated = paths::set(&root, &path("a.b[0]"), Value::from("x")).unwrap();
    assert_eq!(root, before);
    assert_eq!(updated, json(r#"{"a": {"b": ["x", 2, 3]}, "c": "keep"}"#));
}

// =============================================================================
// Cast
// =============================================================================

#[test]
fn test_cast_precision_loss() {
    assert!(matches!(
        cast(&Value::from("10.5"), ValueType::Integer),
        Err(Error::PrecisionLoss { .. })
    ));
    assert!(matches!(
        cast(&Value::Double(10.5), ValueType::Integer),
        Err(Error::PrecisionLoss { .. })
    ));
    assert_eq!(
        cast(&Value::Integer(10), ValueType::Double).unwrap(),
        Value::Double(10.0)
    );
}

#[test]
fn test_cast_null_to_every_type() {
    for ty in docmodel::ALL_VALUE_TYPES {
        assert_eq!(cast(&Value::Null, ty).unwrap(), Value::Null);
    }
}

// =============================================================================
// Containment
// =============================================================================

#[test]
fn test_array_contains_cross_type_numbers() {
    let arr: Value = vec![
        Value::Integer(1),
        Value::from("foo"),
        Value::Blob(vec![1, 2, 3]),
    ]
    .into();
    let arr = arr.as_array().unwrap();
    assert!(array_contains(arr, &Value::Double(1.0)).unwrap());
    assert!(array_contains(arr, &Value::Blob(b"foo".to_vec())).unwrap());
    assert!(!array_contains(arr, &Value::Integer(2)).unwrap());
}
