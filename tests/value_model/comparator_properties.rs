//! Comparator totality and predicate consistency

use crate::common::{arb_scalar, arb_value, json};
use docmodel::{
    compare, is_equal, is_greater_than, is_greater_than_or_equal, is_less_than,
    is_less_than_or_equal, is_not_equal, Value,
};
use proptest::prelude::*;
use std::cmp::Ordering;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_compare_is_antisymmetric(a in arb_value(), b in arb_value()) {
        let ab = compare(&a, &b).unwrap();
        let ba = compare(&b, &a).unwrap();
        prop_assert_eq!(ab, ba.reverse(), "{} vs {}", a, b);
    }

    #[test]
    fn prop_compare_is_reflexive(a in arb_value()) {
        prop_assert_eq!(compare(&a, &a).unwrap(), Ordering::Equal);
    }

    #[test]
    fn prop_predicates_agree(a in arb_value(), b in arb_value()) {
        let ord = compare(&a, &b).unwrap();
        let lt = is_less_than(&a, &b).unwrap();
        let eq = is_equal(&a, &b).unwrap();
        let gt = is_greater_than(&a, &b).unwrap();
        prop_assert_eq!(u8::from(lt) + u8::from(eq) + u8::from(gt), 1);
        prop_assert_eq!(is_not_equal(&a, &b).unwrap(), !eq);
        prop_assert_eq!(is_less_than_or_equal(&a, &b).unwrap(), lt || eq);
        prop_assert_eq!(is_greater_than_or_equal(&a, &b).unwrap(), gt || eq);
        prop_assert_eq!(lt, ord == Ordering::Less);
    }

    #[test]
    fn prop_compare_is_transitive(
        a in arb_scalar(),
        b in arb_scalar(),
        c in arb_scalar(),
    ) {
        let mut v = [a, b, c];
        v.sort_by(|x, y| compare(x, y).unwrap());
        prop_assert_ne!(compare(&v[0], &v[1]).unwrap(), Ordering::Greater);
        prop_assert_ne!(compare(&v[1], &v[2]).unwrap(), Ordering::Greater);
        prop_assert_ne!(compare(&v[0], &v[2]).unwrap(), Ordering::Greater);
    }
}

#[test]
fn test_documents_equal_regardless_of_field_order() {
    let a = json(r#"{"x": 1, "y": [true]}"#);
    let b = json(r#"{"y": [true], "x": 1.0}"#);
    assert_eq!(compare(&a, &b).unwrap(), Ordering::Equal);
    assert_ne!(a, b);
}

#[test]
fn test_documents_with_different_shapes_are_ordered() {
    // Absence sorts before presence at the first differing field name
    let smaller = json(r#"{"a": 1}"#);
    let larger = json(r#"{"a": 1, "b": 0}"#);
    assert_eq!(compare(&smaller, &larger).unwrap(), Ordering::Less);
    assert!(is_greater_than(&larger, &smaller).unwrap());

    let has_a = json(r#"{"a": 100}"#);
    let has_b = json(r#"{"b": 1}"#);
    assert_eq!(compare(&has_b, &has_a).unwrap(), Ordering::Less);
}

#[test]
fn test_arrays_with_different_lengths_are_ordered() {
    assert_eq!(
        compare(&json("[1, 2]"), &json("[1, 2, 0]")).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        compare(&json("[1, 3]"), &json("[1, 2, 0]")).unwrap(),
        Ordering::Greater
    );
}

#[test]
fn test_large_integers_compare_through_doubles() {
    let a = Value::Integer((1 << 53) + 1);
    let b = Value::Integer(1 << 53);
    assert_eq!(compare(&a, &b).unwrap(), Ordering::Equal);
    assert_ne!(a, b);
}
