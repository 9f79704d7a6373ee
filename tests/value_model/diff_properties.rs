//! Diff correctness
//!
//! Applying `diff(d1, d2)` to `d1` must produce a document the comparator
//! considers equal to `d2`. Field order is not part of that contract: new
//! fields are appended, so the result may list fields in another order.

use crate::common::{arb_document, identical, json, path};
use docmodel::{apply_ops, compare, diff, Op, OpKind, Value};
use proptest::prelude::*;
use std::cmp::Ordering;

fn diff_values(a: &Value, b: &Value) -> Vec<Op> {
    diff(a.as_document().unwrap(), b.as_document().unwrap()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_apply_diff_reaches_target(d1 in arb_document(), d2 in arb_document()) {
        let ops = diff_values(&d1, &d2);
        let patched = apply_ops(&d1, &ops).unwrap();
        prop_assert_eq!(
            compare(&patched, &d2).unwrap(),
            Ordering::Equal,
            "{} -> {} via {:?} gave {}",
            d1,
            d2,
            ops,
            patched
        );
    }

    #[test]
    fn prop_diff_with_self_is_empty(d in arb_document()) {
        prop_assert!(diff_values(&d, &d).is_empty());
    }

    #[test]
    fn prop_diff_is_deterministic(d1 in arb_document(), d2 in arb_document()) {
        prop_assert_eq!(diff_values(&d1, &d2), diff_values(&d1, &d2));
    }

    #[test]
    fn prop_apply_does_not_modify_source(d1 in arb_document(), d2 in arb_document()) {
        let before = d1.deep_copy().unwrap();
        let ops = diff_values(&d1, &d2);
        apply_ops(&d1, &ops).unwrap();
        prop_assert!(identical(&d1, &before));
    }
}

#[test]
fn test_ragged_arrays() {
    let a = json(r#"{"xs": [1, 2, 3, 4]}"#);
    let b = json(r#"{"xs": [1]}"#);
    let ops = diff_values(&a, &b);
    assert_eq!(
        ops,
        vec![
            Op::delete(path("xs[1]"), Value::Integer(2)),
            Op::delete(path("xs[2]"), Value::Integer(3)),
            Op::delete(path("xs[3]"), Value::Integer(4)),
        ]
    );
    assert_eq!(apply_ops(&a, &ops).unwrap(), b);

    let ops = diff_values(&b, &a);
    assert!(ops.iter().all(|op| op.kind == OpKind::Set));
    assert_eq!(apply_ops(&b, &ops).unwrap(), a);
}

#[test]
fn test_type_change_is_a_set() {
    let a = json(r#"{"v": 1, "w": {"k": 1}}"#);
    let b = json(r#"{"v": 1.0, "w": [1]}"#);
    let ops = diff_values(&a, &b);
    assert_eq!(
        ops,
        vec![
            Op::set(path("v"), Value::Double(1.0)),
            Op::set(path("w"), json("[1]")),
        ]
    );
}

#[test]
fn test_nested_documents_recurse() {
    let a = json(r#"{"p": {"q": {"r": 1, "s": 2}}}"#);
    let b = json(r#"{"p": {"q": {"r": 1, "t": 3}}}"#);
    let rendered: Vec<String> = diff_values(&a, &b).iter().map(Op::to_string).collect();
    assert_eq!(rendered, vec!["DELETE p.q.s", "SET p.q.t = 3"]);
}
