//! Path navigation and copy-on-write mutation

use crate::common::{all_paths, arb_document, arb_scalar, identical, json, path};
use docmodel::{path as paths, Error, Path, PathFragment, Value};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_set_then_get(
        d in arb_document(),
        pick in any::<prop::sample::Index>(),
        v in arb_scalar(),
    ) {
        let candidates = all_paths(&d);
        let p = pick.get(&candidates);
        let updated = paths::set(&d, p, v.clone()).unwrap();
        prop_assert!(identical(&paths::get(&updated, p).unwrap(), &v));
    }

    #[test]
    fn prop_set_new_field_then_get(
        d in arb_document(),
        pick in any::<prop::sample::Index>(),
        v in arb_scalar(),
    ) {
        let candidates: Vec<Path> = all_paths(&d)
            .into_iter()
            .filter(|p| matches!(paths::get(&d, p), Ok(Value::Document(_))))
            .collect();
        let parent = pick.get(&candidates);
        let p = parent.extend_field("new");
        let updated = paths::set(&d, &p, v.clone()).unwrap();
        prop_assert!(identical(&paths::get(&updated, &p).unwrap(), &v));
    }

    #[test]
    fn prop_set_is_copy_on_write(
        d in arb_document(),
        pick in any::<prop::sample::Index>(),
    ) {
        let before = d.deep_copy().unwrap();
        let candidates = all_paths(&d);
        paths::set(&d, pick.get(&candidates), Value::from("changed")).unwrap();
        prop_assert!(identical(&d, &before));
    }

    #[test]
    fn prop_resolved_paths_roundtrip_through_text(d in arb_document()) {
        for p in all_paths(&d) {
            let text = p.to_string();
            prop_assert_eq!(text.parse::<Path>().unwrap(), p, "{}", text);
        }
    }

    #[test]
    fn prop_path_text_roundtrip(names in prop::collection::vec("[a-z_][a-z0-9_-]{0,4}|[0-9]{1,2}", 1..5)) {
        let p = Path::from_fragments(names.iter().map(|n| match n.parse::<usize>() {
            Ok(i) => PathFragment::Index(i),
            Err(_) => PathFragment::Field(n.clone()),
        }));
        let text = p.to_string();
        prop_assert_eq!(text.parse::<Path>().unwrap(), p);
    }
}

#[test]
fn test_delete_field_and_element() {
    let root = json(r#"{"a": [1, 2, 3], "b": {"c": true, "d": null}}"#);
    let out = paths::delete(&root, &path("a[0]")).unwrap();
    assert_eq!(out, json(r#"{"a": [2, 3], "b": {"c": true, "d": null}}"#));
    let out = paths::delete(&out, &path("b.c")).unwrap();
    assert_eq!(out, json(r#"{"a": [2, 3], "b": {"d": null}}"#));
}

#[test]
fn test_delete_missing_is_not_found() {
    let root = json(r#"{"a": [1]}"#);
    assert!(paths::delete(&root, &path("x")).unwrap_err().is_not_found());
    assert!(paths::delete(&root, &path("a[5]")).unwrap_err().is_not_found());
    assert!(matches!(
        paths::delete(&root, &Path::root()),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_get_type_mismatch_is_not_found() {
    let root = json(r#"{"a": {"b": 1}, "l": [0]}"#);
    assert_eq!(
        paths::get(&root, &path("a[0]")).unwrap_err(),
        Error::IndexOutOfRange { index: 0 }
    );
    assert!(paths::get(&root, &path("l.b")).unwrap_err().is_not_found());
}

#[test]
fn test_quoted_field_names() {
    let root = json(r#"{"a.b": {"x`y": 1}}"#);
    let p = path("`a.b`.`x``y`");
    assert_eq!(paths::get(&root, &p).unwrap(), Value::Integer(1));
    assert_eq!(p.to_string(), "`a.b`.`x``y`");
}
