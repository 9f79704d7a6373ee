//! Shared strategies and helpers

use docmodel::{from_json_str, stream, Array, Document, FieldBuffer, Path, Value};
use proptest::prelude::*;

/// Parse JSON test input
pub fn json(s: &str) -> Value {
    from_json_str(s).unwrap()
}

/// Parse path test input
pub fn path(s: &str) -> Path {
    s.parse().unwrap()
}

/// Bit-exact equality, including NaN payloads and field order
pub fn identical(a: &Value, b: &Value) -> bool {
    stream::encode(a).unwrap() == stream::encode(b).unwrap()
}

pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(Value::Integer),
        any::<i64>().prop_map(Value::Integer),
        prop_oneof![
            Just(0.5),
            Just(-2.25),
            Just(1.0),
            Just(-0.0),
            Just(f64::NAN),
            Just(1e300),
        ]
        .prop_map(Value::Double),
        any::<f64>().prop_map(Value::Double),
        (-3i64..3).prop_map(|s| Value::Duration(s * 1_000_000_000)),
        "[a-c]{0,3}".prop_map(Value::Text),
        "-?[0-9]{1,3}(\\.[05])?".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..3).prop_map(Value::Blob),
    ]
}

/// Field names mixing plain letters with NUL, control and framing bytes,
/// path syntax characters and multi-byte UTF-8
pub fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-c]{1,2}",
        1 => "[a\\x00\\x1d\\x1e\\x1f.`\\[\\x{FF}\\x{1F600}]{0,2}",
    ]
}

/// Values with arbitrary nesting, duplicate field names allowed
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::vec((arb_name(), inner), 0..4)
                .prop_map(|fields| Value::from(fields.into_iter().collect::<FieldBuffer>())),
        ]
    })
}

/// Documents with distinct field names at every level
pub fn arb_document() -> impl Strategy<Value = Value> {
    let leaf = arb_scalar();
    let tree = leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map(arb_name(), inner, 0..4)
                .prop_map(|fields| Value::from(fields.into_iter().collect::<FieldBuffer>())),
        ]
    });
    prop::collection::btree_map(arb_name(), tree, 0..5)
        .prop_map(|fields| Value::from(fields.into_iter().collect::<FieldBuffer>()))
}

/// Every path that resolves inside `v`, root included
pub fn all_paths(v: &Value) -> Vec<Path> {
    let mut out = Vec::new();
    collect_paths(v, Path::root(), &mut out);
    out
}

fn collect_paths(v: &Value, at: Path, out: &mut Vec<Path>) {
    match v {
        Value::Document(d) => {
            for name in docmodel::fields(d.as_ref()).unwrap() {
                let child = d.get_by_field(&name).unwrap();
                collect_paths(&child, at.extend_field(name), out);
            }
        }
        Value::Array(a) => {
            let len = docmodel::array_len(a.as_ref()).unwrap();
            for i in 0..len {
                let child = a.get_by_index(i).unwrap();
                collect_paths(&child, at.extend_index(i), out);
            }
        }
        _ => {}
    }
    out.push(at);
}
