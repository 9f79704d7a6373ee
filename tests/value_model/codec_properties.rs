//! Codec guarantees through the facade

use crate::common::{arb_value, identical, json};
use docmodel::{compare, ordered, stream, Document, EncodedDocument, FieldBuffer, Value};
use proptest::prelude::*;
use std::cmp::Ordering;

proptest! {
    #[test]
    fn prop_both_codecs_roundtrip(v in arb_value()) {
        let s = stream::decode(&stream::encode(&v).unwrap()).unwrap();
        prop_assert!(identical(&s, &v));
        let o = ordered::decode(&ordered::encode(&v).unwrap()).unwrap();
        prop_assert!(identical(&o, &v));
    }

    #[test]
    fn prop_ordered_keys_sort_like_values(mut values in prop::collection::vec(arb_value(), 0..12)) {
        let mut keys: Vec<Vec<u8>> = values
            .iter()
            .map(|v| ordered::sort_key(v).unwrap())
            .collect();
        keys.sort();
        values.sort_by(|a, b| compare(a, b).unwrap());
        let resorted: Vec<Vec<u8>> = values
            .iter()
            .map(|v| ordered::sort_key(v).unwrap())
            .collect();
        prop_assert_eq!(keys, resorted);
    }
}

#[test]
fn test_ordered_examples() {
    let k = |v: Value| ordered::encode(&v).unwrap();
    assert!(k(Value::Integer(-5)) < k(Value::Integer(0)));
    assert!(k(Value::Integer(0)) < k(Value::Integer(5)));
    assert!(k(Value::from("ab")) < k(Value::from("abc")));
    assert!(k(Value::from("abc")) < k(Value::from("b")));
}

#[test]
fn test_record_storage_flow() {
    let doc = json(r#"{"id": 1, "body": {"title": "t", "tags": ["x", "y"]}}"#);
    let record = stream::encode_document(doc.as_document().unwrap()).unwrap();

    let view = EncodedDocument::new(record.clone()).unwrap();
    assert_eq!(view.get_by_field("id").unwrap(), Value::Integer(1));

    let owned = stream::decode_document(&record).unwrap();
    assert_eq!(Value::from(owned), doc);

    let copied = FieldBuffer::copy_from(&view).unwrap();
    assert_eq!(compare(&Value::from(copied), &doc).unwrap(), Ordering::Equal);
}
