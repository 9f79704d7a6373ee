//! JSON import and export

use crate::common::json;
use docmodel::{
    cast, from_json_str, to_json_string, Document, Error, FieldBuffer, JsonDocument, Value,
    ValueType,
};

#[test]
fn test_literal_syntax_picks_numeric_type() {
    let v = json(r#"{"i": 10, "d": 10.0, "e": 1e3, "n": -7}"#);
    let d = v.as_document().unwrap();
    assert_eq!(d.get_by_field("i").unwrap(), Value::Integer(10));
    assert_eq!(d.get_by_field("d").unwrap(), Value::Double(10.0));
    assert_eq!(d.get_by_field("e").unwrap(), Value::Double(1000.0));
    assert_eq!(d.get_by_field("n").unwrap(), Value::Integer(-7));
}

#[test]
fn test_lossy_mappings() {
    let doc: Value = FieldBuffer::new()
        .with_field("ttl", Value::Duration(90_000_000_000))
        .with_field("raw", Value::Blob(vec![0xDE, 0xAD]))
        .into();
    let text = to_json_string(&doc).unwrap();
    assert_eq!(text, r#"{"ttl":"1m30s","raw":"3q0="}"#);

    // Both come back as text; casting restores them
    let back = from_json_str(&text).unwrap();
    let back = back.as_document().unwrap();
    let ttl = back.get_by_field("ttl").unwrap();
    assert_eq!(ttl, Value::from("1m30s"));
    assert_eq!(
        cast(&ttl, ValueType::Duration).unwrap(),
        Value::Duration(90_000_000_000)
    );
    let raw = back.get_by_field("raw").unwrap();
    assert_eq!(
        cast(&raw, ValueType::Blob).unwrap(),
        Value::Blob(vec![0xDE, 0xAD])
    );
}

#[test]
fn test_blob_text_convention_is_base64_everywhere() {
    let blob = Value::Blob(b"hi".to_vec());
    let via_cast = cast(&blob, ValueType::Text).unwrap();
    let via_json = from_json_str(&to_json_string(&blob).unwrap()).unwrap();
    assert_eq!(via_cast, Value::from("aGk="));
    assert_eq!(via_cast, via_json);
}

#[test]
fn test_non_finite_double_has_no_json_form() {
    assert!(matches!(
        to_json_string(&Value::Double(f64::NAN)),
        Err(Error::Unsupported(_))
    ));
}

#[test]
fn test_lazy_view_matches_owned() {
    let text = r#"{"a": {"b": [1, 2]}, "a": 3, "c": "x"}"#;
    let lazy = JsonDocument::parse(text).unwrap();
    let owned = json(text);
    assert_eq!(lazy.get_by_field("a").unwrap().to_string(), r#"{"b":[1,2]}"#);
    assert_eq!(Value::from(FieldBuffer::copy_from(&lazy).unwrap()), owned);
}

#[test]
fn test_display() {
    assert_eq!(Value::Null.to_string(), "NULL");
    assert_eq!(Value::from("q").to_string(), r#""q""#);
    assert_eq!(json(r#"{"k": [true, 1.5]}"#).to_string(), r#"{"k":[true,1.5]}"#);
}
