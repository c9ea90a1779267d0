//! Unit tests for dynamic values and type descriptors.

use rstest::rstest;
use serde::{Deserialize, Serialize};

use super::*;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Item {
    id: i64,
    name: String,
    tags: Vec<String>,
}

#[rstest]
#[case(TypeDescriptor::Integer, Value::Integer(1), true)]
#[case(TypeDescriptor::Integer, Value::Float(1.0), false)]
#[case(TypeDescriptor::Text, Value::Null, false)]
#[case(TypeDescriptor::Unit, Value::Null, true)]
#[case(TypeDescriptor::optional(TypeDescriptor::Text), Value::Null, true)]
#[case(TypeDescriptor::Any, Value::Bytes(Bytes::from_static(b"x")), true)]
#[case(
    TypeDescriptor::sequence(TypeDescriptor::Integer),
    Value::from(vec![1, 2, 3]),
    true
)]
#[case(
    TypeDescriptor::sequence(TypeDescriptor::Integer),
    Value::Sequence(vec![Value::Integer(1), Value::Text("2".into())]),
    false
)]
#[case(TypeDescriptor::composite("Item"), Value::Composite(Composite::new("Item")), true)]
#[case(TypeDescriptor::composite("Item"), Value::Composite(Composite::new("Other")), false)]
fn conformance(#[case] descriptor: TypeDescriptor, #[case] value: Value, #[case] expected: bool) {
    assert_eq!(descriptor.conforms(&value), expected, "{descriptor} vs {value:?}");
}

#[test]
fn composite_equality_ignores_order_and_absent_nulls() {
    let left = Composite::new("Person").with("name", "Ada").with("age", 36);
    let right = Composite::new("Person")
        .with("age", 36)
        .with("name", "Ada")
        .with("nickname", Value::Null);
    assert_eq!(left, right);
    assert_ne!(left, Composite::new("Robot").with("name", "Ada").with("age", 36));
}

#[test]
fn set_replaces_in_place() {
    let mut record = Composite::new("Person").with("name", "Ada").with("age", 36);
    record.set("name", "Grace");
    let names: Vec<&str> = record.fields().map(|(name, _)| name).collect();
    assert_eq!(names, ["name", "age"]);
    assert_eq!(record.get("name"), Some(&Value::from("Grace")));
}

#[test]
fn serde_bridge_round_trips_typed_structs() {
    let item = Item {
        id: 7,
        name: "lamp".into(),
        tags: vec!["home".into(), "light".into()],
    };
    let value = Value::from_serialize(&item, "Item").expect("serialise item");
    let record = value.as_composite().expect("object becomes composite");
    assert_eq!(record.type_name(), "Item");
    assert_eq!(record.get("id"), Some(&Value::Integer(7)));

    let back: Item = value.deserialize_into().expect("deserialise item");
    assert_eq!(back, item);
}

#[test]
fn descriptor_guided_json_decoding() {
    let json = serde_json::json!({"id": 3, "ratio": 1});
    let decoded = from_json(json, &TypeDescriptor::composite("Stat")).expect("decode");
    let record = decoded.as_composite().expect("composite");
    assert_eq!(record.type_name(), "Stat");
    assert_eq!(record.get("ratio"), Some(&Value::Integer(1)));

    let floats = from_json(serde_json::json!([1, 2.5]), &TypeDescriptor::sequence(TypeDescriptor::Float))
        .expect("decode floats");
    assert_eq!(floats, Value::Sequence(vec![Value::Float(1.0), Value::Float(2.5)]));

    let error = from_json(serde_json::json!("x"), &TypeDescriptor::Integer)
        .expect_err("string is not an integer");
    assert!(error.contains("expected Integer"), "unexpected message: {error}");
}

#[test]
fn shapes_are_transparent_to_json_decoding() {
    let descriptor = TypeDescriptor::optional(TypeDescriptor::Integer);
    assert_eq!(from_json(serde_json::json!(5), &descriptor), Ok(Value::Integer(5)));
    assert_eq!(from_json(serde_json::Value::Null, &descriptor), Ok(Value::Null));
}
