//! Unit tests for parameter flattening and field binding.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::{error::ContractError, value::TypeDescriptor};

#[fixture]
fn codec() -> ParameterCodec {
    let forms = FormRegistry::builder()
        .declare(
            FormDeclaration::form("Person")
                .prefix("person.")
                .field(FieldDeclaration::new("name", TypeDescriptor::Text))
                .field(FieldDeclaration::new("age", TypeDescriptor::Integer))
                .field(FieldDeclaration::new("address", TypeDescriptor::composite("Address")).named("addr"))
                .field(
                    FieldDeclaration::new("emails", TypeDescriptor::sequence(TypeDescriptor::Text))
                        .named("email")
                        .indexed(),
                )
                .field(FieldDeclaration::new("nicknames", TypeDescriptor::sequence(TypeDescriptor::Text))),
        )
        .declare(
            FormDeclaration::form("Address")
                .prefix("location")
                .field(FieldDeclaration::new("street", TypeDescriptor::Text))
                .field(FieldDeclaration::new("number", TypeDescriptor::Integer)),
        )
        .declare(
            FormDeclaration::form("Reading")
                .field(FieldDeclaration::new("ratio", TypeDescriptor::Float))
                .field(FieldDeclaration::new("active", TypeDescriptor::Bool))
                .field(FieldDeclaration::new("grade", TypeDescriptor::Char))
                .field(FieldDeclaration::new("label", TypeDescriptor::Text)),
        )
        .declare(
            FormDeclaration::form("Node")
                .field(FieldDeclaration::new("label", TypeDescriptor::Text))
                .field(FieldDeclaration::new("child", TypeDescriptor::composite("Node"))),
        )
        .declare(FormDeclaration::plain("Opaque").field(FieldDeclaration::new("id", TypeDescriptor::Integer)))
        .declare(
            FormDeclaration::form("Clash")
                .field(FieldDeclaration::new("first", TypeDescriptor::Text).named("value"))
                .field(FieldDeclaration::new("second", TypeDescriptor::Text).named("value")),
        )
        .build();
    ParameterCodec::new(Arc::new(forms))
}

fn pairs(parameters: &Parameters) -> Vec<(&str, &str)> { parameters.iter().collect() }

#[test]
fn looked_up_values_outlive_the_key() {
    let parameters = Parameters::parse("tag=a&tag=b&page=2");
    let (first, all) = {
        let key = String::from("tag");
        (parameters.first(&key), parameters.get_all(&key).collect::<Vec<_>>())
    };
    assert_eq!(first, Some("a"));
    assert_eq!(all, ["a", "b"]);
}

#[rstest]
fn flat_composite_emits_one_pair_per_non_null_field(codec: ParameterCodec) {
    let reading = Composite::new("Reading")
        .with("label", "north")
        .with("ratio", 0.5)
        .with("active", Value::Null)
        .with("grade", 'B');
    let parameters = codec.flatten(&reading.into(), "").expect("flatten reading");
    assert_eq!(
        pairs(&parameters),
        [("ratio", "0.5"), ("grade", "B"), ("label", "north")]
    );
}

#[rstest]
fn nested_prefixes_compose_left_to_right(codec: ParameterCodec) {
    let person = Composite::new("Person").with("name", "Ada").with(
        "address",
        Composite::new("Address").with("street", "Main").with("number", 12),
    );
    let parameters = codec.flatten(&person.into(), "").expect("flatten person");
    assert_eq!(
        pairs(&parameters),
        [
            ("person.name", "Ada"),
            ("person.addr.location.street", "Main"),
            ("person.addr.location.number", "12"),
        ]
    );
}

#[rstest]
fn caller_prefix_precedes_form_prefix(codec: ParameterCodec) {
    let address = Composite::new("Address").with("street", "Main");
    let parameters = codec.flatten(&address.into(), "shipping").expect("flatten address");
    assert_eq!(pairs(&parameters), [("shipping.location.street", "Main")]);
}

#[rstest]
fn indexed_and_plain_sequences(codec: ParameterCodec) {
    let person = Composite::new("Person")
        .with("emails", vec!["a@x", "b@x"])
        .with("nicknames", vec!["ace", "bee"]);
    let parameters = codec.flatten(&person.into(), "").expect("flatten person");
    assert_eq!(
        pairs(&parameters),
        [
            ("person.email[0]", "a@x"),
            ("person.email[1]", "b@x"),
            ("person.nicknames", "ace"),
            ("person.nicknames", "bee"),
        ]
    );
}

#[rstest]
fn empty_sequence_emits_nothing(codec: ParameterCodec) {
    let person = Composite::new("Person").with("emails", Vec::<String>::new());
    let parameters = codec.flatten(&person.into(), "").expect("flatten person");
    assert!(parameters.is_empty());
}

#[rstest]
fn empty_prefix_never_introduces_leading_separator(codec: ParameterCodec) {
    let node = Composite::new("Node").with("label", "root");
    let parameters = codec.flatten(&node.into(), "").expect("flatten node");
    assert_eq!(pairs(&parameters), [("label", "root")]);
}

#[rstest]
fn self_referencing_form_flattens_finite_values(codec: ParameterCodec) {
    let node = Composite::new("Node")
        .with("label", "root")
        .with("child", Composite::new("Node").with("label", "leaf"));
    let parameters = codec.flatten(&node.into(), "").expect("flatten node");
    assert_eq!(pairs(&parameters), [("label", "root"), ("child.label", "leaf")]);
}

#[rstest]
fn scalars_need_a_key(codec: ParameterCodec) {
    assert_eq!(
        pairs(&codec.flatten(&Value::Integer(3), "page").expect("flatten scalar")),
        [("page", "3")]
    );
    let error = codec
        .flatten(&Value::Integer(3), "")
        .expect_err("bare scalar has no key");
    assert!(matches!(error, EndpointError::Binding(BindingError::MissingKey { .. })));
}

#[rstest]
fn bytes_are_not_renderable(codec: ParameterCodec) {
    let value = Value::Bytes(bytes::Bytes::from_static(b"raw"));
    let error = codec.flatten(&value, "blob").expect_err("bytes have no text form");
    assert!(matches!(error, EndpointError::Binding(BindingError::NotRenderable { .. })));
}

#[rstest]
#[case("Opaque", ContractError::NotAForm { type_name: "Opaque".into() })]
#[case("Missing", ContractError::NotAForm { type_name: "Missing".into() })]
#[case("Clash", ContractError::DuplicateFormField { type_name: "Clash".into(), field: "value".into() })]
fn invalid_forms_fail_fast(codec: ParameterCodec, #[case] type_name: &str, #[case] expected: ContractError) {
    let error = codec
        .flatten(&Composite::new(type_name).into(), "")
        .expect_err("invalid form");
    match error {
        EndpointError::Contract(contract) => assert_eq!(contract, expected),
        other => panic!("expected contract error, got {other:?}"),
    }
}

#[rstest]
fn descriptors_are_built_once_per_type(codec: ParameterCodec) {
    let person = Value::from(Composite::new("Person").with("name", "Ada"));
    codec.flatten(&person, "").expect("first flatten");
    codec.flatten(&person, "").expect("second flatten");
    assert_eq!(codec.forms().cached(), 1);
    let first = codec.forms().descriptor("Person").expect("descriptor");
    let second = codec.forms().descriptor("Person").expect("descriptor");
    assert!(Arc::ptr_eq(&first, &second));
}

#[rstest]
#[case("ratio", "2.75", Value::Float(2.75))]
#[case("ratio", "2", Value::Float(2.0))]
#[case("active", "true", Value::Bool(true))]
#[case("active", "FALSE", Value::Bool(false))]
#[case("grade", "A", Value::Char('A'))]
#[case("label", "north", Value::Text("north".into()))]
fn apply_coerces_text(codec: ParameterCodec, #[case] name: &str, #[case] text: &str, #[case] expected: Value) {
    let mut reading = Composite::new("Reading");
    codec
        .apply(&mut reading, name, Value::from(text))
        .expect("apply field");
    assert_eq!(reading.get(name), Some(&expected));
}

#[rstest]
fn apply_passes_through_conforming_values(codec: ParameterCodec) {
    let mut reading = Composite::new("Reading");
    codec
        .apply(&mut reading, "ratio", Value::Integer(4))
        .expect("integers widen into floats");
    assert_eq!(reading.get("ratio"), Some(&Value::Float(4.0)));
}

#[rstest]
#[case("ratio", "abc")]
#[case("active", "1")]
#[case("grade", "")]
fn apply_reports_coercion_failures(codec: ParameterCodec, #[case] name: &str, #[case] text: &str) {
    let mut reading = Composite::new("Reading");
    let error = codec
        .apply(&mut reading, name, Value::from(text))
        .expect_err("coercion should fail");
    assert!(matches!(error, EndpointError::Binding(BindingError::Coercion { .. })));
    assert!(reading.is_empty(), "failed coercion must not set the field");
}

#[rstest]
fn apply_uses_serialised_names(codec: ParameterCodec) {
    let mut person = Composite::new("Person");
    codec
        .apply(&mut person, "email", Value::from(vec!["a@x"]))
        .expect("apply emails");
    assert_eq!(person.get("emails"), Some(&Value::from(vec!["a@x"])));

    let error = codec
        .apply(&mut person, "emails", Value::from("a@x"))
        .expect_err("field name is not the serialised name");
    assert!(matches!(error, EndpointError::Binding(BindingError::UnknownField { .. })));
}
