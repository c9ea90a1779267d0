//! Unit tests for binding arguments into requests.

use std::sync::Arc;

use http::{Method, header::CONTENT_TYPE};
use rstest::{fixture, rstest};

use super::*;
use crate::{
    contract::{EndpointTarget, MethodDescriptor, ParameterDeclaration},
    error::{BindingError, EndpointError},
    form::{FieldDeclaration, FormDeclaration, FormRegistry, ParameterCodec},
    value::{Composite, TypeDescriptor},
};

#[fixture]
fn codec() -> ParameterCodec {
    let forms = FormRegistry::builder()
        .declare(
            FormDeclaration::form("Filter")
                .prefix("filter")
                .field(FieldDeclaration::new("size", TypeDescriptor::Integer))
                .field(FieldDeclaration::new("tags", TypeDescriptor::sequence(TypeDescriptor::Text)).indexed()),
        )
        .build();
    ParameterCodec::new(Arc::new(forms))
}

#[fixture]
fn target() -> Arc<EndpointTarget> { Arc::new(EndpointTarget::new("ItemApi").header("Accept", "application/json")) }

fn metadata(method: &MethodDescriptor) -> crate::contract::EndpointMetadata {
    crate::contract::EndpointMetadata::resolve(method).expect("valid contract")
}

fn header_values<'r>(request: &'r EndpointRequest, name: &str) -> Vec<&'r str> {
    request
        .headers()
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect()
}

#[rstest]
fn substitutes_path_variables(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let find = target
        .method("find(id)")
        .get("/items/{id}")
        .param(ParameterDeclaration::path("id", TypeDescriptor::Integer));
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&find), &[Value::Integer(42)])
        .expect("bound request");
    assert_eq!(request.method(), &Method::GET);
    assert_eq!(request.url(), "/items/42");
    assert!(request.body().is_none());
    assert_eq!(header_values(&request, "accept"), ["application/json"]);
}

#[rstest]
fn percent_encodes_path_segments(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let find = target
        .method("find(name)")
        .get("/items/{name}")
        .param(ParameterDeclaration::path("name", TypeDescriptor::Text));
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&find), &[Value::from("a b/c~d")])
        .expect("bound request");
    assert_eq!(request.url(), "/items/a%20b%2Fc~d");
}

#[rstest]
fn resolves_against_the_base_endpoint(codec: ParameterCodec) {
    let target = Arc::new(
        EndpointTarget::new("ItemApi")
            .endpoint("http://catalogue.test/")
            .path("/v1"),
    );
    let list = target.method("list()").get("/items");
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&list), &[])
        .expect("bound request");
    assert_eq!(request.url(), "http://catalogue.test/v1/items");
}

#[rstest]
fn flattens_query_parameters(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let search = target
        .method("search(q, page, ids, filter)")
        .get("/items")
        .param(ParameterDeclaration::query("q", TypeDescriptor::Text))
        .param(ParameterDeclaration::query("page", TypeDescriptor::optional(TypeDescriptor::Integer)))
        .param(ParameterDeclaration::query("ids", TypeDescriptor::sequence(TypeDescriptor::Integer)))
        .param(ParameterDeclaration::query("filter", TypeDescriptor::composite("Filter")));
    let filter = Composite::new("Filter").with("size", 5).with("tags", vec!["new", "hot"]);
    let request = EndpointRequestBuilder::new(&codec)
        .build(
            &metadata(&search),
            &[Value::from("red shoe"), Value::Null, Value::from(vec![1, 2]), filter.into()],
        )
        .expect("bound request");

    assert_eq!(request.query().first("q"), Some("red shoe"));
    assert_eq!(request.query().first("page"), None);
    assert_eq!(request.query().get_all("ids").collect::<Vec<_>>(), ["1", "2"]);
    assert_eq!(request.query().first("filter.size"), Some("5"));
    assert_eq!(request.query().first("filter.tags[1]"), Some("hot"));
    assert_eq!(request.path(), "/items");
    assert_eq!(
        request.url(),
        "/items?q=red+shoe&ids=1&ids=2&filter.size=5&filter.tags%5B0%5D=new&filter.tags%5B1%5D=hot"
    );
}

#[rstest]
fn null_sequence_elements_are_skipped(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let find = target
        .method("find(tags, x-tag)")
        .get("/items")
        .param(ParameterDeclaration::query("tags", TypeDescriptor::sequence(TypeDescriptor::Text)))
        .param(ParameterDeclaration::header("x-tag", TypeDescriptor::sequence(TypeDescriptor::Text)));
    let with_null = Value::from(vec![Value::from("a"), Value::Null]);
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&find), &[with_null.clone(), with_null])
        .expect("nulls emit nothing");

    assert_eq!(request.url(), "/items?tags=a");
    assert_eq!(header_values(&request, "x-tag"), ["a"]);
}

#[rstest]
fn null_elements_still_fail_for_other_types(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let find = target
        .method("find(tags)")
        .get("/items")
        .param(ParameterDeclaration::query("tags", TypeDescriptor::sequence(TypeDescriptor::Text)));
    let error = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&find), &[Value::from(vec![Value::from("a"), Value::Integer(1)])])
        .expect_err("integer is not text");
    assert!(matches!(
        error,
        EndpointError::Binding(BindingError::IncompatibleArgument { .. })
    ));
}

#[rstest]
fn appends_query_to_a_path_with_a_query(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let list = target
        .method("list(page)")
        .get("/items?sort=name")
        .param(ParameterDeclaration::query("page", TypeDescriptor::Integer));
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&list), &[Value::Integer(2)])
        .expect("bound request");

    assert_eq!(request.url(), "/items?sort=name&page=2");
    assert_eq!(request.path(), "/items");
}

#[rstest]
fn renders_header_templates_and_arguments(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let tagged = target
        .method("tagged(token, tag)")
        .get("/items")
        .header("Authorization", "Bearer {token}")
        .header("Accept", "text/plain")
        .param(ParameterDeclaration::query("token", TypeDescriptor::Text))
        .param(ParameterDeclaration::header("x-tag", TypeDescriptor::sequence(TypeDescriptor::Text)));
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&tagged), &[Value::from("secret"), Value::from(vec!["a", "b"])])
        .expect("bound request");

    assert_eq!(header_values(&request, "authorization"), ["Bearer secret"]);
    assert_eq!(header_values(&request, "accept"), ["text/plain"]);
    assert_eq!(header_values(&request, "x-tag"), ["a", "b"]);
}

#[rstest]
fn omits_headers_referencing_null_arguments(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let tagged = target
        .method("tagged(token)")
        .get("/items")
        .header("Authorization", "Bearer {token}")
        .param(ParameterDeclaration::header("token", TypeDescriptor::optional(TypeDescriptor::Text)));
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&tagged), &[Value::Null])
        .expect("bound request");
    assert!(request.headers().get("authorization").is_none());
    assert!(request.headers().get("token").is_none());
}

#[rstest]
fn encodes_form_parameters_into_the_body(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let submit = target
        .method("submit(filter, note)")
        .post("/items")
        .param(ParameterDeclaration::form("filter", TypeDescriptor::composite("Filter")))
        .param(ParameterDeclaration::form("note", TypeDescriptor::Text));
    let filter = Composite::new("Filter").with("size", 3);
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&submit), &[filter.into(), Value::from("a&b")])
        .expect("bound request");

    let body = request.body().expect("form body");
    assert_eq!(body.content_type(), "application/x-www-form-urlencoded");
    assert_eq!(body.bytes().map(|bytes| bytes.as_ref()), Some(&b"filter.size=3&note=a%26b"[..]));
    assert_eq!(request.content_type(), Some("application/x-www-form-urlencoded"));
    assert!(request.query().is_empty());
}

#[rstest]
#[case::default_json(None, None, "application/json")]
#[case::declared_header(Some("application/xml"), None, "application/xml")]
#[case::configured_default(None, Some("text/plain"), "text/plain")]
fn leaves_body_pending(
    codec: ParameterCodec,
    target: Arc<EndpointTarget>,
    #[case] declared: Option<&str>,
    #[case] default: Option<&str>,
    #[case] expected: &str,
) {
    let mut create = target
        .method("create(item)")
        .post("/items")
        .param(ParameterDeclaration::body("item", TypeDescriptor::Any));
    if let Some(content_type) = declared {
        create = create.header("Content-Type", content_type);
    }
    let mut builder = EndpointRequestBuilder::new(&codec);
    if let Some(content_type) = default {
        builder = builder.default_content_type(content_type);
    }

    let item = Value::from(Composite::new("Item").with("name", "lamp"));
    let request = builder
        .build(&metadata(&create), std::slice::from_ref(&item))
        .expect("bound request");
    assert_eq!(
        request.body(),
        Some(&RequestBody::Pending {
            value: item,
            content_type: expected.to_owned(),
        })
    );
    assert_eq!(request.content_type(), Some(expected));

    let encoded = request.with_encoded_body(bytes::Bytes::from_static(b"{}"));
    assert_eq!(encoded.body().and_then(RequestBody::bytes).map(|bytes| bytes.as_ref()), Some(&b"{}"[..]));
}

#[rstest]
fn rejects_wrong_argument_count(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let list = target.method("list()").get("/items");
    let error = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&list), &[Value::Integer(1)])
        .expect_err("too many arguments");
    assert!(matches!(
        error,
        EndpointError::Binding(BindingError::ArgumentCount {
            expected: 0,
            actual: 1,
            ..
        })
    ));
}

#[rstest]
#[case::null_path(Value::Null, "MissingArgument")]
#[case::wrong_type(Value::from("forty-two"), "IncompatibleArgument")]
fn rejects_bad_path_arguments(
    codec: ParameterCodec,
    target: Arc<EndpointTarget>,
    #[case] argument: Value,
    #[case] variant: &str,
) {
    let find = target
        .method("find(id)")
        .get("/items/{id}")
        .param(ParameterDeclaration::path("id", TypeDescriptor::Integer));
    let error = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&find), &[argument])
        .expect_err("bad argument");
    match error {
        EndpointError::Binding(binding) => {
            assert!(format!("{binding:?}").starts_with(variant), "got {binding:?}");
        }
        other => panic!("expected binding error, got {other:?}"),
    }
}

#[rstest]
fn rejects_invalid_header_values(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let tagged = target
        .method("tagged(tag)")
        .get("/items")
        .param(ParameterDeclaration::header("x-tag", TypeDescriptor::Text));
    let error = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&tagged), &[Value::from("line\nbreak")])
        .expect_err("newline in header");
    assert!(matches!(error, EndpointError::Binding(BindingError::InvalidHeader { .. })));
}

#[rstest]
fn content_type_header_survives_for_bodies(codec: ParameterCodec, target: Arc<EndpointTarget>) {
    let create = target
        .method("create(item)")
        .put("/items")
        .param(ParameterDeclaration::body("item", TypeDescriptor::Text));
    let request = EndpointRequestBuilder::new(&codec)
        .build(&metadata(&create), &[Value::from("lamp")])
        .expect("bound request");
    assert_eq!(
        request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
}
