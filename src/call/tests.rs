//! Unit tests for adapter selection and the standard adapters.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
    mpsc,
};

use http::{HeaderMap, HeaderValue, StatusCode, header::LINK};
use rstest::{fixture, rstest};

use super::*;
use crate::{
    error::{EndpointError, TransportError, TypeMismatchError},
    value::{Composite, Shape},
};

#[fixture]
fn standard() -> CallAdapters { CallAdapters::standard() }

fn item(id: i64) -> Value { Value::from(Composite::new("Item").with("id", id)) }

fn raw(status: StatusCode, body: Value) -> Call {
    Box::new(move || Ok(Returned::Entity(ResponseEntity::new(status, HeaderMap::new(), body))))
}

fn counted(calls: &Arc<AtomicUsize>, body: Value) -> Call {
    let calls = Arc::clone(calls);
    Box::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Returned::Entity(ResponseEntity::new(StatusCode::OK, HeaderMap::new(), body)))
    })
}

#[rstest]
#[case::plain(TypeDescriptor::Integer, &["identity"], TypeDescriptor::Integer)]
#[case::optional(
    TypeDescriptor::optional(TypeDescriptor::Text),
    &["optional", "identity"],
    TypeDescriptor::Text
)]
#[case::collection(
    TypeDescriptor::collection(TypeDescriptor::composite("Item")),
    &["collection", "identity"],
    TypeDescriptor::sequence(TypeDescriptor::composite("Item"))
)]
#[case::deferred_optional(
    TypeDescriptor::deferred(TypeDescriptor::optional(TypeDescriptor::composite("Item"))),
    &["deferred", "optional", "identity"],
    TypeDescriptor::composite("Item")
)]
#[case::paginated(
    TypeDescriptor::paginated(TypeDescriptor::composite("Item")),
    &["paginated"],
    TypeDescriptor::sequence(TypeDescriptor::composite("Item"))
)]
#[case::deferred_response(
    TypeDescriptor::deferred(TypeDescriptor::response(TypeDescriptor::Text)),
    &["deferred", "response"],
    TypeDescriptor::Text
)]
fn selects_outer_to_inner(
    standard: CallAdapters,
    #[case] returns: TypeDescriptor,
    #[case] names: &[&str],
    #[case] body_type: TypeDescriptor,
) {
    let chain = standard.select(&returns);
    assert_eq!(chain.names().collect::<Vec<_>>(), names);
    assert_eq!(chain.body_type(), &body_type);
}

#[rstest]
#[case::plain(TypeDescriptor::Text, false)]
#[case::optional(TypeDescriptor::optional(TypeDescriptor::Text), true)]
#[case::collection(TypeDescriptor::collection(TypeDescriptor::Integer), true)]
#[case::paginated(TypeDescriptor::paginated(TypeDescriptor::Integer), true)]
#[case::response(TypeDescriptor::response(TypeDescriptor::Text), false)]
#[case::deferred_text(TypeDescriptor::deferred(TypeDescriptor::Text), false)]
fn chains_report_whether_null_is_meaningful(
    standard: CallAdapters,
    #[case] returns: TypeDescriptor,
    #[case] accepts_null: bool,
) {
    assert_eq!(standard.select(&returns).accepts_null(), accepts_null);
}

#[rstest]
fn identity_returns_conforming_value(standard: CallAdapters) {
    let chain = standard.select(&TypeDescriptor::composite("Item"));
    let returned = chain.execute(raw(StatusCode::OK, item(1))).expect("adapted");
    assert_eq!(returned.into_value(), Some(item(1)));
}

#[rstest]
fn identity_rejects_mismatched_value(standard: CallAdapters) {
    let chain = standard.select(&TypeDescriptor::composite("Item"));
    let error = chain
        .execute(raw(StatusCode::OK, Value::from("nope")))
        .expect_err("text is not an item");
    assert!(matches!(
        error,
        EndpointError::TypeMismatch(TypeMismatchError { found: "text", .. })
    ));

    let error = chain
        .execute(raw(StatusCode::OK, Value::Null))
        .expect_err("null is not an item");
    assert!(matches!(error, EndpointError::TypeMismatch(_)));
}

#[rstest]
fn optional_maps_null_to_none(standard: CallAdapters) {
    let chain = standard.select(&TypeDescriptor::optional(TypeDescriptor::composite("Item")));
    let returned = chain.execute(raw(StatusCode::OK, Value::Null)).expect("adapted");
    assert!(matches!(returned.into_optional(), Some(None)));

    let returned = chain.execute(raw(StatusCode::OK, item(3))).expect("adapted");
    let inner = returned.into_optional().flatten().expect("present");
    assert_eq!(inner.into_value(), Some(item(3)));
}

#[rstest]
fn optional_maps_not_found_to_none(standard: CallAdapters) {
    let chain = standard.select(&TypeDescriptor::optional(TypeDescriptor::Text));
    let returned = chain
        .execute(Box::new(|| {
            Err(TransportError::status(StatusCode::NOT_FOUND, bytes::Bytes::new()).into())
        }))
        .expect("404 is absent");
    assert!(matches!(returned.into_optional(), Some(None)));

    let error = chain
        .execute(Box::new(|| {
            Err(TransportError::status(StatusCode::BAD_GATEWAY, bytes::Bytes::new()).into())
        }))
        .expect_err("502 still fails");
    assert_eq!(error.status_code(), Some(StatusCode::BAD_GATEWAY));
}

#[rstest]
fn collection_maps_null_to_empty(standard: CallAdapters) {
    let chain = standard.select(&TypeDescriptor::collection(TypeDescriptor::Integer));
    let returned = chain.execute(raw(StatusCode::OK, Value::Null)).expect("adapted");
    assert_eq!(returned.into_value(), Some(Value::Sequence(Vec::new())));

    let returned = chain
        .execute(raw(StatusCode::OK, Value::from(vec![1_i64, 2])))
        .expect("adapted");
    assert_eq!(returned.into_value(), Some(Value::from(vec![1_i64, 2])));
}

#[rstest]
fn paginated_reads_link_and_total(standard: CallAdapters) {
    let chain = standard.select(&TypeDescriptor::paginated(TypeDescriptor::composite("Item")));
    let mut headers = HeaderMap::new();
    headers.insert(
        LINK,
        HeaderValue::from_static(r#"</items?page=1>; rel="prev", </items?page=3>; rel="next""#),
    );
    headers.insert("X-Total-Count", HeaderValue::from_static("41"));
    let body = Value::Sequence(vec![item(1), item(2)]);
    let returned = chain
        .execute(Box::new(move || {
            Ok(Returned::Entity(ResponseEntity::new(StatusCode::OK, headers, body)))
        }))
        .expect("adapted");
    let page = returned.into_page().expect("page");
    assert_eq!(page.items(), [item(1), item(2)]);
    assert_eq!(page.next(), Some("/items?page=3"));
    assert_eq!(page.total(), Some(41));

    let returned = chain.execute(raw(StatusCode::OK, Value::Null)).expect("adapted");
    let page = returned.into_page().expect("page");
    assert!(page.items().is_empty());
    assert!(!page.has_next());
}

#[rstest]
fn response_keeps_status_and_headers(standard: CallAdapters) {
    let chain = standard.select(&TypeDescriptor::response(TypeDescriptor::Text));
    let returned = chain
        .execute(raw(StatusCode::ACCEPTED, Value::from("queued")))
        .expect("adapted");
    let entity = returned.into_entity().expect("entity");
    assert_eq!(entity.status(), StatusCode::ACCEPTED);
    assert_eq!(entity.body(), &Value::from("queued"));
}

#[rstest]
#[case::no_rel(r"</a>", None)]
#[case::quoted_next(r#"</a>; rel="next""#, Some("/a"))]
#[case::bare_next(r"</b>; rel=next", Some("/b"))]
#[case::multiple_rels(r#"</c>; rel="last next""#, Some("/c"))]
#[case::second_entry(r#"</p>; rel="prev", </n>; rel="next""#, Some("/n"))]
fn parses_next_links(#[case] link: &'static str, #[case] expected: Option<&str>) {
    let mut headers = HeaderMap::new();
    headers.insert(LINK, HeaderValue::from_static(link));
    assert_eq!(super::adapters::next_link(&headers).as_deref(), expected);
}

/// Wraps results in a `Box<String>` for `Tagged<T>` return types.
struct Tagged;

impl CallAdapter for Tagged {
    fn name(&self) -> &str { "tagged" }

    fn handles(&self, returns: &TypeDescriptor) -> bool {
        matches!(returns.shape(), Some(Shape::Custom(name)) if name.as_ref() == "Tagged")
    }

    fn inner_type(&self, returns: &TypeDescriptor) -> Option<TypeDescriptor> { returns.inner().cloned() }

    fn adapt(&self, _returns: &TypeDescriptor, call: Call) -> Result<Returned> {
        let returned = call()?;
        Ok(Returned::Custom(Box::new(format!("tagged:{returned:?}"))))
    }
}

#[test]
fn custom_adapters_are_consulted_first() {
    let adapters = CallAdapters::builder().register(Tagged).build();
    assert_eq!(adapters.names().next(), Some("tagged"));

    let returns = TypeDescriptor::shaped(Shape::Custom("Tagged".into()), TypeDescriptor::Integer);
    let chain = adapters.select(&returns);
    assert_eq!(chain.names().collect::<Vec<_>>(), ["tagged", "identity"]);
    let returned = chain
        .execute(raw(StatusCode::OK, Value::Integer(5)))
        .expect("adapted");
    assert_eq!(
        returned.into_custom::<String>().as_deref(),
        Some("tagged:Value(Integer(5))")
    );
}

#[tokio::test]
async fn deferred_optional_runs_raw_call_once() {
    let chain = CallAdapters::standard().select(&TypeDescriptor::deferred(TypeDescriptor::optional(
        TypeDescriptor::composite("Item"),
    )));
    let calls = Arc::new(AtomicUsize::new(0));
    let returned = chain.execute(counted(&calls, item(7))).expect("spawned");
    let deferred = returned.into_deferred().expect("deferred handle");
    let inner = deferred.await.expect("completed");
    let item_value = inner
        .into_optional()
        .flatten()
        .and_then(Returned::into_value)
        .expect("present item");
    assert_eq!(item_value, item(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn deferred_errors_surface_on_await() {
    let chain = CallAdapters::standard().select(&TypeDescriptor::deferred(TypeDescriptor::Integer));
    let returned = chain
        .execute(raw(StatusCode::OK, Value::from("seven")))
        .expect("spawned");
    let error = returned
        .into_deferred()
        .expect("deferred handle")
        .await
        .expect_err("text is not an integer");
    assert!(matches!(error, EndpointError::TypeMismatch(_)));
}

#[tokio::test]
async fn cancelled_deferred_call_reports_cancellation() {
    let chain = CallAdapters::standard().select(&TypeDescriptor::deferred(TypeDescriptor::Integer));
    let (release, gate) = mpsc::channel::<()>();
    let returned = chain
        .execute(Box::new(move || {
            let _ = gate.recv();
            Ok(Returned::Value(Value::Integer(1)))
        }))
        .expect("spawned");
    let deferred = returned.into_deferred().expect("deferred handle");
    deferred.cancel();
    assert!(deferred.is_cancelled());
    let error = deferred.await.expect_err("cancelled");
    assert!(matches!(error, EndpointError::Cancelled));
    drop(release);
}

#[test]
fn deferred_without_runtime_fails() {
    let chain = CallAdapters::standard().select(&TypeDescriptor::deferred(TypeDescriptor::Integer));
    let error = chain
        .execute(raw(StatusCode::OK, Value::Integer(1)))
        .expect_err("no ambient runtime");
    assert!(matches!(error, EndpointError::NoRuntime(_)));
}

#[test]
fn deferred_on_configured_runtime_can_be_waited() {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let chain = CallAdapters::builder()
        .runtime(runtime.handle().clone())
        .build()
        .select(&TypeDescriptor::deferred(TypeDescriptor::Integer));
    let returned = chain
        .execute(raw(StatusCode::OK, Value::Integer(9)))
        .expect("spawned on the configured runtime");
    let value = returned
        .into_deferred()
        .expect("deferred handle")
        .wait()
        .expect("completed")
        .into_value();
    assert_eq!(value, Some(Value::Integer(9)));
}
