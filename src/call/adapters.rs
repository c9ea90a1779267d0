//! The standard return-shape adapters.

use http::{HeaderMap, StatusCode, header::LINK};
use tokio::runtime::Handle;

use super::{Call, CallAdapter, DeferredCall, Page, Returned};
use crate::{
    error::{Result, TypeMismatchError},
    value::{Shape, TypeDescriptor, Value},
};

const TOTAL_COUNT: &str = "x-total-count";

fn has_shape(returns: &TypeDescriptor, shape: &Shape) -> bool { returns.shape() == Some(shape) }

/// Unwrap the body of a raw invocation result.
fn into_body(returned: Returned) -> Returned {
    match returned {
        Returned::Entity(entity) => Returned::Value(entity.into_body()),
        other => other,
    }
}

fn check(expected: &TypeDescriptor, value: &Value) -> Result<()> {
    if expected.conforms(value) {
        Ok(())
    } else {
        Err(TypeMismatchError {
            expected: expected.clone(),
            found: value.kind(),
        }
        .into())
    }
}

/// Terminal fallback: returns the decoded body unchanged once it conforms to
/// the declared type.
///
/// When the stage before it accepts null (an optional or a collection), a
/// null body is passed through for that stage to interpret.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityAdapter {
    nullable: bool,
}

impl IdentityAdapter {
    #[must_use]
    pub fn new(nullable: bool) -> Self { Self { nullable } }
}

impl CallAdapter for IdentityAdapter {
    fn name(&self) -> &str { "identity" }

    fn handles(&self, _returns: &TypeDescriptor) -> bool { true }

    fn inner_type(&self, _returns: &TypeDescriptor) -> Option<TypeDescriptor> { None }

    fn body_type(&self, returns: &TypeDescriptor) -> TypeDescriptor { returns.clone() }

    fn adapt(&self, returns: &TypeDescriptor, call: Call) -> Result<Returned> {
        match into_body(call()?) {
            Returned::Value(value) => {
                if !(self.nullable && value.is_null()) {
                    check(returns, &value)?;
                }
                Ok(Returned::Value(value))
            }
            other => Ok(other),
        }
    }
}

/// `Optional<T>`: `None` for a null or empty body and for 404 responses.
#[derive(Clone, Copy, Debug, Default)]
pub struct OptionalAdapter;

impl CallAdapter for OptionalAdapter {
    fn name(&self) -> &str { "optional" }

    fn handles(&self, returns: &TypeDescriptor) -> bool { has_shape(returns, &Shape::Optional) }

    fn inner_type(&self, returns: &TypeDescriptor) -> Option<TypeDescriptor> { returns.inner().cloned() }

    fn accepts_null(&self) -> bool { true }

    fn adapt(&self, _returns: &TypeDescriptor, call: Call) -> Result<Returned> {
        match call() {
            Ok(Returned::Value(Value::Null)) => Ok(Returned::Optional(None)),
            Ok(returned) => Ok(Returned::Optional(Some(Box::new(returned)))),
            Err(error) if error.status_code() == Some(StatusCode::NOT_FOUND) => {
                tracing::debug!("treating 404 as an empty optional");
                Ok(Returned::Optional(None))
            }
            Err(error) => Err(error),
        }
    }
}

/// `Collection<T>`: decodes a sequence of `T`; a null body is an empty
/// collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct CollectionAdapter;

impl CallAdapter for CollectionAdapter {
    fn name(&self) -> &str { "collection" }

    fn handles(&self, returns: &TypeDescriptor) -> bool { has_shape(returns, &Shape::Collection) }

    fn inner_type(&self, returns: &TypeDescriptor) -> Option<TypeDescriptor> {
        returns.inner().cloned().map(TypeDescriptor::sequence)
    }

    fn accepts_null(&self) -> bool { true }

    fn adapt(&self, _returns: &TypeDescriptor, call: Call) -> Result<Returned> {
        match call()? {
            Returned::Value(Value::Null) => Ok(Returned::Value(Value::Sequence(Vec::new()))),
            other => Ok(other),
        }
    }
}

/// `Deferred<T>`: runs the rest of the chain on a blocking thread of a tokio
/// runtime and returns a [`DeferredCall`] immediately.
///
/// Without a configured runtime handle the ambient runtime is used.
#[derive(Clone, Debug, Default)]
pub struct DeferredAdapter {
    runtime: Option<Handle>,
}

impl DeferredAdapter {
    #[must_use]
    pub fn new(runtime: Option<Handle>) -> Self { Self { runtime } }
}

impl CallAdapter for DeferredAdapter {
    fn name(&self) -> &str { "deferred" }

    fn handles(&self, returns: &TypeDescriptor) -> bool { has_shape(returns, &Shape::Deferred) }

    fn inner_type(&self, returns: &TypeDescriptor) -> Option<TypeDescriptor> { returns.inner().cloned() }

    fn adapt(&self, _returns: &TypeDescriptor, call: Call) -> Result<Returned> {
        let runtime = match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current()?,
        };
        Ok(Returned::Deferred(DeferredCall::spawn(&runtime, call)))
    }
}

/// `Paginated<T>`: one page of `T`s plus the `Link: <..>; rel="next"`
/// cursor and the `X-Total-Count` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaginatedAdapter;

impl CallAdapter for PaginatedAdapter {
    fn name(&self) -> &str { "paginated" }

    fn handles(&self, returns: &TypeDescriptor) -> bool { has_shape(returns, &Shape::Paginated) }

    fn inner_type(&self, _returns: &TypeDescriptor) -> Option<TypeDescriptor> { None }

    fn body_type(&self, returns: &TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::sequence(returns.inner().cloned().unwrap_or(TypeDescriptor::Any))
    }

    fn accepts_null(&self) -> bool { true }

    fn adapt(&self, returns: &TypeDescriptor, call: Call) -> Result<Returned> {
        let expected = self.body_type(returns);
        match call()? {
            Returned::Entity(entity) => {
                let next = next_link(entity.headers());
                let total = total_count(entity.headers());
                let items = match entity.into_body() {
                    Value::Null => Vec::new(),
                    Value::Sequence(items) => items,
                    other => {
                        return Err(TypeMismatchError {
                            expected,
                            found: other.kind(),
                        }
                        .into());
                    }
                };
                let element = returns.inner().cloned().unwrap_or(TypeDescriptor::Any);
                for item in &items {
                    check(&element, item)?;
                }
                Ok(Returned::Page(Page::new(items, next, total)))
            }
            other => Ok(other),
        }
    }
}

/// `Response<T>`: status, headers and the body decoded as `T`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseAdapter;

impl CallAdapter for ResponseAdapter {
    fn name(&self) -> &str { "response" }

    fn handles(&self, returns: &TypeDescriptor) -> bool { has_shape(returns, &Shape::Response) }

    fn inner_type(&self, _returns: &TypeDescriptor) -> Option<TypeDescriptor> { None }

    fn adapt(&self, returns: &TypeDescriptor, call: Call) -> Result<Returned> {
        let returned = call()?;
        match &returned {
            Returned::Entity(entity) if !entity.body().is_null() => check(&self.body_type(returns), entity.body())?,
            _ => {}
        }
        Ok(returned)
    }
}

/// Target of the first `rel="next"` entry across all `Link` headers.
pub(crate) fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let mut parts = link.split(';');
            let target = parts
                .next()?
                .trim()
                .strip_prefix('<')?
                .strip_suffix('>')?;
            let is_next = parts.any(|parameter| {
                let Some((name, value)) = parameter.split_once('=') else {
                    return false;
                };
                name.trim().eq_ignore_ascii_case("rel")
                    && value
                        .trim()
                        .trim_matches('"')
                        .split_ascii_whitespace()
                        .any(|rel| rel.eq_ignore_ascii_case("next"))
            });
            is_next.then(|| target.to_owned())
        })
}

fn total_count(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(TOTAL_COUNT)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
