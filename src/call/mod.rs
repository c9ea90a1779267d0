//! Return-shape adaptation.
//!
//! The executor performs one raw invocation per call: bind, send, decode.
//! What the caller gets back depends on the declared return type. A
//! [`CallAdapter`] handles one outer shape of that type (optional,
//! collection, deferred, paginated, full response, or a custom shape) and
//! [`CallAdapters`] composes adapters outer-to-inner into an
//! [`AdapterChain`] that wraps the raw invocation. Types no adapter handles
//! fall through to an identity stage that checks the decoded value against
//! the declared type.

mod adapters;
mod deferred;
mod registry;

use std::{any::Any, fmt};

pub use adapters::{
    CollectionAdapter,
    DeferredAdapter,
    IdentityAdapter,
    OptionalAdapter,
    PaginatedAdapter,
    ResponseAdapter,
};
pub use deferred::DeferredCall;
use http::{HeaderMap, StatusCode};
pub use registry::{AdapterChain, CallAdapters, CallAdaptersBuilder};

use crate::{
    error::Result,
    value::{TypeDescriptor, Value},
};

/// A not-yet-executed invocation producing a [`Returned`].
pub type Call = Box<dyn FnOnce() -> Result<Returned> + Send + 'static>;

/// Adapts an invocation to one return shape.
///
/// Adapters are asked, outermost shape first, whether they handle the
/// declared type. A composable adapter names the inner type it still needs
/// adapted and receives a thunk for the rest of the chain. A terminal adapter
/// receives the raw invocation, which yields a [`Returned::Entity`].
pub trait CallAdapter: Send + Sync {
    /// Short name used in logs and debug output.
    fn name(&self) -> &str;

    /// Returns true when this adapter handles the outer shape of `returns`.
    fn handles(&self, returns: &TypeDescriptor) -> bool;

    /// Type the rest of the chain must produce, or `None` when this adapter
    /// consumes the raw response itself.
    fn inner_type(&self, returns: &TypeDescriptor) -> Option<TypeDescriptor>;

    /// Type the response body is decoded as when this adapter is terminal.
    fn body_type(&self, returns: &TypeDescriptor) -> TypeDescriptor {
        returns.inner().cloned().unwrap_or_else(|| returns.clone())
    }

    /// Returns true when a null result from the inner chain is meaningful
    /// to this adapter.
    fn accepts_null(&self) -> bool { false }

    /// Produce the adapted result from `call`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `call` and reports adapter-specific failures.
    fn adapt(&self, returns: &TypeDescriptor, call: Call) -> Result<Returned>;
}

/// Result of an adapted call.
pub enum Returned {
    /// A plain decoded value.
    Value(Value),
    /// An optional result; `None` for null bodies and 404 responses.
    Optional(Option<Box<Returned>>),
    /// Status, headers and decoded body.
    Entity(ResponseEntity),
    /// One page of a paginated collection.
    Page(Page),
    /// A call running on another thread.
    Deferred(DeferredCall),
    /// Produced by a custom adapter.
    Custom(Box<dyn Any + Send>),
}

impl Returned {
    /// The plain value, if this is one.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The optional result, if this is one.
    #[must_use]
    pub fn into_optional(self) -> Option<Option<Returned>> {
        match self {
            Self::Optional(inner) => Some(inner.map(|boxed| *boxed)),
            _ => None,
        }
    }

    /// The response entity, if this is one.
    #[must_use]
    pub fn into_entity(self) -> Option<ResponseEntity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// The page, if this is one.
    #[must_use]
    pub fn into_page(self) -> Option<Page> {
        match self {
            Self::Page(page) => Some(page),
            _ => None,
        }
    }

    /// The deferred call, if this is one.
    #[must_use]
    pub fn into_deferred(self) -> Option<DeferredCall> {
        match self {
            Self::Deferred(call) => Some(call),
            _ => None,
        }
    }

    /// Downcast a custom result.
    #[must_use]
    pub fn into_custom<T: Any>(self) -> Option<T> {
        match self {
            Self::Custom(value) => value.downcast().ok().map(|boxed| *boxed),
            _ => None,
        }
    }
}

impl fmt::Debug for Returned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
            Self::Entity(entity) => f.debug_tuple("Entity").field(entity).finish(),
            Self::Page(page) => f.debug_tuple("Page").field(page).finish(),
            Self::Deferred(call) => f.debug_tuple("Deferred").field(call).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A decoded response with its status and headers.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseEntity {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl ResponseEntity {
    /// Wrap a decoded `body` with the response's status and headers.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Value) -> Self { Self { status, headers, body } }

    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode { self.status }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Decoded body.
    #[must_use]
    pub fn body(&self) -> &Value { &self.body }

    /// Consume the entity, keeping only the body.
    #[must_use]
    pub fn into_body(self) -> Value { self.body }
}

/// One page of results and the cursor to the next.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    items: Vec<Value>,
    next: Option<String>,
    total: Option<u64>,
}

impl Page {
    /// Build a page from its items, next-page target and total count.
    #[must_use]
    pub fn new(items: Vec<Value>, next: Option<String>, total: Option<u64>) -> Self { Self { items, next, total } }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[Value] { &self.items }

    /// Consume the page, keeping only its items.
    #[must_use]
    pub fn into_items(self) -> Vec<Value> { self.items }

    /// Target of the `Link` header's `rel="next"` entry.
    #[must_use]
    pub fn next(&self) -> Option<&str> { self.next.as_deref() }

    /// Whether a further page exists.
    #[must_use]
    pub fn has_next(&self) -> bool { self.next.is_some() }

    /// Value of the `X-Total-Count` header.
    #[must_use]
    pub fn total(&self) -> Option<u64> { self.total }
}

#[cfg(test)]
mod tests;
