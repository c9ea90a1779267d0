//! Endpoint execution.
//!
//! [`EndpointExecutor`] drives one call end to end: resolve the endpoint
//! metadata, bind the arguments into a request, encode the body, hand the
//! request to the [`Transport`], decode the response and run the adapter
//! chain selected for the declared return type. Nothing is retried here;
//! retries belong to the transport.

mod builder;
mod tracing_config;
mod tracing_helpers;

use std::{future::IntoFuture as _, sync::Arc};

pub use builder::{ExecutorBuilder, StatusPolicy};
use builder::ExecutorConfig;
use dashmap::DashMap;
use http::StatusCode;
pub use tracing_config::TracingConfig;
use tracing::Instrument as _;

use crate::{
    call::{AdapterChain, CallAdapters, ResponseEntity, Returned},
    contract::{EndpointMetadata, MetadataCache, MethodDescriptor, MethodKey},
    converter::MessageConverters,
    error::{Result, TransportError},
    form::ParameterCodec,
    metrics,
    request::{EndpointRequest, EndpointRequestBuilder, RequestBody},
    response::EndpointResponse,
    transport::Transport,
    value::{TypeDescriptor, Value},
};

/// Executes declared endpoints against a [`Transport`].
///
/// Cloning is cheap; clones share the metadata cache, the selected adapter
/// chains and every collaborator.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use http::StatusCode;
/// use restframe::{
///     contract::{EndpointTarget, ParameterDeclaration},
///     error::TransportError,
///     executor::EndpointExecutor,
///     request::EndpointRequest,
///     response::EndpointResponse,
///     value::{TypeDescriptor, Value},
/// };
///
/// fn echo_path(request: &EndpointRequest) -> Result<EndpointResponse, TransportError> {
///     Ok(EndpointResponse::new(StatusCode::OK)
///         .with_header("Content-Type", "text/plain")
///         .with_body(request.path().to_owned()))
/// }
///
/// let target = Arc::new(EndpointTarget::new("ItemApi"));
/// let find = target
///     .method("find(id)")
///     .get("/items/{id}")
///     .param(ParameterDeclaration::path("id", TypeDescriptor::Integer))
///     .returns(TypeDescriptor::Text);
///
/// let executor = EndpointExecutor::builder(echo_path).build();
/// let returned = executor.invoke(&find, vec![Value::Integer(42)]).expect("call");
/// assert_eq!(returned.into_value(), Some(Value::from("/items/42")));
/// ```
#[derive(Clone)]
pub struct EndpointExecutor {
    inner: Arc<Inner>,
}

struct Inner {
    cache: Arc<MetadataCache>,
    chains: DashMap<MethodKey, Arc<AdapterChain>>,
    codec: ParameterCodec,
    converters: MessageConverters,
    adapters: CallAdapters,
    transport: Arc<dyn Transport>,
    config: ExecutorConfig,
}

impl EndpointExecutor {
    /// Start configuring an executor that sends requests through
    /// `transport`.
    #[must_use]
    pub fn builder<T>(transport: T) -> ExecutorBuilder
    where
        T: Transport + 'static,
    {
        ExecutorBuilder::new(Arc::new(transport))
    }

    /// Resolve the metadata of `method` through the executor's cache.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Contract`](crate::error::EndpointError::Contract)
    /// when the declaration is malformed.
    pub fn resolve(&self, method: &MethodDescriptor) -> Result<Arc<EndpointMetadata>> {
        let span = tracing_helpers::resolve_span(&self.inner.config.tracing, method);
        let _entered = span.enter();
        let start = tracing_helpers::start_timer(self.inner.config.tracing.resolve_timing);
        let resolved = self.inner.cache.resolve(method);
        tracing_helpers::emit_timing_event(start);
        Ok(resolved?)
    }

    /// Resolve `method` and call it with `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::Contract`](crate::error::EndpointError::Contract)
    /// for a malformed declaration and otherwise whatever
    /// [`execute`](Self::execute) returns.
    pub fn invoke(&self, method: &MethodDescriptor, arguments: Vec<Value>) -> Result<Returned> {
        let metadata = self.resolve(method).inspect_err(|error| metrics::inc_calls(error.kind()))?;
        self.execute(&metadata, arguments)
    }

    /// Call the endpoint described by `metadata` with `arguments`.
    ///
    /// The arguments are bound, the body encoded and the response decoded
    /// inside the raw invocation wrapped by the adapter chain, so for a
    /// deferred return type all of that happens on the deferred context and
    /// this returns as soon as the call is started.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`](crate::error::BindingError) for arguments
    /// that do not fit the declaration, an
    /// [`UnsupportedMediaTypeError`](crate::error::UnsupportedMediaTypeError)
    /// when no converter fits a body, a converter failure, a
    /// [`TransportError`], or a
    /// [`TypeMismatchError`](crate::error::TypeMismatchError) when the decoded
    /// value does not match the declared return type.
    pub fn execute(&self, metadata: &Arc<EndpointMetadata>, arguments: Vec<Value>) -> Result<Returned> {
        let config = &self.inner.config.tracing;
        let span = tracing_helpers::execute_span(config, metadata);
        let _entered = span.enter();
        let start = tracing_helpers::start_timer(config.execute_timing);

        let chain = self.chain_for(metadata);
        let inner = Arc::clone(&self.inner);
        let target = Arc::clone(metadata);
        let decode = Decode {
            body_type: chain.body_type().clone(),
            accepts_null: chain.accepts_null(),
        };
        let call_span = span.clone();
        let result = chain.execute(Box::new(move || {
            let _entered = call_span.enter();
            inner.call(&target, &decode, &arguments)
        }));

        let outcome = match &result {
            Ok(_) => "ok",
            Err(error) => error.kind(),
        };
        span.record("result", outcome);
        metrics::inc_calls(outcome);
        tracing_helpers::emit_timing_event(start);
        result
    }

    /// Call `method` and await the result of a deferred return type.
    ///
    /// Non-deferred results are returned as they are.
    ///
    /// # Errors
    ///
    /// As for [`invoke`](Self::invoke), plus
    /// [`EndpointError::Cancelled`](crate::error::EndpointError::Cancelled) when
    /// the deferred call was cancelled.
    pub async fn invoke_async(&self, method: &MethodDescriptor, arguments: Vec<Value>) -> Result<Returned> {
        let span = tracing::debug_span!("endpoint.await", endpoint.key = %method.key());
        match self.invoke(method, arguments)? {
            Returned::Deferred(call) => call.into_future().instrument(span).await,
            other => Ok(other),
        }
    }

    /// Adapter chain for `metadata`, selected on first use.
    fn chain_for(&self, metadata: &EndpointMetadata) -> Arc<AdapterChain> {
        if let Some(chain) = self.inner.chains.get(metadata.key()) {
            return Arc::clone(chain.value());
        }
        let chain = Arc::new(self.inner.adapters.select(metadata.returns()));
        Arc::clone(
            self.inner
                .chains
                .entry(metadata.key().clone())
                .or_insert(chain)
                .value(),
        )
    }

    #[must_use]
    pub fn metadata_cache(&self) -> &Arc<MetadataCache> { &self.inner.cache }

    #[must_use]
    pub fn converters(&self) -> &MessageConverters { &self.inner.converters }

    #[must_use]
    pub fn adapters(&self) -> &CallAdapters { &self.inner.adapters }

    #[must_use]
    pub fn codec(&self) -> &ParameterCodec { &self.inner.codec }

    #[must_use]
    pub fn status_policy(&self) -> StatusPolicy { self.inner.config.status_policy }
}

impl std::fmt::Debug for EndpointExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointExecutor")
            .field("endpoints", &self.inner.cache.len())
            .field("converters", &self.inner.converters)
            .field("adapters", &self.inner.adapters)
            .field("status_policy", &self.inner.config.status_policy)
            .finish_non_exhaustive()
    }
}

/// How the raw invocation decodes the response body.
struct Decode {
    body_type: TypeDescriptor,
    accepts_null: bool,
}

impl Inner {
    /// The raw invocation: bind, encode, send, decode.
    fn call(&self, metadata: &EndpointMetadata, decode: &Decode, arguments: &[Value]) -> Result<Returned> {
        let request = EndpointRequestBuilder::new(&self.codec)
            .default_content_type(&self.config.default_content_type)
            .build(metadata, arguments)?;
        let request = self.encode_body(request)?;

        let response = self.transport.send(&request).map_err(|error| {
            tracing::debug!(%error, url = request.url(), "transport failed");
            error
        })?;
        if self.config.status_policy == StatusPolicy::FailOnError && !response.is_success() {
            let (status, _, body) = response.into_parts();
            tracing::debug!(%status, url = request.url(), "endpoint answered with an error status");
            return Err(TransportError::status(status, body).into());
        }

        let body = self.decode_body(&response, decode)?;
        let (status, headers, _) = response.into_parts();
        Ok(Returned::Entity(ResponseEntity::new(status, headers, body)))
    }

    fn encode_body(&self, request: EndpointRequest) -> Result<EndpointRequest> {
        let bytes = match request.body() {
            Some(RequestBody::Pending { value, content_type }) => self.converters.write(content_type, value)?,
            _ => return Ok(request),
        };
        Ok(request.with_encoded_body(bytes))
    }

    /// An empty body is read by the converter unless the chain gives null a
    /// meaning, so an empty `text/plain` body still decodes as `""`.
    fn decode_body(&self, response: &EndpointResponse, decode: &Decode) -> Result<Value> {
        let body_type = &decode.body_type;
        if *body_type == TypeDescriptor::Unit || response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        if response.body().is_empty() && (decode.accepts_null || body_type.conforms(&Value::Null)) {
            return Ok(Value::Null);
        }
        self.converters.read(response, body_type)
    }
}
