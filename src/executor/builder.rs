//! Builder for [`EndpointExecutor`].

use std::sync::Arc;

use dashmap::DashMap;

use super::{EndpointExecutor, Inner, tracing_config::TracingConfig};
use crate::{
    call::CallAdapters,
    contract::MetadataCache,
    converter::{APPLICATION_JSON, MessageConverters},
    form::{FormRegistry, ParameterCodec},
    transport::Transport,
};

/// How non-2xx responses are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Non-2xx responses fail with a [`TransportError`] carrying the status
    /// and raw body.
    ///
    /// [`TransportError`]: crate::error::TransportError
    #[default]
    FailOnError,
    /// Every response is decoded and handed to the adapter chain.
    PassThrough,
}

/// Settings shared by every call of an executor.
#[derive(Clone, Debug)]
pub(crate) struct ExecutorConfig {
    pub(crate) status_policy: StatusPolicy,
    pub(crate) default_content_type: String,
    pub(crate) tracing: TracingConfig,
}

/// Collects the collaborators of an [`EndpointExecutor`].
///
/// Everything but the transport has a default: no declared forms, the
/// standard converters and adapters, a fresh metadata cache, the
/// [`StatusPolicy::FailOnError`] policy, and `application/json` for bodies
/// without a declared `Content-Type`.
///
/// # Examples
///
/// ```
/// use restframe::{
///     error::TransportError,
///     executor::{EndpointExecutor, StatusPolicy},
///     request::EndpointRequest,
///     response::EndpointResponse,
/// };
///
/// fn offline(_: &EndpointRequest) -> Result<EndpointResponse, TransportError> {
///     Err(TransportError::timeout("offline"))
/// }
///
/// let executor = EndpointExecutor::builder(offline)
///     .status_policy(StatusPolicy::PassThrough)
///     .build();
/// assert!(executor.metadata_cache().is_empty());
/// ```
pub struct ExecutorBuilder {
    transport: Arc<dyn Transport>,
    forms: Option<Arc<FormRegistry>>,
    converters: Option<MessageConverters>,
    adapters: Option<CallAdapters>,
    cache: Option<Arc<MetadataCache>>,
    config: ExecutorConfig,
}

impl ExecutorBuilder {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            forms: None,
            converters: None,
            adapters: None,
            cache: None,
            config: ExecutorConfig {
                status_policy: StatusPolicy::default(),
                default_content_type: APPLICATION_JSON.to_owned(),
                tracing: TracingConfig::default(),
            },
        }
    }

    /// Form types used for query, form and form-encoded body values.
    #[must_use]
    pub fn forms(mut self, forms: FormRegistry) -> Self {
        self.forms = Some(Arc::new(forms));
        self
    }

    /// Replace the standard converter table.
    ///
    /// The form converter of the standard table shares the executor's form
    /// registry; a replacement table must bring its own.
    #[must_use]
    pub fn converters(mut self, converters: MessageConverters) -> Self {
        self.converters = Some(converters);
        self
    }

    #[must_use]
    pub fn adapters(mut self, adapters: CallAdapters) -> Self {
        self.adapters = Some(adapters);
        self
    }

    /// Share a metadata cache with other executors.
    #[must_use]
    pub fn metadata_cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn status_policy(mut self, policy: StatusPolicy) -> Self {
        self.config.status_policy = policy;
        self
    }

    /// Content type for BODY parameters when the endpoint declares no
    /// `Content-Type` header.
    #[must_use]
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.default_content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn tracing_config(mut self, config: TracingConfig) -> Self {
        self.config.tracing = config;
        self
    }

    #[must_use]
    pub fn build(self) -> EndpointExecutor {
        let codec = ParameterCodec::new(self.forms.unwrap_or_default());
        let converters = self
            .converters
            .unwrap_or_else(|| MessageConverters::standard(&codec));
        EndpointExecutor {
            inner: Arc::new(Inner {
                cache: self.cache.unwrap_or_default(),
                chains: DashMap::new(),
                codec,
                converters,
                adapters: self.adapters.unwrap_or_default(),
                transport: self.transport,
                config: self.config,
            }),
        }
    }
}
