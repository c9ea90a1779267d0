//! Adapter selection and chain execution.

use std::{fmt, sync::Arc};

use tokio::runtime::Handle;

use super::{
    Call,
    CallAdapter,
    CollectionAdapter,
    DeferredAdapter,
    IdentityAdapter,
    OptionalAdapter,
    PaginatedAdapter,
    ResponseAdapter,
    Returned,
};
use crate::{error::Result, value::TypeDescriptor};

/// Ordered set of [`CallAdapter`]s.
///
/// Custom adapters registered through the builder are consulted before the
/// standard ones, so they may take over a standard shape as well as handle
/// their own.
///
/// # Examples
///
/// ```
/// use restframe::{call::CallAdapters, value::TypeDescriptor};
///
/// let adapters = CallAdapters::standard();
/// let chain = adapters.select(&TypeDescriptor::optional(TypeDescriptor::composite("Item")));
/// assert_eq!(chain.names().collect::<Vec<_>>(), ["optional", "identity"]);
/// assert_eq!(chain.body_type(), &TypeDescriptor::composite("Item"));
/// ```
#[derive(Clone)]
pub struct CallAdapters {
    adapters: Vec<Arc<dyn CallAdapter>>,
}

impl CallAdapters {
    #[must_use]
    pub fn builder() -> CallAdaptersBuilder { CallAdaptersBuilder::default() }

    /// The standard adapters, with deferred calls on the ambient runtime.
    #[must_use]
    pub fn standard() -> Self { Self::builder().build() }

    /// Compose the adapters needed for `returns`, outermost shape first.
    ///
    /// Each matching adapter either names the inner type still to be
    /// adapted or ends the chain. When no adapter handles the remaining type,
    /// an identity stage ends the chain and decodes the body as that type.
    #[must_use]
    pub fn select(&self, returns: &TypeDescriptor) -> AdapterChain {
        let mut stages: Vec<(Arc<dyn CallAdapter>, TypeDescriptor)> = Vec::new();
        let mut current = returns.clone();
        let mut nullable = false;
        loop {
            let Some(adapter) = self.adapters.iter().find(|adapter| adapter.handles(&current)) else {
                let identity: Arc<dyn CallAdapter> = Arc::new(IdentityAdapter::new(nullable));
                stages.push((identity, current.clone()));
                return AdapterChain {
                    stages,
                    body_type: current,
                    accepts_null: nullable,
                };
            };
            match adapter.inner_type(&current) {
                Some(inner) => {
                    nullable = adapter.accepts_null();
                    stages.push((Arc::clone(adapter), current));
                    current = inner;
                }
                None => {
                    let body_type = adapter.body_type(&current);
                    let accepts_null = adapter.accepts_null();
                    stages.push((Arc::clone(adapter), current));
                    return AdapterChain {
                        stages,
                        body_type,
                        accepts_null,
                    };
                }
            }
        }
    }

    /// Adapter names in consultation order.
    pub fn names(&self) -> impl Iterator<Item = &str> { self.adapters.iter().map(|adapter| adapter.name()) }
}

impl Default for CallAdapters {
    fn default() -> Self { Self::standard() }
}

impl fmt::Debug for CallAdapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_list().entries(self.names()).finish() }
}

/// Builder for [`CallAdapters`].
#[derive(Default)]
pub struct CallAdaptersBuilder {
    custom: Vec<Arc<dyn CallAdapter>>,
    runtime: Option<Handle>,
}

impl CallAdaptersBuilder {
    /// Register a custom adapter ahead of the standard ones.
    #[must_use]
    pub fn register<A>(mut self, adapter: A) -> Self
    where
        A: CallAdapter + 'static,
    {
        self.custom.push(Arc::new(adapter));
        self
    }

    /// Run deferred calls on `runtime` instead of the ambient runtime.
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    #[must_use]
    pub fn build(self) -> CallAdapters {
        let mut adapters = self.custom;
        adapters.push(Arc::new(OptionalAdapter));
        adapters.push(Arc::new(CollectionAdapter));
        adapters.push(Arc::new(DeferredAdapter::new(self.runtime)));
        adapters.push(Arc::new(PaginatedAdapter));
        adapters.push(Arc::new(ResponseAdapter));
        CallAdapters { adapters }
    }
}

/// Adapters selected for one declared return type.
///
/// The chain is fixed per endpoint, so executors build it once and reuse it
/// for every call.
#[derive(Clone)]
pub struct AdapterChain {
    stages: Vec<(Arc<dyn CallAdapter>, TypeDescriptor)>,
    body_type: TypeDescriptor,
    accepts_null: bool,
}

impl AdapterChain {
    /// Type the response body is decoded as.
    #[must_use]
    pub fn body_type(&self) -> &TypeDescriptor { &self.body_type }

    /// Returns true when a missing body means something to the chain, such
    /// as an empty optional or an empty page.
    #[must_use]
    pub fn accepts_null(&self) -> bool { self.accepts_null }

    /// Names of the selected adapters, outermost first.
    pub fn names(&self) -> impl Iterator<Item = &str> { self.stages.iter().map(|(adapter, _)| adapter.name()) }

    /// Number of stages, the terminal one included.
    #[must_use]
    pub fn len(&self) -> usize { self.stages.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.stages.is_empty() }

    /// Run `raw` through every stage.
    ///
    /// The innermost stage receives `raw` itself; each outer stage receives
    /// a thunk running the stages inside it.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `raw` or by an adapter.
    pub fn execute(&self, raw: Call) -> Result<Returned> {
        let Some(((outermost, returns), inner)) = self.stages.split_first() else {
            return raw();
        };
        let call = inner.iter().rev().fold(raw, |call, (adapter, returns)| {
            let adapter = Arc::clone(adapter);
            let returns = returns.clone();
            Box::new(move || adapter.adapt(&returns, call)) as Call
        });
        outermost.adapt(returns, call)
    }
}

impl fmt::Debug for AdapterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterChain")
            .field("stages", &self.names().collect::<Vec<_>>())
            .field("body_type", &self.body_type)
            .field("accepts_null", &self.accepts_null)
            .finish()
    }
}
