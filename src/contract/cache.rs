//! Memoised endpoint metadata.
//!
//! The cache is an explicit object rather than process-wide state, so each
//! executor (and each test) can own an independent set of contracts.

use std::sync::Arc;

use dashmap::DashMap;

use super::{
    declaration::{EndpointTarget, MethodDescriptor, MethodKey},
    metadata::EndpointMetadata,
};
use crate::{
    error::ContractError,
    metrics::{self, Resolution},
};

type Resolved = Result<Arc<EndpointMetadata>, ContractError>;

/// Compute-if-absent cache of [`EndpointMetadata`] keyed by [`MethodKey`].
///
/// Failed resolutions are cached as well; resolving a malformed declaration
/// again returns the same [`ContractError`] without rebuilding.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use restframe::{
///     contract::{EndpointTarget, MetadataCache, ParameterDeclaration},
///     value::TypeDescriptor,
/// };
///
/// let target = Arc::new(EndpointTarget::new("ItemApi"));
/// let find = target
///     .method("find(id)")
///     .get("/items/{id}")
///     .param(ParameterDeclaration::path("id", TypeDescriptor::Integer));
///
/// let cache = MetadataCache::new();
/// let first = cache.resolve(&find).expect("valid contract");
/// let second = cache.resolve(&find).expect("valid contract");
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: DashMap<MethodKey, Resolved>,
}

impl MetadataCache {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Resolve `method`, building its metadata on first use.
    ///
    /// Concurrent first resolutions may each build the metadata; the first
    /// one stored is kept and handed to every caller. Only the stored build
    /// counts as `built`, the others count as `cached`.
    ///
    /// # Errors
    ///
    /// Returns the [`ContractError`] raised (now or on an earlier call) while
    /// validating the declaration.
    pub fn resolve(&self, method: &MethodDescriptor) -> Resolved {
        let key = method.key();
        if let Some(cached) = self.entries.get(&key) {
            metrics::inc_resolutions(Resolution::Cached);
            return cached.value().clone();
        }

        let built = EndpointMetadata::resolve(method).map(Arc::new);
        let mut stored = false;
        let resolved = self
            .entries
            .entry(key)
            .or_insert_with(|| {
                stored = true;
                metrics::inc_resolutions(Resolution::Built);
                if let Err(error) = &built {
                    tracing::warn!(method = %method.key(), %error, "rejected endpoint contract");
                }
                built
            })
            .value()
            .clone();
        if !stored {
            metrics::inc_resolutions(Resolution::Cached);
        }
        resolved
    }

    /// Resolve every method of an interface at once.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContractError`] raised by any method.
    pub fn read_type<I>(&self, target: &Arc<EndpointTarget>, methods: I) -> Result<EndpointType, ContractError>
    where
        I: IntoIterator<Item = MethodDescriptor>,
    {
        let methods = methods
            .into_iter()
            .map(|method| self.resolve(&method))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EndpointType {
            target: Arc::clone(target),
            methods,
        })
    }

    /// Cached metadata for `key`, without building it.
    #[must_use]
    pub fn get(&self, key: &MethodKey) -> Option<Resolved> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Number of resolved (or rejected) methods.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Every resolved method of one [`EndpointTarget`].
#[derive(Clone, Debug)]
pub struct EndpointType {
    target: Arc<EndpointTarget>,
    methods: Vec<Arc<EndpointMetadata>>,
}

impl EndpointType {
    #[must_use]
    pub fn target(&self) -> &EndpointTarget { &self.target }

    /// Metadata of the method declared with `signature`.
    #[must_use]
    pub fn find(&self, signature: &str) -> Option<&Arc<EndpointMetadata>> {
        self.methods
            .iter()
            .find(|metadata| metadata.key().signature() == signature)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Arc<EndpointMetadata>> { self.methods.iter() }
}
