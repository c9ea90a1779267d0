//! Registry of form declarations and their cached descriptors.
//!
//! Declarations are fixed when the registry is built. Descriptors are built
//! lazily on first use and cached for the registry's lifetime, including
//! failures, so a malformed declaration fails identically every time.

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;

use super::{declaration::FormDeclaration, descriptor::FormObjectDescriptor};
use crate::error::ContractError;

type CachedDescriptor = Result<Arc<FormObjectDescriptor>, ContractError>;

/// Concurrent compute-if-absent cache of [`FormObjectDescriptor`]s keyed by
/// composite type name.
///
/// # Examples
///
/// ```
/// use restframe::{
///     form::{FieldDeclaration, FormDeclaration, FormRegistry},
///     value::TypeDescriptor,
/// };
///
/// let registry = FormRegistry::builder()
///     .declare(FormDeclaration::form("Search").field(FieldDeclaration::new("q", TypeDescriptor::Text)))
///     .build();
/// let descriptor = registry.descriptor("Search").expect("Search is a form");
/// assert_eq!(descriptor.fields().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FormRegistry {
    declarations: HashMap<Arc<str>, FormDeclaration>,
    cache: DashMap<Arc<str>, CachedDescriptor>,
}

impl FormRegistry {
    #[must_use]
    pub fn builder() -> FormRegistryBuilder { FormRegistryBuilder::default() }

    /// Return the descriptor for `type_name`, building it on first use.
    ///
    /// Concurrent first calls may build the descriptor more than once; the
    /// first value stored wins and is returned to every caller.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::NotAForm`] for undeclared or non-form types
    /// and any validation error raised while building the descriptor.
    pub fn descriptor(&self, type_name: &str) -> Result<Arc<FormObjectDescriptor>, ContractError> {
        if let Some(cached) = self.cache.get(type_name) {
            return cached.value().clone();
        }

        let Some((key, declaration)) = self.declarations.get_key_value(type_name) else {
            return Err(ContractError::NotAForm {
                type_name: type_name.to_owned(),
            });
        };
        let built = FormObjectDescriptor::build(declaration).map(Arc::new);
        if let Err(error) = &built {
            tracing::warn!(type_name, %error, "rejected form declaration");
        }
        self.cache
            .entry(Arc::clone(key))
            .or_insert(built)
            .value()
            .clone()
    }

    /// Returns true when `type_name` has a declaration.
    #[must_use]
    pub fn is_declared(&self, type_name: &str) -> bool { self.declarations.contains_key(type_name) }

    /// Number of descriptors built so far.
    #[must_use]
    pub fn cached(&self) -> usize { self.cache.len() }
}

/// Collects declarations for a [`FormRegistry`].
#[derive(Debug, Default)]
pub struct FormRegistryBuilder {
    declarations: HashMap<Arc<str>, FormDeclaration>,
}

impl FormRegistryBuilder {
    /// Add a declaration, replacing any earlier one for the same type.
    #[must_use]
    pub fn declare(mut self, declaration: FormDeclaration) -> Self {
        self.declarations
            .insert(Arc::clone(&declaration.type_name), declaration);
        self
    }

    #[must_use]
    pub fn build(self) -> FormRegistry {
        FormRegistry {
            declarations: self.declarations,
            cache: DashMap::new(),
        }
    }
}
