//! Validated, immutable form object descriptors.

use std::{collections::HashSet, sync::Arc};

use super::declaration::FormDeclaration;
use crate::{error::ContractError, value::TypeDescriptor};

/// Structural metadata of a form object, shared by every instance of the type.
#[derive(Debug, PartialEq, Eq)]
pub struct FormObjectDescriptor {
    type_name: Arc<str>,
    prefix: String,
    fields: Vec<FormField>,
}

/// One flattened field of a [`FormObjectDescriptor`].
#[derive(Debug, PartialEq, Eq)]
pub struct FormField {
    field: String,
    name: String,
    indexed: bool,
    ty: TypeDescriptor,
    nested: Option<Arc<str>>,
}

impl FormObjectDescriptor {
    /// Validate `declaration` and build its descriptor.
    ///
    /// Nested composite fields keep only the name of their type; the nested
    /// descriptor is looked up when a value is flattened, so cyclic
    /// declarations never recurse here.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::NotAForm`] if the type is not declared as a
    /// form and [`ContractError::DuplicateFormField`] if two fields share a
    /// serialised name.
    pub fn build(declaration: &FormDeclaration) -> Result<Self, ContractError> {
        if !declaration.form {
            return Err(ContractError::NotAForm {
                type_name: declaration.type_name.to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(declaration.fields.len());
        for field in &declaration.fields {
            let name = field
                .serialized
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(&field.field)
                .to_owned();
            if !seen.insert(name.clone()) {
                return Err(ContractError::DuplicateFormField {
                    type_name: declaration.type_name.to_string(),
                    field: name,
                });
            }
            fields.push(FormField {
                field: field.field.clone(),
                name,
                indexed: field.indexed,
                nested: nested_type(&field.ty),
                ty: field.ty.clone(),
            });
        }

        Ok(Self {
            type_name: Arc::clone(&declaration.type_name),
            prefix: declaration.prefix.trim_end_matches('.').to_owned(),
            fields,
        })
    }

    #[must_use]
    pub fn type_name(&self) -> &str { &self.type_name }

    /// Normalised prefix; empty when the form declares none.
    #[must_use]
    pub fn prefix(&self) -> &str { &self.prefix }

    /// Fields in flattening order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] { &self.fields }

    /// Look up a field by its serialised name.
    #[must_use]
    pub fn field_by(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl FormField {
    /// Name of the field on the composite value.
    #[must_use]
    pub fn field(&self) -> &str { &self.field }

    /// Serialised parameter name.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    #[must_use]
    pub fn is_indexed(&self) -> bool { self.indexed }

    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor { &self.ty }

    /// Composite type of the field (or of its elements), if any.
    #[must_use]
    pub fn nested(&self) -> Option<&str> { self.nested.as_deref() }
}

fn nested_type(ty: &TypeDescriptor) -> Option<Arc<str>> {
    match ty {
        TypeDescriptor::Composite(name) => Some(Arc::clone(name)),
        TypeDescriptor::Sequence(inner) => nested_type(inner),
        _ => None,
    }
}
