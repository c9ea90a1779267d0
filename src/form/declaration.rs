//! Static declarations of composite types used as form objects.
//!
//! A declaration is the explicit replacement for field annotations: it lists
//! which fields take part in parameter flattening, under which serialised
//! name, and whether repeated values are index-expanded.

use std::sync::Arc;

use crate::value::TypeDescriptor;

/// Declaration of one composite type.
///
/// # Examples
///
/// ```
/// use restframe::{
///     form::{FieldDeclaration, FormDeclaration},
///     value::TypeDescriptor,
/// };
///
/// let person = FormDeclaration::form("Person")
///     .prefix("person")
///     .field(FieldDeclaration::new("name", TypeDescriptor::Text))
///     .field(
///         FieldDeclaration::new("emails", TypeDescriptor::sequence(TypeDescriptor::Text))
///             .named("email")
///             .indexed(),
///     );
/// assert!(person.is_form());
/// ```
#[derive(Clone, Debug)]
pub struct FormDeclaration {
    pub(crate) type_name: Arc<str>,
    pub(crate) form: bool,
    pub(crate) prefix: String,
    pub(crate) fields: Vec<FieldDeclaration>,
}

impl FormDeclaration {
    /// Declare `type_name` as a form object.
    #[must_use]
    pub fn form(type_name: impl Into<Arc<str>>) -> Self {
        Self {
            type_name: type_name.into(),
            form: true,
            prefix: String::new(),
            fields: Vec::new(),
        }
    }

    /// Declare `type_name` without marking it as a form object.
    ///
    /// Such a type is known to the registry but cannot be flattened;
    /// resolving its descriptor fails with a contract error.
    #[must_use]
    pub fn plain(type_name: impl Into<Arc<str>>) -> Self {
        Self {
            form: false,
            ..Self::form(type_name)
        }
    }

    /// Name prefix applied to every field of this form.
    ///
    /// A trailing `.` is ignored; an empty prefix means no prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Append a field. Fields flatten in declaration order.
    #[must_use]
    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str { &self.type_name }

    #[must_use]
    pub fn is_form(&self) -> bool { self.form }
}

/// Declaration of one form field.
#[derive(Clone, Debug)]
pub struct FieldDeclaration {
    pub(crate) field: String,
    pub(crate) serialized: Option<String>,
    pub(crate) indexed: bool,
    pub(crate) ty: TypeDescriptor,
}

impl FieldDeclaration {
    /// Field `field` of type `ty`, serialised under its own name.
    #[must_use]
    pub fn new(field: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            field: field.into(),
            serialized: None,
            indexed: false,
            ty,
        }
    }

    /// Serialise the field under `name` instead of the field name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.serialized = Some(name.into());
        self
    }

    /// Expand repeated values as `name[0]`, `name[1]`, ...
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}
