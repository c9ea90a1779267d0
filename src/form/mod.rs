//! Structured parameter encoding.
//!
//! [`ParameterCodec`] flattens composite values into ordered key/value
//! [`Parameters`] for query strings and form bodies, and binds single
//! textual values back onto composites. The structure of each composite type
//! comes from a [`FormDeclaration`] registered in a [`FormRegistry`].
//!
//! Keys compose left to right with `.`: a field `street` of a nested form
//! stored in field `address` of a form with prefix `person` flattens to
//! `person.address.street`. Indexed repeated fields append `[i]`.

mod coerce;
mod declaration;
mod descriptor;
mod parameters;
mod registry;

use std::sync::Arc;

pub use declaration::{FieldDeclaration, FormDeclaration};
pub use descriptor::{FormField, FormObjectDescriptor};
pub use parameters::Parameters;
pub use registry::{FormRegistry, FormRegistryBuilder};

use crate::{
    error::{BindingError, EndpointError, Result},
    value::{Composite, Value},
};

/// Flattens values into parameters using the declarations of a
/// [`FormRegistry`].
#[derive(Clone, Debug, Default)]
pub struct ParameterCodec {
    forms: Arc<FormRegistry>,
}

impl ParameterCodec {
    #[must_use]
    pub fn new(forms: Arc<FormRegistry>) -> Self { Self { forms } }

    /// Registry backing this codec.
    #[must_use]
    pub fn forms(&self) -> &FormRegistry { &self.forms }

    /// Flatten `value` under `prefix`.
    ///
    /// Composites contribute one pair per non-null field, in declaration
    /// order, under `prefix` joined with the form's own prefix. Sequences
    /// repeat the key for each element. Scalars produce a single pair keyed
    /// by `prefix`. Nulls and empty sequences produce nothing.
    ///
    /// # Errors
    ///
    /// Returns a contract error when a composite is not a declared form and a
    /// binding error when a scalar has no key or no textual form.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use restframe::{
    ///     form::{FieldDeclaration, FormDeclaration, FormRegistry, ParameterCodec},
    ///     value::{Composite, TypeDescriptor},
    /// };
    ///
    /// let forms = FormRegistry::builder()
    ///     .declare(
    ///         FormDeclaration::form("Filter")
    ///             .field(FieldDeclaration::new("size", TypeDescriptor::Integer))
    ///             .field(FieldDeclaration::new("tags", TypeDescriptor::sequence(TypeDescriptor::Text)).indexed()),
    ///     )
    ///     .build();
    /// let codec = ParameterCodec::new(Arc::new(forms));
    /// let filter = Composite::new("Filter").with("size", 10).with("tags", vec!["a", "b"]);
    /// let parameters = codec.flatten(&filter.into(), "").expect("flatten");
    /// assert_eq!(parameters.query_string(), "size=10&tags%5B0%5D=a&tags%5B1%5D=b");
    /// ```
    pub fn flatten(&self, value: &Value, prefix: &str) -> Result<Parameters> {
        let mut parameters = Parameters::new();
        match value {
            Value::Composite(composite) => self.flatten_composite(composite, prefix, &mut parameters)?,
            Value::Null => {}
            scalar if prefix.is_empty() && !matches!(scalar, Value::Sequence(_)) => {
                return Err(BindingError::MissingKey {
                    found: scalar.kind(),
                }
                .into());
            }
            other => self.flatten_value(prefix, other, false, &mut parameters)?,
        }
        Ok(parameters)
    }

    /// Set the field serialised as `name` on `target`, coercing `value` into
    /// the field's declared type.
    ///
    /// # Errors
    ///
    /// Returns a contract error when the composite is not a declared form and
    /// a binding error when the field is unknown or coercion fails.
    pub fn apply(&self, target: &mut Composite, name: &str, value: Value) -> Result<()> {
        let descriptor = self.forms.descriptor(target.type_name())?;
        let Some(field) = descriptor.field_by(name) else {
            return Err(BindingError::UnknownField {
                type_name: target.type_name().to_owned(),
                field: name.to_owned(),
            }
            .into());
        };
        let coerced = coerce::coerce(field.name(), value, field.ty())?;
        target.set(field.field(), coerced);
        Ok(())
    }

    fn flatten_composite(
        &self,
        composite: &Composite,
        prefix: &str,
        parameters: &mut Parameters,
    ) -> Result<()> {
        let descriptor = self.forms.descriptor(composite.type_name())?;
        let base = join(prefix, descriptor.prefix());
        for field in descriptor.fields() {
            let Some(value) = composite.get(field.field()) else {
                continue;
            };
            let key = join(&base, field.name());
            self.flatten_value(&key, value, field.is_indexed(), parameters)?;
        }
        Ok(())
    }

    fn flatten_value(
        &self,
        key: &str,
        value: &Value,
        indexed: bool,
        parameters: &mut Parameters,
    ) -> Result<()> {
        match value {
            Value::Null => Ok(()),
            Value::Composite(nested) => self.flatten_composite(nested, key, parameters),
            Value::Sequence(items) => items.iter().enumerate().try_for_each(|(position, item)| {
                if indexed {
                    self.flatten_value(&format!("{key}[{position}]"), item, indexed, parameters)
                } else {
                    self.flatten_value(key, item, indexed, parameters)
                }
            }),
            scalar => {
                let text = scalar.text_form().ok_or_else(|| {
                    EndpointError::from(BindingError::NotRenderable {
                        key: key.to_owned(),
                        found: scalar.kind(),
                    })
                })?;
                parameters.push(key, text);
                Ok(())
            }
        }
    }
}

fn join(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}.{name}"),
    }
}

#[cfg(test)]
mod tests;
