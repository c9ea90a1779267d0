//! Best-effort textual coercion for form field binding.

use crate::{
    error::BindingError,
    value::{TypeDescriptor, Value},
};

/// Coerce `value` into `ty` for `field`.
///
/// Values that already conform pass through unchanged. Scalars are otherwise
/// parsed from their textual form: integral, floating, boolean and character
/// targets each use their own parser. Integers widen into floats. Sequence
/// targets coerce each element; a single value becomes a one-element
/// sequence.
pub(crate) fn coerce(field: &str, value: Value, ty: &TypeDescriptor) -> Result<Value, BindingError> {
    if ty.conforms(&value) {
        return Ok(value);
    }

    if let TypeDescriptor::Sequence(element) = ty {
        let items = match value {
            Value::Sequence(items) => items,
            single => vec![single],
        };
        return items
            .into_iter()
            .map(|item| coerce(field, item, element))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence);
    }

    let failure = |value: &Value| BindingError::Coercion {
        field: field.to_owned(),
        value: value.text_form().unwrap_or_else(|| value.kind().to_owned()),
        expected: ty.clone(),
    };

    if let (TypeDescriptor::Float, Value::Integer(integer)) = (ty, &value) {
        #[expect(
            clippy::cast_precision_loss,
            reason = "widening mirrors textual coercion of large integers"
        )]
        return Ok(Value::Float(*integer as f64));
    }

    let Some(text) = value.text_form() else {
        return Err(failure(&value));
    };
    let trimmed = text.trim();

    let coerced = match ty {
        TypeDescriptor::Integer => trimmed.parse().ok().map(Value::Integer),
        TypeDescriptor::Float => trimmed.parse().ok().map(Value::Float),
        TypeDescriptor::Bool => parse_bool(trimmed).map(Value::Bool),
        TypeDescriptor::Char => text.chars().next().map(Value::Char),
        TypeDescriptor::Text => Some(Value::Text(text)),
        TypeDescriptor::Shaped(_, inner) => return coerce(field, value, inner),
        _ => None,
    };
    coerced.ok_or_else(|| failure(&value))
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
