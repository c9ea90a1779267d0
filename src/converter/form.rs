//! `application/x-www-form-urlencoded` bodies.

use bytes::BytesMut;

use super::{FORM_URLENCODED, MessageConverter};
use crate::{
    error::ConverterError,
    form::{ParameterCodec, Parameters},
    response::EndpointResponse,
    value::{ANONYMOUS_COMPOSITE, Composite, TypeDescriptor, Value},
};

/// Writes form objects through the [`ParameterCodec`] and reads form
/// bodies back into composites.
///
/// Reading into a declared form type coerces each field into its declared
/// type. Otherwise every field is text, and a repeated key becomes a
/// sequence. An `[i]` suffix on a key is dropped, so indexed fields read
/// back into one sequence.
#[derive(Clone, Debug, Default)]
pub struct FormUrlEncodedMessageConverter {
    codec: ParameterCodec,
}

impl FormUrlEncodedMessageConverter {
    #[must_use]
    pub fn new(codec: ParameterCodec) -> Self { Self { codec } }
}

impl MessageConverter for FormUrlEncodedMessageConverter {
    fn content_type(&self) -> &str { FORM_URLENCODED }

    fn can_read(&self, ty: &TypeDescriptor) -> bool { matches!(ty, TypeDescriptor::Composite(_) | TypeDescriptor::Any) }

    fn read(&self, response: &EndpointResponse, ty: &TypeDescriptor) -> Result<Value, ConverterError> {
        let body = std::str::from_utf8(response.body())
            .map_err(|error| ConverterError::from_source(FORM_URLENCODED, error))?;

        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (key, value) in Parameters::parse(body) {
            let key = strip_index(&key).to_owned();
            match grouped.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, values)) => values.push(value),
                None => grouped.push((key, vec![value])),
            }
        }

        let type_name = ty.composite_name().unwrap_or(ANONYMOUS_COMPOSITE);
        let descriptor = if self.codec.forms().is_declared(type_name) {
            let descriptor = self
                .codec
                .forms()
                .descriptor(type_name)
                .map_err(|error| ConverterError::from_source(FORM_URLENCODED, error))?;
            Some(descriptor)
        } else {
            None
        };

        let mut composite = Composite::new(type_name);
        for (key, mut values) in grouped {
            let value = if values.len() == 1 {
                Value::Text(values.remove(0))
            } else {
                Value::Sequence(values.into_iter().map(Value::Text).collect())
            };
            let Some(descriptor) = &descriptor else {
                composite.set(key, value);
                continue;
            };
            let name = strip_prefix(&key, descriptor.prefix());
            if descriptor.field_by(name).is_none() {
                tracing::debug!(type_name, key = %key, "ignoring unknown form field");
                continue;
            }
            self.codec
                .apply(&mut composite, name, value)
                .map_err(|error| ConverterError::from_source(FORM_URLENCODED, error))?;
        }
        Ok(Value::Composite(composite))
    }

    fn can_write(&self, value: &Value) -> bool { matches!(value, Value::Composite(_)) }

    fn write(&self, value: &Value, sink: &mut BytesMut) -> Result<(), ConverterError> {
        let parameters = self
            .codec
            .flatten(value, "")
            .map_err(|error| ConverterError::from_source(FORM_URLENCODED, error))?;
        sink.extend_from_slice(parameters.query_string().as_bytes());
        Ok(())
    }
}

fn strip_prefix<'k>(key: &'k str, prefix: &str) -> &'k str {
    if prefix.is_empty() {
        return key;
    }
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(key)
}

fn strip_index(key: &str) -> &str {
    match key.strip_suffix(']').and_then(|rest| rest.rsplit_once('[')) {
        Some((name, index)) if !index.is_empty() && index.bytes().all(|byte| byte.is_ascii_digit()) => name,
        _ => key,
    }
}
