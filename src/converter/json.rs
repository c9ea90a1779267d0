//! `application/json` bodies via `serde_json`.

use bytes::{BufMut, BytesMut};

use super::{APPLICATION_JSON, MessageConverter};
use crate::{
    error::ConverterError,
    response::EndpointResponse,
    value::{TypeDescriptor, Value, from_json, to_json},
};

/// Reads and writes JSON.
///
/// Decoding is guided by the target descriptor: a composite descriptor
/// yields a [`Composite`](crate::value::Composite) of that type with fields
/// in document order, and numbers decode as integers or floats as declared.
/// An empty body decodes to null.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonMessageConverter;

impl MessageConverter for JsonMessageConverter {
    fn content_type(&self) -> &str { APPLICATION_JSON }

    fn can_read(&self, ty: &TypeDescriptor) -> bool { !matches!(ty, TypeDescriptor::Bytes) }

    fn read(&self, response: &EndpointResponse, ty: &TypeDescriptor) -> Result<Value, ConverterError> {
        let body = response.body();
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        let json: serde_json::Value =
            serde_json::from_slice(body).map_err(|error| ConverterError::from_source(APPLICATION_JSON, error))?;
        from_json(json, ty).map_err(|message| ConverterError::new(APPLICATION_JSON, message))
    }

    fn can_write(&self, value: &Value) -> bool { !matches!(value, Value::Bytes(_)) }

    fn write(&self, value: &Value, sink: &mut BytesMut) -> Result<(), ConverterError> {
        serde_json::to_writer(sink.writer(), &to_json(value))
            .map_err(|error| ConverterError::from_source(APPLICATION_JSON, error))
    }
}
