//! `application/octet-stream` bodies.

use bytes::BytesMut;

use super::{MessageConverter, OCTET_STREAM};
use crate::{
    error::ConverterError,
    response::EndpointResponse,
    value::{TypeDescriptor, Value},
};

/// Passes raw bytes through untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct OctetStreamMessageConverter;

impl MessageConverter for OctetStreamMessageConverter {
    fn content_type(&self) -> &str { OCTET_STREAM }

    fn can_read(&self, ty: &TypeDescriptor) -> bool { matches!(ty, TypeDescriptor::Bytes | TypeDescriptor::Any) }

    fn read(&self, response: &EndpointResponse, _ty: &TypeDescriptor) -> Result<Value, ConverterError> {
        Ok(Value::Bytes(response.body().clone()))
    }

    fn can_write(&self, value: &Value) -> bool { matches!(value, Value::Bytes(_)) }

    fn write(&self, value: &Value, sink: &mut BytesMut) -> Result<(), ConverterError> {
        match value {
            Value::Bytes(bytes) => {
                sink.extend_from_slice(bytes);
                Ok(())
            }
            other => Err(ConverterError::new(
                OCTET_STREAM,
                format!("cannot write {} values as raw bytes", other.kind()),
            )),
        }
    }
}
