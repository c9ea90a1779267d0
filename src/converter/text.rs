//! `text/*` bodies.

use bytes::BytesMut;

use super::{MessageConverter, TEXT_HTML, TEXT_PLAIN};
use crate::{
    error::ConverterError,
    response::EndpointResponse,
    value::{TypeDescriptor, Value},
};

/// Reads bodies as UTF-8 text and writes any scalar's textual form.
#[derive(Clone, Copy, Debug)]
pub struct TextMessageConverter {
    content_type: &'static str,
}

impl TextMessageConverter {
    /// `text/plain` converter.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            content_type: TEXT_PLAIN,
        }
    }

    /// `text/html` converter.
    #[must_use]
    pub fn html() -> Self {
        Self {
            content_type: TEXT_HTML,
        }
    }
}

impl MessageConverter for TextMessageConverter {
    fn content_type(&self) -> &str { self.content_type }

    fn can_read(&self, ty: &TypeDescriptor) -> bool { matches!(ty, TypeDescriptor::Text | TypeDescriptor::Any) }

    fn read(&self, response: &EndpointResponse, _ty: &TypeDescriptor) -> Result<Value, ConverterError> {
        String::from_utf8(response.body().to_vec())
            .map(Value::Text)
            .map_err(|error| ConverterError::from_source(self.content_type, error))
    }

    fn can_write(&self, value: &Value) -> bool { value.text_form().is_some() }

    fn write(&self, value: &Value, sink: &mut BytesMut) -> Result<(), ConverterError> {
        let text = value.text_form().ok_or_else(|| {
            ConverterError::new(self.content_type, format!("{} values have no textual form", value.kind()))
        })?;
        sink.extend_from_slice(text.as_bytes());
        Ok(())
    }
}
