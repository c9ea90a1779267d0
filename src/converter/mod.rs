//! Content negotiation.
//!
//! A [`MessageConverter`] reads and writes bodies of one content type.
//! [`MessageConverters`] is the frozen table the executor consults: lookup is
//! by exact content type first, then by the first registered converter whose
//! content type is a prefix of the requested one, so `application/json` also
//! serves `application/json;charset=utf-8`.

mod form;
mod json;
mod octet;
mod text;

use std::{fmt, sync::Arc};

use bytes::{Bytes, BytesMut};
pub use form::FormUrlEncodedMessageConverter;
pub use json::JsonMessageConverter;
pub use octet::OctetStreamMessageConverter;
pub use text::TextMessageConverter;

use crate::{
    error::{ConverterError, EndpointError, MediaTypeMismatch, Result, UnsupportedMediaTypeError},
    form::ParameterCodec,
    response::EndpointResponse,
    value::{TypeDescriptor, Value},
};

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Reads and writes bodies of a single content type.
pub trait MessageConverter: Send + Sync {
    /// Content type served by this converter, e.g. `application/json`.
    fn content_type(&self) -> &str;

    /// Returns true when bodies can be decoded as `ty`.
    fn can_read(&self, ty: &TypeDescriptor) -> bool;

    /// Decode the body of `response` as `ty`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConverterError`] when the body is malformed for `ty`.
    fn read(&self, response: &EndpointResponse, ty: &TypeDescriptor) -> std::result::Result<Value, ConverterError>;

    /// Returns true when `value` can be encoded.
    fn can_write(&self, value: &Value) -> bool;

    /// Encode `value` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConverterError`] when `value` cannot be encoded.
    fn write(&self, value: &Value, sink: &mut BytesMut) -> std::result::Result<(), ConverterError>;
}

/// Frozen table of converters keyed by content type.
///
/// # Examples
///
/// ```
/// use restframe::{
///     converter::{JsonMessageConverter, MessageConverters},
///     value::TypeDescriptor,
/// };
///
/// let converters = MessageConverters::builder()
///     .register(JsonMessageConverter)
///     .build();
/// let json = converters
///     .converter_for("application/json;charset=utf-8")
///     .expect("prefix match");
/// assert_eq!(json.content_type(), "application/json");
/// assert!(converters.reader_for(Some("text/csv"), &TypeDescriptor::Text).is_err());
/// ```
#[derive(Clone, Default)]
pub struct MessageConverters {
    converters: Vec<Arc<dyn MessageConverter>>,
}

impl MessageConverters {
    #[must_use]
    pub fn builder() -> MessageConvertersBuilder { MessageConvertersBuilder::default() }

    /// JSON, plain text, HTML, form-urlencoded and octet-stream converters.
    /// Form objects are flattened with `codec`.
    #[must_use]
    pub fn standard(codec: &ParameterCodec) -> Self {
        Self::builder()
            .register(JsonMessageConverter)
            .register(TextMessageConverter::plain())
            .register(TextMessageConverter::html())
            .register(FormUrlEncodedMessageConverter::new(codec.clone()))
            .register(OctetStreamMessageConverter)
            .build()
    }

    /// Converter for `content_type`: exact match first, then the first
    /// registered converter whose content type is a prefix of it.
    /// Comparison ignores ASCII case and surrounding whitespace.
    #[must_use]
    pub fn converter_for(&self, content_type: &str) -> Option<&dyn MessageConverter> {
        let requested = content_type.trim();
        self.converters
            .iter()
            .find(|converter| converter.content_type().eq_ignore_ascii_case(requested))
            .or_else(|| {
                self.converters
                    .iter()
                    .find(|converter| starts_with_ignore_case(requested, converter.content_type()))
            })
            .map(|converter| &**converter)
    }

    /// Converter able to decode `ty` from a body of `content_type`.
    ///
    /// # Errors
    ///
    /// Returns an [`UnsupportedMediaTypeError`] when the content type is
    /// missing, unknown, or its converter cannot read `ty`.
    pub fn reader_for(
        &self,
        content_type: Option<&str>,
        ty: &TypeDescriptor,
    ) -> std::result::Result<&dyn MessageConverter, UnsupportedMediaTypeError> {
        let content_type = content_type.ok_or_else(UnsupportedMediaTypeError::missing)?;
        let converter = self
            .converter_for(content_type)
            .ok_or_else(|| UnsupportedMediaTypeError::new(content_type, MediaTypeMismatch::NoConverter))?;
        if converter.can_read(ty) {
            Ok(converter)
        } else {
            Err(UnsupportedMediaTypeError::new(
                content_type,
                MediaTypeMismatch::CannotRead(ty.clone()),
            ))
        }
    }

    /// Converter able to encode `value` as `content_type`.
    ///
    /// # Errors
    ///
    /// Returns an [`UnsupportedMediaTypeError`] when no converter is
    /// registered for the content type or it cannot write `value`.
    pub fn writer_for(
        &self,
        content_type: &str,
        value: &Value,
    ) -> std::result::Result<&dyn MessageConverter, UnsupportedMediaTypeError> {
        let converter = self
            .converter_for(content_type)
            .ok_or_else(|| UnsupportedMediaTypeError::new(content_type, MediaTypeMismatch::NoConverter))?;
        if converter.can_write(value) {
            Ok(converter)
        } else {
            Err(UnsupportedMediaTypeError::new(
                content_type,
                MediaTypeMismatch::CannotWrite(value.kind()),
            ))
        }
    }

    /// Decode `response` as `ty`.
    ///
    /// A response without a `Content-Type` header is read as `text/plain`
    /// when `ty` is `Text`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::UnsupportedMediaType`] when no converter
    /// applies and [`EndpointError::Decode`] when the converter fails.
    pub fn read(&self, response: &EndpointResponse, ty: &TypeDescriptor) -> Result<Value> {
        let content_type = response
            .content_type()
            .or_else(|| (*ty == TypeDescriptor::Text).then_some(TEXT_PLAIN));
        let converter = self.reader_for(content_type, ty)?;
        converter.read(response, ty).map_err(EndpointError::Decode)
    }

    /// Encode `value` as `content_type`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::UnsupportedMediaType`] when no converter
    /// applies and [`EndpointError::Encode`] when the converter fails.
    pub fn write(&self, content_type: &str, value: &Value) -> Result<Bytes> {
        let converter = self.writer_for(content_type, value)?;
        let mut sink = BytesMut::new();
        converter
            .write(value, &mut sink)
            .map_err(EndpointError::Encode)?;
        Ok(sink.freeze())
    }

    /// Registered content types in registration order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.converters.iter().map(|converter| converter.content_type())
    }

    #[must_use]
    pub fn len(&self) -> usize { self.converters.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.converters.is_empty() }
}

impl fmt::Debug for MessageConverters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.content_types()).finish()
    }
}

/// Collects converters for a [`MessageConverters`] table.
#[derive(Default)]
pub struct MessageConvertersBuilder {
    converters: Vec<Arc<dyn MessageConverter>>,
}

impl MessageConvertersBuilder {
    /// Register `converter`, replacing one already registered for the same
    /// content type in place.
    #[must_use]
    pub fn register<C>(self, converter: C) -> Self
    where
        C: MessageConverter + 'static,
    {
        self.register_shared(Arc::new(converter))
    }

    /// Register an already shared converter.
    #[must_use]
    pub fn register_shared(mut self, converter: Arc<dyn MessageConverter>) -> Self {
        match self
            .converters
            .iter_mut()
            .find(|existing| existing.content_type().eq_ignore_ascii_case(converter.content_type()))
        {
            Some(existing) => *existing = converter,
            None => self.converters.push(converter),
        }
        self
    }

    /// Freeze the table.
    #[must_use]
    pub fn build(self) -> MessageConverters {
        MessageConverters {
            converters: self.converters,
        }
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}
