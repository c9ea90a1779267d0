//! Binding call arguments onto resolved endpoint metadata.

use bytes::Bytes;
use http::{
    HeaderMap,
    HeaderName,
    HeaderValue,
    header::CONTENT_TYPE,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::{EndpointRequest, RequestBody};
use crate::{
    contract::{EndpointMetadata, ParameterMetadata, ParameterRole, join_path},
    converter::{APPLICATION_JSON, FORM_URLENCODED},
    error::{BindingError, EndpointError, Result},
    form::{ParameterCodec, Parameters},
    value::Value,
};

/// Characters left unescaped in a path segment: RFC 3986 unreserved.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Materialises [`EndpointRequest`]s from metadata and arguments.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use restframe::{
///     contract::{EndpointMetadata, EndpointTarget, ParameterDeclaration},
///     form::ParameterCodec,
///     request::EndpointRequestBuilder,
///     value::{TypeDescriptor, Value},
/// };
///
/// let target = Arc::new(EndpointTarget::new("ItemApi"));
/// let find = target
///     .method("find(id)")
///     .get("/items/{id}")
///     .param(ParameterDeclaration::path("id", TypeDescriptor::Integer));
/// let metadata = EndpointMetadata::resolve(&find).expect("valid contract");
///
/// let codec = ParameterCodec::default();
/// let request = EndpointRequestBuilder::new(&codec)
///     .build(&metadata, &[Value::Integer(42)])
///     .expect("bound request");
/// assert_eq!(request.url(), "/items/42");
/// assert!(request.body().is_none());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EndpointRequestBuilder<'a> {
    codec: &'a ParameterCodec,
    default_content_type: &'a str,
}

impl<'a> EndpointRequestBuilder<'a> {
    /// Builder flattening query and form values with `codec`.
    #[must_use]
    pub fn new(codec: &'a ParameterCodec) -> Self {
        Self {
            codec,
            default_content_type: APPLICATION_JSON,
        }
    }

    /// Content type for BODY parameters when no `Content-Type` header is
    /// declared. Defaults to `application/json`.
    #[must_use]
    pub fn default_content_type(mut self, content_type: &'a str) -> Self {
        self.default_content_type = content_type;
        self
    }

    /// Bind `arguments` to `metadata`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`] when the argument count differs from the
    /// declared parameters, a PATH argument is null, an argument does not
    /// conform to its declared type, or a value cannot be rendered where
    /// text is required.
    pub fn build(&self, metadata: &EndpointMetadata, arguments: &[Value]) -> Result<EndpointRequest> {
        check_arguments(metadata, arguments)?;

        let path = metadata.path().render(|name| render_path_variable(metadata, arguments, name))?;
        let url = match metadata.endpoint() {
            Some(endpoint) => join_path(endpoint, &path),
            None => path,
        };

        let mut query = Parameters::new();
        let mut form = Parameters::new();
        for parameter in metadata.parameters() {
            let argument = &arguments[parameter.position()];
            match parameter.role() {
                ParameterRole::Query => query.append(self.flatten(parameter, argument)?),
                ParameterRole::Form => form.append(self.flatten(parameter, argument)?),
                _ => {}
            }
        }

        let mut headers = static_headers(metadata, arguments)?;
        for parameter in metadata.parameters() {
            if parameter.role() == ParameterRole::Header {
                append_header_argument(&mut headers, parameter, &arguments[parameter.position()])?;
            }
        }

        let body = if metadata.has_form() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
            Some(RequestBody::Encoded {
                bytes: Bytes::from(form.query_string()),
                content_type: FORM_URLENCODED.to_owned(),
            })
        } else {
            self.pending_body(metadata, arguments, &mut headers)?
        };

        Ok(EndpointRequest::new(
            metadata.verb().clone(),
            url,
            headers,
            query,
            body,
        ))
    }

    /// Composites flatten under their own declared prefix; everything else
    /// is keyed by the parameter name.
    fn flatten(&self, parameter: &ParameterMetadata, argument: &Value) -> Result<Parameters> {
        match argument {
            Value::Composite(_) => self.codec.flatten(argument, ""),
            _ => self.codec.flatten(argument, parameter.name()),
        }
    }

    fn pending_body(
        &self,
        metadata: &EndpointMetadata,
        arguments: &[Value],
        headers: &mut HeaderMap,
    ) -> Result<Option<RequestBody>> {
        let Some(parameter) = metadata.body() else {
            return Ok(None);
        };
        let value = &arguments[parameter.position()];
        if value.is_null() {
            return Ok(None);
        }

        let content_type = match headers.get(CONTENT_TYPE) {
            Some(declared) => declared
                .to_str()
                .map_err(|error| invalid_header(CONTENT_TYPE.as_str(), &error))?
                .to_owned(),
            None => {
                let content_type = self.default_content_type.to_owned();
                let header = HeaderValue::from_str(&content_type)
                    .map_err(|error| invalid_header(CONTENT_TYPE.as_str(), &error))?;
                headers.insert(CONTENT_TYPE, header);
                content_type
            }
        };
        Ok(Some(RequestBody::Pending {
            value: value.clone(),
            content_type,
        }))
    }
}

fn check_arguments(metadata: &EndpointMetadata, arguments: &[Value]) -> Result<()> {
    let parameters = metadata.parameters();
    if parameters.len() != arguments.len() {
        return Err(BindingError::ArgumentCount {
            endpoint: metadata.key().to_string(),
            expected: parameters.len(),
            actual: arguments.len(),
        }
        .into());
    }

    for parameter in parameters {
        let argument = &arguments[parameter.position()];
        if argument.is_null() {
            if parameter.role() == ParameterRole::Path {
                return Err(BindingError::MissingArgument {
                    parameter: parameter.name().to_owned(),
                }
                .into());
            }
            continue;
        }
        if !argument_conforms(parameter, argument) {
            return Err(BindingError::IncompatibleArgument {
                parameter: parameter.name().to_owned(),
                expected: parameter.ty().clone(),
                found: argument.kind(),
            }
            .into());
        }
    }
    Ok(())
}

/// Null elements of a sequence are skipped when the argument is flattened
/// or rendered as headers, so only PATH and BODY sequences must be
/// null-free.
fn argument_conforms(parameter: &ParameterMetadata, argument: &Value) -> bool {
    let skips_nulls = matches!(
        parameter.role(),
        ParameterRole::Query | ParameterRole::Form | ParameterRole::Header
    );
    match (parameter.ty().element_type(), argument) {
        (Some(element), Value::Sequence(items)) if skips_nulls => items
            .iter()
            .all(|item| item.is_null() || element.conforms(item)),
        _ => parameter.ty().conforms(argument),
    }
}

fn argument<'v>(metadata: &EndpointMetadata, arguments: &'v [Value], name: &str) -> Result<&'v Value> {
    metadata
        .parameter(name)
        .map(|parameter| &arguments[parameter.position()])
        .ok_or_else(|| {
            BindingError::MissingArgument {
                parameter: name.to_owned(),
            }
            .into()
        })
}

fn render_text(key: &str, value: &Value) -> Result<String> {
    value.text_form().ok_or_else(|| {
        EndpointError::from(BindingError::NotRenderable {
            key: key.to_owned(),
            found: value.kind(),
        })
    })
}

fn render_path_variable(metadata: &EndpointMetadata, arguments: &[Value], name: &str) -> Result<String> {
    let text = render_text(name, argument(metadata, arguments, name)?)?;
    Ok(utf8_percent_encode(&text, PATH_SEGMENT).to_string())
}

/// Render the declared headers. A header referencing a null argument is
/// left out.
fn static_headers(metadata: &EndpointMetadata, arguments: &[Value]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    'headers: for header in metadata.headers() {
        for variable in header.value().variables() {
            if argument(metadata, arguments, variable)?.is_null() {
                continue 'headers;
            }
        }
        let value = header
            .value()
            .render(|name| render_text(name, argument(metadata, arguments, name)?))?;
        headers.insert(header_name(header.name())?, header_value(header.name(), &value)?);
    }
    Ok(headers)
}

fn append_header_argument(headers: &mut HeaderMap, parameter: &ParameterMetadata, argument: &Value) -> Result<()> {
    let values: Vec<&Value> = match argument {
        Value::Null => return Ok(()),
        Value::Sequence(items) => items.iter().filter(|item| !item.is_null()).collect(),
        single => vec![single],
    };
    let name = header_name(parameter.name())?;
    for value in values {
        let text = render_text(parameter.name(), value)?;
        headers.append(name.clone(), header_value(parameter.name(), &text)?);
    }
    Ok(())
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|error| invalid_header(name, &error))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|error| invalid_header(name, &error))
}

fn invalid_header(name: &str, reason: &dyn std::fmt::Display) -> EndpointError {
    BindingError::InvalidHeader {
        name: name.to_owned(),
        reason: reason.to_string(),
    }
    .into()
}
