//! Concrete, transport-agnostic requests.
//!
//! An [`EndpointRequest`] is produced per call by the
//! [`EndpointRequestBuilder`] from resolved metadata and the call's
//! arguments. Its body starts out as a [`RequestBody::Pending`] value and is
//! replaced by encoded bytes before the request reaches the transport.

mod builder;

use bytes::Bytes;
pub use builder::EndpointRequestBuilder;
use http::{HeaderMap, Method, header::CONTENT_TYPE};

use crate::{form::Parameters, value::Value};

/// Body of an [`EndpointRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// A value still to be encoded by the converter for `content_type`.
    Pending { value: Value, content_type: String },
    /// Bytes ready for the wire.
    Encoded { bytes: Bytes, content_type: String },
}

impl RequestBody {
    /// Content type the body is (or will be) encoded as.
    #[must_use]
    pub fn content_type(&self) -> &str {
        match self {
            Self::Pending { content_type, .. } | Self::Encoded { content_type, .. } => content_type,
        }
    }

    /// Encoded bytes, once available.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Encoded { bytes, .. } => Some(bytes),
            Self::Pending { .. } => None,
        }
    }
}

/// A fully bound HTTP request.
///
/// The URL includes the encoded query string. Headers are multi-valued and
/// query parameters keep their order, duplicates included.
#[derive(Clone, Debug)]
pub struct EndpointRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Parameters,
    body: Option<RequestBody>,
}

impl EndpointRequest {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        query: Parameters,
        body: Option<RequestBody>,
    ) -> Self {
        let url = if query.is_empty() {
            path
        } else if path.contains('?') {
            format!("{path}&{}", query.query_string())
        } else {
            format!("{path}?{}", query.query_string())
        };
        Self {
            method,
            url,
            headers,
            query,
            body,
        }
    }

    #[must_use]
    pub fn method(&self) -> &Method { &self.method }

    /// Absolute URL when the interface declares an endpoint, otherwise a
    /// path relative to whatever peer the transport picks.
    #[must_use]
    pub fn url(&self) -> &str { &self.url }

    /// URL without the query string.
    #[must_use]
    pub fn path(&self) -> &str { self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path) }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    #[must_use]
    pub fn query(&self) -> &Parameters { &self.query }

    #[must_use]
    pub fn body(&self) -> Option<&RequestBody> { self.body.as_ref() }

    /// Value of the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Replace a pending body with its encoded form.
    #[must_use]
    pub fn with_encoded_body(mut self, bytes: Bytes) -> Self {
        if let Some(body) = self.body.take() {
            self.body = Some(RequestBody::Encoded {
                bytes,
                content_type: match body {
                    RequestBody::Pending { content_type, .. } | RequestBody::Encoded { content_type, .. } => {
                        content_type
                    }
                },
            });
        }
        self
    }
}

#[cfg(test)]
mod tests;
