//! Raw responses handed back by a [`Transport`](crate::transport::Transport).

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE};

/// Status, headers and body of an HTTP response.
///
/// Produced by the transport and consumed once by a message converter.
///
/// # Examples
///
/// ```
/// use http::StatusCode;
/// use restframe::response::EndpointResponse;
///
/// let response = EndpointResponse::new(StatusCode::OK)
///     .with_header("Content-Type", "application/json")
///     .with_body(r#"{"id":1}"#);
/// assert_eq!(response.content_type(), Some("application/json"));
/// assert!(response.is_success());
/// ```
#[derive(Clone, Debug, Default)]
pub struct EndpointResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl EndpointResponse {
    /// Response with `status`, no headers and an empty body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Assemble a response from its parts.
    #[must_use]
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self { status, headers, body }
    }

    /// Append a header. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            self.headers.append(name, value);
        } else {
            tracing::debug!(name, "ignoring invalid response header");
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn status(&self) -> StatusCode { self.status }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    #[must_use]
    pub fn body(&self) -> &Bytes { &self.body }

    /// Value of the `Content-Type` header, if present and valid text.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    #[must_use]
    pub fn is_success(&self) -> bool { self.status.is_success() }

    /// Split into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) { (self.status, self.headers, self.body) }
}
