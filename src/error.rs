//! Canonical error and result types for the crate.
//!
//! Errors fall into five families. [`ContractError`] reports a malformed
//! endpoint or form declaration and is raised once, at resolution time.
//! [`BindingError`], [`UnsupportedMediaTypeError`], [`TypeMismatchError`] and
//! [`TransportError`] are per-call failures surfaced by
//! [`EndpointExecutor::execute`](crate::executor::EndpointExecutor::execute).
//! [`EndpointError`] wraps all of them so callers can match a single type.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;

use crate::value::TypeDescriptor;

type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// A malformed endpoint or form declaration.
///
/// Contract errors are programming errors in the declaration. They are cached
/// alongside successful resolutions, so the type is `Clone` and repeated
/// resolution of the same declaration returns an equal error.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContractError {
    /// No HTTP verb was declared for the endpoint.
    #[error("endpoint {endpoint} does not declare an HTTP verb")]
    MissingVerb { endpoint: String },
    /// A `{name}` placeholder in the path has no PATH parameter.
    #[error("path variable {{{variable}}} of endpoint {endpoint} has no matching parameter")]
    UnboundPathVariable { endpoint: String, variable: String },
    /// A PATH parameter never appears in the path template.
    #[error("path parameter {parameter} of endpoint {endpoint} does not appear in the path")]
    UnusedPathParameter { endpoint: String, parameter: String },
    /// A `{name}` placeholder in a header value has no parameter.
    #[error("header {header} of endpoint {endpoint} references unknown parameter {variable}")]
    UnboundHeaderVariable {
        endpoint: String,
        header: String,
        variable: String,
    },
    /// A path or header template has an unbalanced brace.
    #[error("malformed template {template:?} on endpoint {endpoint}")]
    MalformedTemplate { endpoint: String, template: String },
    /// More than one parameter claims the BODY role.
    #[error("endpoint {endpoint} declares more than one body parameter")]
    MultipleBodies { endpoint: String },
    /// BODY and FORM parameters both target the request body.
    #[error("endpoint {endpoint} mixes body and form parameters")]
    BodyAndForm { endpoint: String },
    /// A parameter carries a role annotation the engine does not know.
    #[error("parameter {parameter} of endpoint {endpoint} has unrecognised role {role:?}")]
    UnrecognisedRole {
        endpoint: String,
        parameter: String,
        role: String,
    },
    /// Two parameters share a name.
    #[error("endpoint {endpoint} declares parameter {parameter} twice")]
    DuplicateParameter { endpoint: String, parameter: String },
    /// A composite type was used as a form object without being declared as one.
    #[error("composite type {type_name} is not declared as a form object")]
    NotAForm { type_name: String },
    /// Two fields of a form object serialise to the same name.
    #[error("form object {type_name} declares field name {field} twice")]
    DuplicateFormField { type_name: String, field: String },
}

/// Failure to bind call arguments into a request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindingError {
    /// The argument list length differs from the declared parameters.
    #[error("endpoint {endpoint} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        endpoint: String,
        expected: usize,
        actual: usize,
    },
    /// A required argument was null.
    #[error("argument for parameter {parameter} is required")]
    MissingArgument { parameter: String },
    /// An argument does not conform to the declared parameter type.
    #[error("argument for parameter {parameter} should be {expected}, found {found}")]
    IncompatibleArgument {
        parameter: String,
        expected: TypeDescriptor,
        found: &'static str,
    },
    /// A value has no textual form (for example a nested sequence in a path).
    #[error("{found} value for {key} cannot be rendered as text")]
    NotRenderable { key: String, found: &'static str },
    /// A scalar was flattened without any key to bind it to.
    #[error("cannot flatten a bare {found} value without a name")]
    MissingKey { found: &'static str },
    /// A header name or value is not valid HTTP.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
    /// No field with this serialised name exists on the form object.
    #[error("form object {type_name} has no field named {field}")]
    UnknownField { type_name: String, field: String },
    /// Text could not be coerced into the declared field type.
    #[error("cannot coerce {value:?} into {expected} for field {field}")]
    Coercion {
        field: String,
        value: String,
        expected: TypeDescriptor,
    },
}

/// Why no converter could be used for a content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaTypeMismatch {
    /// No converter is registered for the content type.
    NoConverter,
    /// The response carried no content type to select a converter with.
    MissingContentType,
    /// A converter matched but cannot read the target type.
    CannotRead(TypeDescriptor),
    /// A converter matched but cannot write the value.
    CannotWrite(&'static str),
}

/// No converter is available for a content type and target.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("unsupported media type {}: {}", display_content_type(.content_type), display_mismatch(.reason))]
pub struct UnsupportedMediaTypeError {
    /// Requested content type, if any.
    pub content_type: Option<String>,
    /// Why the lookup failed.
    pub reason: MediaTypeMismatch,
}

impl UnsupportedMediaTypeError {
    /// Build an error for `content_type` with the given `reason`.
    #[must_use]
    pub fn new(content_type: impl Into<String>, reason: MediaTypeMismatch) -> Self {
        Self {
            content_type: Some(content_type.into()),
            reason,
        }
    }

    /// Build an error for a response that carried no content type.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            content_type: None,
            reason: MediaTypeMismatch::MissingContentType,
        }
    }
}

fn display_content_type(content_type: &Option<String>) -> &str {
    content_type.as_deref().unwrap_or("<none>")
}

fn display_mismatch(reason: &MediaTypeMismatch) -> String {
    match reason {
        MediaTypeMismatch::NoConverter => "no converter registered".to_owned(),
        MediaTypeMismatch::MissingContentType => "response has no content type".to_owned(),
        MediaTypeMismatch::CannotRead(ty) => format!("converter cannot read {ty}"),
        MediaTypeMismatch::CannotWrite(kind) => format!("converter cannot write {kind} values"),
    }
}

/// A decoded value does not satisfy the declared return type.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct TypeMismatchError {
    /// Declared type.
    pub expected: TypeDescriptor,
    /// Kind of the value actually produced.
    pub found: &'static str,
}

/// Coarse classification of transport failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// Could not reach the peer.
    Connect,
    /// The transport gave up waiting.
    Timeout,
    /// The peer answered with a non-success status.
    Status,
    /// Anything else.
    Other,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Status => "status",
            Self::Other => "other",
        };
        f.write_str(text)
    }
}

/// Opaque failure reported by a [`Transport`](crate::transport::Transport).
///
/// Carries the status code and raw body when the peer answered.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind} transport error{}: {message}", display_status(.status))]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    status: Option<StatusCode>,
    body: Option<Bytes>,
    #[source]
    source: Option<SharedError>,
}

fn display_status(status: &Option<StatusCode>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

impl TransportError {
    /// Create an error of `kind` with a human-readable `message`.
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
            source: None,
        }
    }

    /// Connection failure caused by `source`.
    #[must_use]
    pub fn connect<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(TransportErrorKind::Connect, source.to_string()).with_source(source)
    }

    /// Timeout signalled by the transport.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// Non-success status answered by the peer.
    #[must_use]
    pub fn status(status: StatusCode, body: Bytes) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_owned(),
            status: Some(status),
            body: Some(body),
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Failure classification.
    #[must_use]
    pub fn kind(&self) -> TransportErrorKind { self.kind }

    /// Status code, when the peer answered.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> { self.status }

    /// Raw response body, when the peer answered.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> { self.body.as_ref() }

    /// Returns true when the transport signalled a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool { self.kind == TransportErrorKind::Timeout }
}

/// Failure raised by a message converter while encoding or decoding a body.
#[derive(Debug, thiserror::Error)]
#[error("{content_type} converter failed: {message}")]
pub struct ConverterError {
    content_type: String,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConverterError {
    /// Create a converter error for `content_type`.
    #[must_use]
    pub fn new(content_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap `source` raised by the `content_type` converter.
    #[must_use]
    pub fn from_source<E>(content_type: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            content_type: content_type.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Content type of the converter that failed.
    #[must_use]
    pub fn content_type(&self) -> &str { &self.content_type }
}

/// Top-level error type exposed by `restframe`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EndpointError {
    /// The endpoint declaration is malformed.
    #[error("contract error: {0}")]
    Contract(#[from] ContractError),
    /// The call arguments could not be bound into a request.
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),
    /// No converter is available for a body.
    #[error(transparent)]
    UnsupportedMediaType(#[from] UnsupportedMediaTypeError),
    /// The decoded value does not match the declared return type.
    #[error("type mismatch: {0}")]
    TypeMismatch(#[from] TypeMismatchError),
    /// The transport failed or the peer answered with an error status.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The request body converter failed.
    #[error("failed to encode request body")]
    Encode(#[source] ConverterError),
    /// The response body converter failed.
    #[error("failed to decode response body")]
    Decode(#[source] ConverterError),
    /// A deferred call was cancelled or stopped before producing a result.
    #[error("deferred call was cancelled")]
    Cancelled,
    /// A deferred adapter found no runtime to run on.
    #[error("no async runtime available for deferred call")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

impl EndpointError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Contract(_) => "contract",
            Self::Binding(_) => "binding",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::TypeMismatch(_) => "type_mismatch",
            Self::Transport(_) => "transport",
            Self::Encode(_) => "encode",
            Self::Decode(_) => "decode",
            Self::Cancelled => "cancelled",
            Self::NoRuntime(_) => "no_runtime",
        }
    }

    /// Status code carried by a transport failure.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Transport(error) => error.status_code(),
            _ => None,
        }
    }
}

/// Canonical result alias used by `restframe` public APIs.
pub type Result<T> = std::result::Result<T, EndpointError>;
