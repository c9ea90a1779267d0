//! Declarations of endpoint interfaces and their methods.
//!
//! These are the inputs to metadata resolution. They are plain data and are
//! validated only when resolved into an
//! [`EndpointMetadata`](super::EndpointMetadata).

use std::{fmt, str::FromStr, sync::Arc};

use http::Method;

use crate::value::TypeDescriptor;

/// Type-level declaration shared by every method of an interface.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use restframe::contract::EndpointTarget;
///
/// let target = Arc::new(
///     EndpointTarget::new("ItemApi")
///         .endpoint("http://catalogue.test")
///         .path("/v1")
///         .header("Accept", "application/json"),
/// );
/// let method = target.method("find(id)").get("/items/{id}");
/// assert_eq!(method.signature(), "find(id)");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointTarget {
    pub(crate) name: Arc<str>,
    pub(crate) endpoint: Option<String>,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
}

impl EndpointTarget {
    /// Declare an interface identified by `name`.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Base URL that method paths are resolved against.
    ///
    /// Without one the request URL stays relative and the transport decides
    /// which peer serves it.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Path prefix joined in front of every method path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Static header sent by every method. The value may contain `{name}`
    /// placeholders.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Start declaring the method identified by `signature`.
    #[must_use]
    pub fn method(self: &Arc<Self>, signature: impl Into<Arc<str>>) -> MethodDescriptor {
        MethodDescriptor::new(self, signature)
    }
}

/// Declaration of one callable method of an [`EndpointTarget`].
#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    pub(crate) target: Arc<EndpointTarget>,
    pub(crate) signature: Arc<str>,
    pub(crate) verb: Option<Method>,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) parameters: Vec<ParameterDeclaration>,
    pub(crate) returns: TypeDescriptor,
}

impl MethodDescriptor {
    /// Declare `signature` on `target`. The return type defaults to `Unit`.
    #[must_use]
    pub fn new(target: &Arc<EndpointTarget>, signature: impl Into<Arc<str>>) -> Self {
        Self {
            target: Arc::clone(target),
            signature: signature.into(),
            verb: None,
            path: String::new(),
            headers: Vec::new(),
            parameters: Vec::new(),
            returns: TypeDescriptor::Unit,
        }
    }

    /// Set the verb and path template.
    #[must_use]
    pub fn request(mut self, verb: Method, path: impl Into<String>) -> Self {
        self.verb = Some(verb);
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn get(self, path: impl Into<String>) -> Self { self.request(Method::GET, path) }

    #[must_use]
    pub fn post(self, path: impl Into<String>) -> Self { self.request(Method::POST, path) }

    #[must_use]
    pub fn put(self, path: impl Into<String>) -> Self { self.request(Method::PUT, path) }

    #[must_use]
    pub fn patch(self, path: impl Into<String>) -> Self { self.request(Method::PATCH, path) }

    #[must_use]
    pub fn delete(self, path: impl Into<String>) -> Self { self.request(Method::DELETE, path) }

    /// Set the path template without declaring a verb.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Static header for this method, overriding a type-level header of the
    /// same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a parameter. Arguments bind to parameters by position.
    #[must_use]
    pub fn param(mut self, parameter: ParameterDeclaration) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declared return type.
    #[must_use]
    pub fn returns(mut self, returns: TypeDescriptor) -> Self {
        self.returns = returns;
        self
    }

    #[must_use]
    pub fn target(&self) -> &EndpointTarget { &self.target }

    #[must_use]
    pub fn signature(&self) -> &str { &self.signature }

    /// Cache key identifying this method.
    #[must_use]
    pub fn key(&self) -> MethodKey {
        MethodKey {
            interface: Arc::clone(&self.target.name),
            signature: Arc::clone(&self.signature),
        }
    }
}

/// Identity of a method: owning interface plus signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodKey {
    interface: Arc<str>,
    signature: Arc<str>,
}

impl MethodKey {
    #[must_use]
    pub fn interface(&self) -> &str { &self.interface }

    #[must_use]
    pub fn signature(&self) -> &str { &self.signature }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.interface, self.signature)
    }
}

/// Where an argument ends up in the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterRole {
    /// Substituted into a `{name}` path placeholder.
    Path,
    /// Appended to the query string.
    Query,
    /// Sent as a request header named after the parameter.
    Header,
    /// Encoded as the request body by a message converter.
    Body,
    /// Flattened into a form-urlencoded request body.
    Form,
}

impl ParameterRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
            Self::Form => "form",
        }
    }
}

impl fmt::Display for ParameterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Error returned when parsing an unknown role annotation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised parameter role {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for ParameterRole {
    type Err = UnknownRole;

    fn from_str(role: &str) -> Result<Self, Self::Err> {
        const ROLES: [ParameterRole; 5] = [
            ParameterRole::Path,
            ParameterRole::Query,
            ParameterRole::Header,
            ParameterRole::Body,
            ParameterRole::Form,
        ];
        ROLES
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(role.trim()))
            .ok_or_else(|| UnknownRole(role.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DeclaredRole {
    Known(ParameterRole),
    Annotated(String),
}

/// Declaration of one method parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub(crate) name: String,
    pub(crate) role: DeclaredRole,
    pub(crate) ty: TypeDescriptor,
}

impl ParameterDeclaration {
    /// Parameter `name` with `role` and type `ty`.
    #[must_use]
    pub fn new(name: impl Into<String>, role: ParameterRole, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            role: DeclaredRole::Known(role),
            ty,
        }
    }

    /// Parameter whose role is given as a textual annotation.
    ///
    /// The annotation is parsed case-insensitively when the method is
    /// resolved; an unknown role is a contract error at that point.
    #[must_use]
    pub fn annotated(name: impl Into<String>, role: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            role: DeclaredRole::Annotated(role.into()),
            ty,
        }
    }

    #[must_use]
    pub fn path(name: impl Into<String>, ty: TypeDescriptor) -> Self { Self::new(name, ParameterRole::Path, ty) }

    #[must_use]
    pub fn query(name: impl Into<String>, ty: TypeDescriptor) -> Self { Self::new(name, ParameterRole::Query, ty) }

    #[must_use]
    pub fn header(name: impl Into<String>, ty: TypeDescriptor) -> Self { Self::new(name, ParameterRole::Header, ty) }

    #[must_use]
    pub fn body(name: impl Into<String>, ty: TypeDescriptor) -> Self { Self::new(name, ParameterRole::Body, ty) }

    #[must_use]
    pub fn form(name: impl Into<String>, ty: TypeDescriptor) -> Self { Self::new(name, ParameterRole::Form, ty) }

    #[must_use]
    pub fn name(&self) -> &str { &self.name }
}
