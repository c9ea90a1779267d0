//! Immutable request templates resolved from method declarations.

use std::collections::HashSet;

use http::Method;

use super::{
    declaration::{DeclaredRole, MethodDescriptor, MethodKey, ParameterRole},
    template::Template,
};
use crate::{error::ContractError, value::TypeDescriptor};

/// Validated, immutable description of one endpoint method.
///
/// Built once per [`MethodDescriptor`] and shared by every call through an
/// `Arc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointMetadata {
    key: MethodKey,
    verb: Method,
    endpoint: Option<String>,
    path: Template,
    headers: Vec<HeaderTemplate>,
    parameters: Vec<ParameterMetadata>,
    returns: TypeDescriptor,
}

/// A static header whose value may reference parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderTemplate {
    name: String,
    value: Template,
}

impl HeaderTemplate {
    /// Header name as declared.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Value template, rendered per call.
    #[must_use]
    pub fn value(&self) -> &Template { &self.value }
}

/// A resolved parameter: name, role, argument position and type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterMetadata {
    name: String,
    role: ParameterRole,
    position: usize,
    ty: TypeDescriptor,
}

impl ParameterMetadata {
    /// Name used in templates, query strings, form fields and headers.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Where the argument is placed in the request.
    #[must_use]
    pub fn role(&self) -> ParameterRole { self.role }

    /// Index of the argument bound to this parameter.
    #[must_use]
    pub fn position(&self) -> usize { self.position }

    /// Declared type the argument must conform to.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor { &self.ty }
}

impl EndpointMetadata {
    /// Validate `method` and build its metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractError`] when the declaration has no verb, uses an
    /// unknown role, repeats a parameter name, declares more than one body,
    /// mixes body and form parameters, or has a template whose placeholders
    /// do not line up with its parameters.
    pub fn resolve(method: &MethodDescriptor) -> Result<Self, ContractError> {
        let key = method.key();
        let endpoint = key.to_string();

        let Some(verb) = method.verb.clone() else {
            return Err(ContractError::MissingVerb { endpoint });
        };
        let parameters = resolve_parameters(method, &endpoint)?;

        let path_text = join_path(&method.target.path, &method.path);
        let path = parse_template(&path_text, &endpoint)?;
        for variable in path.variables() {
            let bound = parameters
                .iter()
                .any(|parameter| parameter.role == ParameterRole::Path && parameter.name == variable);
            if !bound {
                return Err(ContractError::UnboundPathVariable {
                    endpoint,
                    variable: variable.to_owned(),
                });
            }
        }
        if let Some(unused) = parameters.iter().find(|parameter| {
            parameter.role == ParameterRole::Path && !path.variables().any(|variable| variable == parameter.name)
        }) {
            return Err(ContractError::UnusedPathParameter {
                endpoint,
                parameter: unused.name.clone(),
            });
        }

        let headers = resolve_headers(method, &parameters, &endpoint)?;

        Ok(Self {
            key,
            verb,
            endpoint: method.target.endpoint.clone(),
            path,
            headers,
            parameters,
            returns: method.returns.clone(),
        })
    }

    #[must_use]
    pub fn key(&self) -> &MethodKey { &self.key }

    #[must_use]
    pub fn verb(&self) -> &Method { &self.verb }

    /// Base URL of the owning interface, if one was declared.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> { self.endpoint.as_deref() }

    /// Full path template, including the interface prefix.
    #[must_use]
    pub fn path(&self) -> &Template { &self.path }

    /// Static headers, type-level first, with method-level overrides applied.
    #[must_use]
    pub fn headers(&self) -> &[HeaderTemplate] { &self.headers }

    /// Parameters in argument order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterMetadata] { &self.parameters }

    /// The parameter bound to `name`, if any.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterMetadata> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    /// The BODY parameter, if any.
    #[must_use]
    pub fn body(&self) -> Option<&ParameterMetadata> {
        self.parameters
            .iter()
            .find(|parameter| parameter.role == ParameterRole::Body)
    }

    /// Returns true when any FORM parameter is declared.
    #[must_use]
    pub fn has_form(&self) -> bool {
        self.parameters
            .iter()
            .any(|parameter| parameter.role == ParameterRole::Form)
    }

    #[must_use]
    pub fn returns(&self) -> &TypeDescriptor { &self.returns }
}

fn resolve_parameters(method: &MethodDescriptor, endpoint: &str) -> Result<Vec<ParameterMetadata>, ContractError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(method.parameters.len());
    for (position, declaration) in method.parameters.iter().enumerate() {
        let role = match &declaration.role {
            DeclaredRole::Known(role) => *role,
            DeclaredRole::Annotated(text) => text.parse().map_err(|_| ContractError::UnrecognisedRole {
                endpoint: endpoint.to_owned(),
                parameter: declaration.name.clone(),
                role: text.clone(),
            })?,
        };
        if !seen.insert(declaration.name.as_str()) {
            return Err(ContractError::DuplicateParameter {
                endpoint: endpoint.to_owned(),
                parameter: declaration.name.clone(),
            });
        }
        resolved.push(ParameterMetadata {
            name: declaration.name.clone(),
            role,
            position,
            ty: declaration.ty.clone(),
        });
    }

    let count = |role| resolved.iter().filter(|parameter| parameter.role == role).count();
    let bodies = count(ParameterRole::Body);
    if bodies > 1 {
        return Err(ContractError::MultipleBodies {
            endpoint: endpoint.to_owned(),
        });
    }
    if bodies == 1 && count(ParameterRole::Form) > 0 {
        return Err(ContractError::BodyAndForm {
            endpoint: endpoint.to_owned(),
        });
    }
    Ok(resolved)
}

fn resolve_headers(
    method: &MethodDescriptor,
    parameters: &[ParameterMetadata],
    endpoint: &str,
) -> Result<Vec<HeaderTemplate>, ContractError> {
    let mut headers: Vec<HeaderTemplate> = Vec::new();
    for (name, value) in method.target.headers.iter().chain(&method.headers) {
        let value = parse_template(value, endpoint)?;
        if let Some(variable) = value
            .variables()
            .find(|variable| !parameters.iter().any(|parameter| parameter.name == *variable))
        {
            return Err(ContractError::UnboundHeaderVariable {
                endpoint: endpoint.to_owned(),
                header: name.clone(),
                variable: variable.to_owned(),
            });
        }
        let header = HeaderTemplate {
            name: name.clone(),
            value,
        };
        match headers
            .iter_mut()
            .find(|existing| existing.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => *existing = header,
            None => headers.push(header),
        }
    }
    Ok(headers)
}

fn parse_template(raw: &str, endpoint: &str) -> Result<Template, ContractError> {
    Template::parse(raw).ok_or_else(|| ContractError::MalformedTemplate {
        endpoint: endpoint.to_owned(),
        template: raw.to_owned(),
    })
}

/// Join an interface prefix and a method path with a single `/`.
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
    }
}
