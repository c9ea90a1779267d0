//! Endpoint contracts.
//!
//! An interface is declared as an [`EndpointTarget`] plus a set of
//! [`MethodDescriptor`]s. Each method is validated once into an immutable
//! [`EndpointMetadata`] and memoised in a [`MetadataCache`]; a malformed
//! declaration fails with a [`ContractError`](crate::error::ContractError)
//! that is cached just like a successful resolution.

mod cache;
mod declaration;
mod metadata;
mod template;

pub use cache::{EndpointType, MetadataCache};
pub use declaration::{
    EndpointTarget,
    MethodDescriptor,
    MethodKey,
    ParameterDeclaration,
    ParameterRole,
    UnknownRole,
};
pub use metadata::{EndpointMetadata, HeaderTemplate, ParameterMetadata};
pub(crate) use metadata::join_path;
pub use template::{Segment, Template};
