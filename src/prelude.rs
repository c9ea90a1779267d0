//! Optional convenience imports for declaring and calling endpoints.
//!
//! Kept to the types nearly every caller touches. Converters, adapters and
//! error details are imported from their owning modules.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use restframe::prelude::*;
//!
//! fn declare() -> MethodDescriptor {
//!     let target = Arc::new(EndpointTarget::new("ItemApi"));
//!     target
//!         .method("find(id)")
//!         .get("/items/{id}")
//!         .param(ParameterDeclaration::path("id", TypeDescriptor::Integer))
//!         .returns(TypeDescriptor::optional(TypeDescriptor::composite("Item")))
//! }
//! # let _ = declare();
//! ```

pub use crate::{
    call::Returned,
    contract::{EndpointTarget, MethodDescriptor, ParameterDeclaration},
    error::{EndpointError, Result},
    executor::EndpointExecutor,
    transport::Transport,
    value::{Composite, TypeDescriptor, Value},
};
