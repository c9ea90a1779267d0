#![doc(html_root_url = "https://docs.rs/restframe/latest")]
//! Public API for the `restframe` library.
//!
//! `restframe` turns declared HTTP endpoints into calls. An endpoint is
//! described once (verb, path template, headers, parameter roles and the
//! declared return type) and executed many times against a pluggable
//! [`Transport`](transport::Transport):
//!
//! - [`contract`] resolves declarations into cached [`EndpointMetadata`].
//! - [`form`] flattens composite values into ordered key/value parameters.
//! - [`request`] binds call arguments into an [`EndpointRequest`].
//! - [`converter`] encodes and decodes bodies by content type.
//! - [`call`] adapts the decoded result to the declared return shape.
//! - [`executor`] drives the whole path.
//!
//! [`EndpointMetadata`]: contract::EndpointMetadata
//! [`EndpointRequest`]: request::EndpointRequest

pub mod call;
pub mod contract;
pub mod converter;
pub mod error;
pub mod executor;
pub mod form;
pub mod metrics;
pub mod prelude;
pub mod request;
pub mod response;
pub mod transport;
pub mod value;

pub use error::{EndpointError, Result};
pub use executor::{EndpointExecutor, ExecutorBuilder};
pub use metrics::{CALLS_TOTAL, CONTRACT_RESOLUTIONS};
