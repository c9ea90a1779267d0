//! Test doubles for driving a
//! [`EndpointExecutor`](restframe::executor::EndpointExecutor) without a
//! network.
//!
//! [`StubTransport`] answers with scripted responses and records every
//! request it is handed, so tests can assert on both sides of a call.
//!
//! ```rust
//! use http::StatusCode;
//! use restframe::executor::EndpointExecutor;
//! use restframe_testing::{StubTransport, responses};
//!
//! let transport = StubTransport::new().respond(responses::json(StatusCode::OK, "{}"));
//! let executor = EndpointExecutor::builder(transport.clone()).build();
//! # let _ = executor;
//! assert_eq!(transport.dispatches(), 0);
//! ```

mod logging;
mod metrics;
pub mod responses;
mod transport;

pub use logging::{LoggerHandle, logger};
pub use metrics::{MetricsSnapshot, debugging_recorder_setup};
pub use transport::{FailingTransport, StubTransport};
