//! Span and timing helpers for the executor.
//!
//! Span creation with a configurable level lives here so the call path only
//! deals with entering spans and recording results.

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;
use crate::contract::{EndpointMetadata, MethodDescriptor};

/// Create a span at a level chosen at runtime.
///
/// Each arm expands the matching `tracing::<level>_span!` macro, keeping the
/// span metadata static per arm.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

/// Span around metadata resolution.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion; five match arms are inherent"
)]
pub(crate) fn resolve_span(config: &TracingConfig, method: &MethodDescriptor) -> Span {
    dynamic_span!(
        config.resolve_level,
        "endpoint.resolve",
        endpoint.key = %method.key()
    )
}

/// Span around one call.
///
/// The `result` field is recorded once the adapter chain returns.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn execute_span(config: &TracingConfig, metadata: &EndpointMetadata) -> Span {
    dynamic_span!(
        config.execute_level,
        "endpoint.execute",
        endpoint.key = %metadata.key(),
        endpoint.method = %metadata.verb(),
        endpoint.path = metadata.path().as_str(),
        result = tracing::field::Empty
    )
}

/// Start a timer when timing is enabled.
pub(crate) fn start_timer(enabled: bool) -> Option<Instant> { enabled.then(Instant::now) }

/// Emit the elapsed time when a timer was started.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        let elapsed_us = start.elapsed().as_micros();
        tracing::debug!(elapsed_us = elapsed_us, "operation.timing");
    }
}
