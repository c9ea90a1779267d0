//! Metric helpers for `restframe`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking executed endpoint calls.
pub const CALLS_TOTAL: &str = "restframe_calls_total";
/// Name of the counter tracking endpoint contract resolutions.
pub const CONTRACT_RESOLUTIONS: &str = "restframe_contract_resolutions_total";

/// How a contract resolution was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Served from the metadata cache.
    Cached,
    /// Built from the method description.
    Built,
}

impl Resolution {
    /// Label value recorded for this resolution.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Cached => "cached",
            Resolution::Built => "built",
        }
    }
}

/// Record a completed call. `outcome` is `ok` or an error kind label.
#[cfg_attr(not(feature = "metrics"), expect(unused_variables, reason = "metrics disabled"))]
pub fn inc_calls(outcome: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(CALLS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a contract resolution.
#[cfg_attr(not(feature = "metrics"), expect(unused_variables, reason = "metrics disabled"))]
pub fn inc_resolutions(resolution: Resolution) {
    #[cfg(feature = "metrics")]
    counter!(CONTRACT_RESOLUTIONS, "source" => resolution.as_str()).increment(1);
}
