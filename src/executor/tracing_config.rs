//! Tracing configuration for endpoint execution.
//!
//! [`TracingConfig`] controls the level of the spans emitted around metadata
//! resolution and call execution, and whether elapsed-time events are
//! recorded for them.

use tracing::Level;

/// Controls tracing span levels and per-call timing for an executor.
///
/// Both `endpoint.resolve` and `endpoint.execute` spans default to `DEBUG`.
/// Timing is disabled by default; when enabled for an operation, an event
/// recording `elapsed_us` is emitted at `DEBUG` level when it completes.
///
/// # Examples
///
/// ```
/// use restframe::executor::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_execute_level(Level::INFO)
///     .with_execute_timing(true);
/// let _ = config;
/// ```
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub(crate) execute_level: Level,
    pub(crate) resolve_level: Level,
    pub(crate) execute_timing: bool,
    pub(crate) resolve_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            execute_level: Level::DEBUG,
            resolve_level: Level::DEBUG,
            execute_timing: false,
            resolve_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the level of the `endpoint.execute` span.
    #[must_use]
    pub fn with_execute_level(mut self, level: Level) -> Self {
        self.execute_level = level;
        self
    }

    /// Enable or disable timing of `execute`.
    ///
    /// For deferred return shapes the measured time covers starting the
    /// call, not its completion.
    #[must_use]
    pub fn with_execute_timing(mut self, enabled: bool) -> Self {
        self.execute_timing = enabled;
        self
    }

    /// Set the level of the `endpoint.resolve` span.
    #[must_use]
    pub fn with_resolve_level(mut self, level: Level) -> Self {
        self.resolve_level = level;
        self
    }

    #[must_use]
    pub fn with_resolve_timing(mut self, enabled: bool) -> Self {
        self.resolve_timing = enabled;
        self
    }

    /// Set the level of every span at once.
    ///
    /// # Examples
    ///
    /// ```
    /// use restframe::executor::TracingConfig;
    /// use tracing::Level;
    ///
    /// let config = TracingConfig::default().with_all_levels(Level::TRACE);
    /// let _ = config;
    /// ```
    #[must_use]
    pub fn with_all_levels(mut self, level: Level) -> Self {
        self.execute_level = level;
        self.resolve_level = level;
        self
    }

    /// Enable or disable timing for every operation at once.
    #[must_use]
    pub fn with_all_timing(mut self, enabled: bool) -> Self {
        self.execute_timing = enabled;
        self.resolve_timing = enabled;
        self
    }
}
