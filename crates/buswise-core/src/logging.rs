//! Logging helpers shared by every buswise crate.
//!
//! Events are emitted through `tracing` with a `module` field so that the
//! planner, the model backends and the HTTP surface can be filtered
//! independently. Binaries decide how events are rendered.

#[doc(hidden)]
pub use tracing as __tracing;

/// Verbosity level used by the buswise binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Failures surfaced to callers
    Error,
    /// Retries and degraded behaviour
    Warn,
    /// Lifecycle events (plans produced, server started)
    Info,
    /// Request/response details
    Debug,
    /// Everything
    Trace,
}

impl Level {
    /// Map a `-v` count to a level, starting from `Warn`.
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Level::Warn,
            1 => Level::Info,
            2 => Level::Debug,
            _ => Level::Trace,
        }
    }

    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter())
    }
}

#[macro_export]
macro_rules! log_error {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::__tracing::event!($crate::logging::__tracing::Level::ERROR, module = $module, $($arg)*)
    }
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::__tracing::event!($crate::logging::__tracing::Level::WARN, module = $module, $($arg)*)
    }
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::__tracing::event!($crate::logging::__tracing::Level::INFO, module = $module, $($arg)*)
    }
}

#[macro_export]
macro_rules! log_debug {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::__tracing::event!($crate::logging::__tracing::Level::DEBUG, module = $module, $($arg)*)
    }
}

#[macro_export]
macro_rules! log_trace {
    ($module:expr, $($arg:tt)*) => {
        $crate::logging::__tracing::event!($crate::logging::__tracing::Level::TRACE, module = $module, $($arg)*)
    }
}
