//! Logging collaborators for the rewrite hook.

use std::fmt;

/// Default target used for rewrite records.
pub const DEFAULT_LOG_TARGET: &str = "socks5_mapping";

/// Sink for rewrite records: formats and emits a single line.
pub trait RewriteLogger: Send + Sync {
    fn log_line(&self, args: fmt::Arguments<'_>);
}

impl<F> RewriteLogger for F
where
    F: Fn(fmt::Arguments<'_>) + Send + Sync,
{
    fn log_line(&self, args: fmt::Arguments<'_>) {
        self(args)
    }
}

/// Emits rewrite records as `tracing` events at INFO level.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteLogger for TracingLogger {
    fn log_line(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: DEFAULT_LOG_TARGET, "{}", args);
    }
}

/// Emits rewrite records through the `log` facade.
#[derive(Debug, Clone)]
pub struct LogLogger {
    target: String,
    level: log::Level,
}

impl LogLogger {
    /// Create a logger writing INFO records to [`DEFAULT_LOG_TARGET`].
    pub fn new() -> Self {
        Self {
            target: DEFAULT_LOG_TARGET.to_string(),
            level: log::Level::Info,
        }
    }

    /// Set the record target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the record level.
    pub fn with_level(mut self, level: log::Level) -> Self {
        self.level = level;
        self
    }
}

impl Default for LogLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl RewriteLogger for LogLogger {
    fn log_line(&self, args: fmt::Arguments<'_>) {
        log::log!(target: &self.target, self.level, "{}", args);
    }
}
