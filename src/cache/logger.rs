//! Cache Logger Module
//!
//! Logging hook injected into the cache manager through its configuration.

use std::fmt::Debug;

/// Receives log lines from the cache manager.
///
/// Methods return nothing, so logging can never fail a cache operation.
pub trait CacheLogger: Send + Sync + Debug {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

// == Tracing Logger ==
/// Forwards log lines to `tracing` under the `health_cache` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl CacheLogger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "health_cache", "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "health_cache", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "health_cache", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "health_cache", "{}", message);
    }
}

// == Test Support ==
/// Captures log lines with their level for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLogger {
    lines: std::sync::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl RecordingLogger {
    pub(crate) fn lines_at(&self, level: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    fn record(&self, level: &'static str, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}

#[cfg(test)]
impl CacheLogger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.record("debug", message);
    }

    fn info(&self, message: &str) {
        self.record("info", message);
    }

    fn warn(&self, message: &str) {
        self.record("warn", message);
    }

    fn error(&self, message: &str) {
        self.record("error", message);
    }
}
