//! Logging Capability
//!
//! Components log through an injected `EngineLogger`, never a global.
//! `TracingLogger` forwards to `tracing`; hosts install the subscriber.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Non-blocking logging sink
pub trait EngineLogger: Send + Sync {
    fn log(&self, level: LogLevel, component: &'static str, message: &str);

    fn debug(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Debug, component, message);
    }

    fn info(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Info, component, message);
    }

    fn warn(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Warn, component, message);
    }

    fn error(&self, component: &'static str, message: &str) {
        self.log(LogLevel::Error, component, message);
    }
}

/// Forwards every entry to the `tracing` dispatcher
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl EngineLogger for TracingLogger {
    fn log(&self, level: LogLevel, component: &'static str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "forgelabels", component, "{}", message),
            LogLevel::Info => tracing::info!(target: "forgelabels", component, "{}", message),
            LogLevel::Warn => tracing::warn!(target: "forgelabels", component, "{}", message),
            LogLevel::Error => tracing::error!(target: "forgelabels", component, "{}", message),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl EngineLogger for NullLogger {
    fn log(&self, _level: LogLevel, _component: &'static str, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub component: String,
    pub message: String,
}

/// Keeps entries in memory so callers can inspect what happened
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count_at(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|e| e.level == level).count()
    }
}

impl EngineLogger for MemoryLogger {
    fn log(&self, level: LogLevel, component: &'static str, message: &str) {
        let entry = LogEntry {
            level,
            component: component.to_string(),
            message: message.to_string(),
        };
        match self.entries.lock() {
            Ok(mut guard) => guard.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
