//! Leveled logging collaborator injected into the processing core.
//!
//! The core never writes to the console itself. Everything it wants to
//! report goes through a [`Logger`]: [`TracingLogger`] forwards to the
//! `tracing` macros (the binary installs the subscriber), and
//! [`MemoryLogger`] records entries so tests and the JSON output can
//! inspect them.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Verbose => "verbose",
        };
        f.write_str(label)
    }
}

/// Leveled log sink.
///
/// Only [`Logger::log`] must be implemented; the level helpers forward to it.
pub trait Logger {
    /// Record a message at `level`.
    fn log(&self, level: LogLevel, message: &str);

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn verbose(&self, message: &str) {
        self.log(LogLevel::Verbose, message);
    }
}

/// Forwards records to `tracing`. `verbose` maps to `DEBUG`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Verbose => tracing::debug!("{}", message),
        }
    }
}

/// A single recorded log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Records every entry in memory, optionally forwarding to another logger.
///
/// Interior mutability keeps the `&self` signature of [`Logger`]; a
/// `MemoryLogger` belongs to one run and is not shared across threads.
#[derive(Default)]
pub struct MemoryLogger {
    records: RefCell<Vec<LogRecord>>,
    forward: Option<Box<dyn Logger>>,
}

impl MemoryLogger {
    /// Create a logger that only records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logger that records and also forwards to `inner`.
    pub fn forwarding(inner: impl Logger + 'static) -> Self {
        MemoryLogger {
            records: RefCell::new(Vec::new()),
            forward: Some(Box::new(inner)),
        }
    }

    /// Snapshot of all records in emission order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    /// Messages recorded at `level`, in emission order.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(LogLevel::Warn)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(LogLevel::Error)
    }

    /// Number of records at `level`.
    pub fn count(&self, level: LogLevel) -> usize {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.level == level)
            .count()
    }
}

impl fmt::Debug for MemoryLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryLogger")
            .field("records", &self.records.borrow().len())
            .field("forwarding", &self.forward.is_some())
            .finish()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.records.borrow_mut().push(LogRecord {
            level,
            message: message.to_string(),
        });
        if let Some(inner) = &self.forward {
            inner.log(level, message);
        }
    }
}
