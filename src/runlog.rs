//! Run log: the logging context handed to the reconciliation engine.
//!
//! Every entry is kept in memory (so callers and tests can inspect what a run
//! reported) and forwarded to the `log` facade under a fixed target.

use serde::Serialize;
use std::fmt;

/// Default log target for engine output
pub const ENGINE_TARGET: &str = "tabrecon::engine";

/// Severity levels of a run log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    fn level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error | Self::Critical => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// One recorded log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// Collects and forwards log entries for a single reconciliation run
#[derive(Debug)]
pub struct RunLog {
    target: String,
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::with_target(ENGINE_TARGET)
    }

    pub fn with_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            entries: Vec::new(),
        }
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.record(Severity::Debug, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record(Severity::Info, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.record(Severity::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record(Severity::Error, message.into());
    }

    pub fn critical(&mut self, message: impl Into<String>) {
        self.record(Severity::Critical, message.into());
    }

    fn record(&mut self, severity: Severity, message: String) {
        if severity == Severity::Critical {
            log::log!(target: self.target.as_str(), severity.level(), "CRITICAL: {}", message);
        } else {
            log::log!(target: self.target.as_str(), severity.level(), "{}", message);
        }
        self.entries.push(LogEntry { severity, message });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries at or above the given severity
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.severity >= severity)
    }

    /// True if any entry contains the given text
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}
