//! User-facing run log.
//!
//! These entries are shown alongside the run; they are separate from the
//! operator-level `tracing` output.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log entry severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Info,
    Success,
    Warning,
    Error,
}

impl LogSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSeverity::Info => "info",
            LogSeverity::Success => "success",
            LogSeverity::Warning => "warning",
            LogSeverity::Error => "error",
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single run log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LogEntry {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub severity: LogSeverity,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, severity: LogSeverity) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, LogSeverity::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, LogSeverity::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, LogSeverity::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, LogSeverity::Error)
    }
}

/// Append-only log, newest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RunLog {
    entries: VecDeque<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; it becomes the first element.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Entries of the given severity, newest first.
    pub fn with_severity(&self, severity: LogSeverity) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.severity == severity)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut log = RunLog::new();
        log.push(LogEntry::info("first"));
        log.push(LogEntry::success("second"));

        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(log.latest().unwrap().severity, LogSeverity::Success);
    }

    #[test]
    fn test_unique_ids() {
        let a = LogEntry::info("same");
        let b = LogEntry::info("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_severity_filter_and_clear() {
        let mut log = RunLog::new();
        log.push(LogEntry::info("stage"));
        log.push(LogEntry::error("boom"));
        assert_eq!(log.with_severity(LogSeverity::Error).count(), 1);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_entry_serialization() {
        let entry = LogEntry::warning("careful");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
    }
}
