//! Real-time pipeline log streaming via Server-Sent Events (SSE).
//!
//! Loader and report progress messages are mirrored to stdout and broadcast
//! to any dashboard clients subscribed to `/api/logs`, so the UI can show
//! load progress the way the old sidebar status messages did.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for frontend display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "ok",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// A single log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Global log stream.
pub static LOG_STREAM: Lazy<LogStream> = Lazy::new(LogStream::new);

/// Broadcasts log entries to all connected SSE clients.
pub struct LogStream {
    sender: broadcast::Sender<LogEntry>,
}

impl LogStream {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Publish an entry to stdout and to all subscribers.
    pub fn publish(&self, entry: LogEntry) {
        println!("[{:>5}] {}", entry.level.prefix(), entry.message);
        // Ignore the send result: no subscribers is normal for CLI runs
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogStream {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_STREAM.publish(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_STREAM.publish(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_STREAM.publish(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_STREAM.publish(LogEntry::new(LogLevel::Error, msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_subscriber() {
        let stream = LogStream::new();
        let mut rx = stream.subscribe();
        stream.publish(LogEntry::new(LogLevel::Success, "loaded"));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.message, "loaded");
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = LogEntry::new(LogLevel::Warning, "slow load");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
        assert!(json.contains("\"timestamp\""));
    }
}
