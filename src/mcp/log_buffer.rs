//! Bounded FIFO buffer of timestamped log lines.

use std::collections::VecDeque;

use chrono::{DateTime, SecondsFormat, Utc};

/// Default number of retained lines.
pub const DEFAULT_LOG_CAPACITY: usize = 10_000;

/// A single buffered log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Time the line was appended.
    pub timestamp: DateTime<Utc>,
    /// Message text.
    pub message: String,
}

impl LogEntry {
    /// Render as `[<rfc3339>] <message>`.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "[{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }
}

/// Ring buffer holding at most `capacity` entries; the oldest is evicted
/// first once full.
#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl LogBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a line stamped with the current time and return it.
    pub fn push(&mut self, message: impl Into<String>) -> &LogEntry {
        self.push_entry(LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
        })
    }

    /// Append a pre-built entry, evicting the oldest when full.
    pub fn push_entry(&mut self, entry: LogEntry) -> &LogEntry {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Remove every entry and return how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Number of buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rendered lines, oldest first. `limit` keeps only the newest `n`.
    #[must_use]
    pub fn lines(&self, limit: Option<usize>) -> Vec<String> {
        let skip = limit.map_or(0, |n| self.entries.len().saturating_sub(n));
        self.entries.iter().skip(skip).map(LogEntry::render).collect()
    }

    /// Oldest-first iterator over the raw entries.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}
