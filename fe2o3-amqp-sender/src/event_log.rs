//! Human readable event log

use std::{
    io::{self, Write},
    sync::Arc,
};

use parking_lot::Mutex;

/// Append-only sink of status lines shown to the user
pub trait LogSink {
    /// Appends one entry. An entry may span several lines.
    fn append(&self, line: &str);
}

impl<T: LogSink + ?Sized> LogSink for &T {
    fn append(&self, line: &str) {
        (**self).append(line)
    }
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn append(&self, line: &str) {
        (**self).append(line)
    }
}

/// Writes every entry to stdout followed by an empty line
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutLog;

impl LogSink for StdoutLog {
    fn append(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        // Nothing sensible can be done if stdout is gone
        let _ = writeln!(stdout, "{}\n", line);
    }
}

/// Keeps every entry in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    /// Creates an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries appended so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// The last entry
    pub fn last(&self) -> Option<String> {
        self.lines.lock().last().cloned()
    }
}

impl LogSink for MemoryLog {
    fn append(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
