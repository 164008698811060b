//! Activity log behind the status line, shown full screen by the log viewer.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

/// Entries kept before the oldest are dropped.
pub const LOG_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub line: String,
}

impl LogEntry {
    pub fn render(&self) -> String {
        format!("{} {}", self.at.format("%Y-%m-%d %H:%M:%S"), self.line)
    }
}

#[derive(Debug)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(LOG_CAPACITY)
    }
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            at: Local::now(),
            line: line.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().rev()
    }
}

/// Scroll state of the open log viewer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogViewer {
    pub offset: usize,
}

impl LogViewer {
    /// Moves by `delta` lines within a log of `len` entries.
    pub fn scroll(&mut self, delta: isize, len: usize) {
        self.offset = self
            .offset
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_entries_are_dropped_at_capacity() {
        let mut log = ActivityLog::new(3);
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        let lines: Vec<&str> = log.newest_first().map(|e| e.line.as_str()).collect();
        assert_eq!(lines, vec!["line 4", "line 3", "line 2"]);
        assert_eq!(log.last().map(|e| e.line.as_str()), Some("line 4"));
    }

    #[test]
    fn test_render_prefixes_timestamp() {
        let mut log = ActivityLog::default();
        log.push("Connected");
        let rendered = log.last().unwrap().render();
        assert!(rendered.ends_with(" Connected"));
        // "YYYY-MM-DD HH:MM:SS "
        assert_eq!(rendered.len(), 20 + "Connected".len());
    }

    #[test]
    fn test_viewer_scroll_is_clamped() {
        let mut viewer = LogViewer::default();
        viewer.scroll(-1, 10);
        assert_eq!(viewer.offset, 0);
        viewer.scroll(25, 10);
        assert_eq!(viewer.offset, 9);
        viewer.scroll(1, 0);
        assert_eq!(viewer.offset, 0);
    }
}
