//! Submitted-line history with an up/down browsing cursor.
//!
//! Entries are kept most-recent-first. The cursor is 0 while not browsing
//! and `1..=len` while browsing, where 1 is the most recent entry.

use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
    cursor: usize,
    limit: usize,
}

impl History {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History that keeps at most `limit` entries (0 = unbounded).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record a submitted line and stop browsing.
    pub fn push(&mut self, line: &str) {
        self.entries.push_front(line.to_string());
        if self.limit > 0 {
            self.entries.truncate(self.limit);
        }
        self.cursor = 0;
    }

    /// Step to the next older entry. `None` once the oldest is reached.
    pub fn older(&mut self) -> Option<&str> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor - 1).map(String::as_str)
    }

    /// Step to the next newer entry. Walking past the newest entry yields
    /// an empty line; `None` when not browsing.
    pub fn newer(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        if self.cursor == 0 {
            Some("")
        } else {
            self.entries.get(self.cursor - 1).map(String::as_str)
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
