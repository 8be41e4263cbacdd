//! Presentation channel and a bounded scrollback buffer.

use std::collections::VecDeque;

use ttygreet_types::input::InputMode;

/// Receives everything the engine wants shown.
pub trait Sink {
    fn write_output(&mut self, text: &str);

    fn write_error(&mut self, text: &str);

    /// Switch the input line between plain and masked entry.
    fn set_input_mode(&mut self, mode: InputMode);

    /// Wipe the visible scrollback. Sinks without one ignore it.
    fn clear(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Output,
    Error,
}

/// One rendered scrollback line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

/// In-memory scrollback that keeps at most `limit` lines (0 = unbounded).
#[derive(Debug, Default)]
pub struct Scrollback {
    lines: VecDeque<Line>,
    limit: usize,
    mode: InputMode,
}

impl Scrollback {
    pub fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            limit,
            mode: InputMode::Plain,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Plain text of every line, joined with newlines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&mut self, kind: LineKind, text: &str) {
        for line in text.lines() {
            self.lines.push_back(Line {
                kind,
                text: line.to_string(),
            });
        }
        if self.limit > 0 {
            while self.lines.len() > self.limit {
                self.lines.pop_front();
            }
        }
    }
}

impl Sink for Scrollback {
    fn write_output(&mut self, text: &str) {
        self.push(LineKind::Output, text);
    }

    fn write_error(&mut self, text: &str) {
        self.push(LineKind::Error, text);
    }

    fn set_input_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}
