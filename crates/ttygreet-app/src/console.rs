//! Sink that renders to the process's stdout/stderr.

use std::io::{self, Write};

use ttygreet_terminal::{Scrollback, Sink};
use ttygreet_types::input::InputMode;

/// Prints engine output as it arrives and mirrors it into a scrollback.
pub struct ConsoleSink {
    scrollback: Scrollback,
}

impl ConsoleSink {
    pub fn new(scrollback_limit: usize) -> Self {
        Self {
            scrollback: Scrollback::new(scrollback_limit),
        }
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }
}

impl Sink for ConsoleSink {
    fn write_output(&mut self, text: &str) {
        println!("{text}");
        self.scrollback.write_output(text);
    }

    fn write_error(&mut self, text: &str) {
        eprintln!("{text}");
        self.scrollback.write_error(text);
    }

    fn set_input_mode(&mut self, mode: InputMode) {
        log::debug!("Input mode: {mode}");
        self.scrollback.set_input_mode(mode);
    }

    fn clear(&mut self) {
        // Erase the screen and home the cursor.
        print!("\x1b[2J\x1b[H");
        if let Err(e) = io::stdout().flush() {
            log::warn!("Failed to flush stdout: {e}");
        }
        self.scrollback.clear();
    }
}
