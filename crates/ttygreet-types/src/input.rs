//! Key events and input modes for the line-oriented terminal.
//!
//! Hosts map their native keyboard events onto [`Key`]; the terminal never
//! sees raw platform input.

use serde::{Deserialize, Serialize};

/// A key press delivered to the terminal input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Delete the character left of the cursor.
    Backspace,
    /// Submit the current line.
    Enter,
    /// Complete the command name.
    Tab,
    /// Step back through history.
    Up,
    /// Step forward through history.
    Down,
    /// Ctrl-C: discard the line and any authentication in progress.
    Cancel,
}

/// How the host should present the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Ordinary echoed text.
    #[default]
    Plain,
    /// Secret entry; the host must not display what is typed.
    Masked,
}

impl InputMode {
    pub fn is_masked(self) -> bool {
        self == Self::Masked
    }
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Masked => write!(f, "masked"),
        }
    }
}
