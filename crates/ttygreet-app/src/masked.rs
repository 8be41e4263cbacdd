//! Secret entry with the tty echo turned off.
//!
//! While the engine is masked, keys are read one at a time in raw mode and
//! fed to the engine, so nothing typed ever reaches the screen.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ttygreet_types::input::Key;

/// Restores cooked mode on drop (including panics).
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::warn!("Failed to leave raw mode: {e}");
        }
    }
}

/// Feed editing keys to `on_key` until the line is submitted or cancelled,
/// and return that final key. Raw mode is already off when this returns.
pub fn read_secret(mut on_key: impl FnMut(Key)) -> io::Result<Key> {
    enable_raw_mode()?;
    let _guard = RawModeGuard;
    loop {
        if let Event::Key(event) = event::read()?
            && let Some(key) = map_key(event)
        {
            match key {
                Key::Enter | Key::Cancel => return Ok(key),
                other => on_key(other),
            }
        }
    }
}

/// Translate a crossterm key press into a terminal key.
fn map_key(event: KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Char('c' | 'd') if ctrl => Some(Key::Cancel),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Esc => Some(Key::Cancel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn printable_and_editing_keys() {
        assert_eq!(map_key(press(KeyCode::Char('x'))), Some(Key::Char('x')));
        assert_eq!(map_key(press(KeyCode::Backspace)), Some(Key::Backspace));
        assert_eq!(map_key(press(KeyCode::Enter)), Some(Key::Enter));
    }

    #[test]
    fn ctrl_c_and_escape_cancel() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Some(Key::Cancel));
        assert_eq!(map_key(press(KeyCode::Esc)), Some(Key::Cancel));
    }

    #[test]
    fn other_control_chords_are_dropped() {
        let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_u), None);
        assert_eq!(map_key(press(KeyCode::F(1))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let mut release = press(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release), None);
    }
}
