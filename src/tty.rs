//! Terminal input: reading key events (blocking or timed) and querying
//! terminal size. Output is written directly by [`crate::render::Renderer`]
//! through a plain `dyn std::io::Write`, the way the terminal capability
//! surface is split in the system this crate's editor is descended from.

use std::io;
use std::time::Duration;

use crate::key::{Key, KeyEvent};

/// Pluggable key-event source. A real implementation reads from the
/// actual terminal; tests use a scripted [`MockTty`] instead.
pub trait Tty {
    /// Block until a key event is available.
    fn read(&mut self) -> io::Result<KeyEvent>;

    /// Block for at most `timeout`, returning `None` on expiry. Used to
    /// drive the delayed history/completion hint.
    fn read_timeout(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;

    /// Push a key back onto the front of the input stream so the next
    /// `read`/`read_timeout` returns it. Used by the completion menu to
    /// hand an unconsumed key back to the outer editing loop.
    fn push_back(&mut self, key: KeyEvent);

    /// Current `(width, height)` in columns/rows.
    fn size(&self) -> io::Result<(u16, u16)>;

    fn enable_raw_mode(&mut self) -> io::Result<()>;
    fn disable_raw_mode(&mut self) -> io::Result<()>;
}

/// Real terminal backed by crossterm.
pub struct CrosstermTty {
    pending: Option<KeyEvent>,
    raw_mode_enabled: bool,
}

impl CrosstermTty {
    pub fn new() -> Self {
        Self {
            pending: None,
            raw_mode_enabled: false,
        }
    }

    fn decode(event: crossterm::event::Event) -> Option<KeyEvent> {
        use crossterm::event::{Event, KeyCode, KeyModifiers};

        match event {
            Event::Resize(w, h) => Some(KeyEvent::new(Key::Resize(w, h))),
            Event::Key(k) => {
                let key = match k.code {
                    KeyCode::Char(c) => Key::Char(c),
                    KeyCode::Enter => Key::Enter,
                    KeyCode::Tab => Key::Tab,
                    KeyCode::BackTab => Key::BackTab,
                    KeyCode::Backspace => Key::Backspace,
                    KeyCode::Delete => Key::Delete,
                    KeyCode::Esc => Key::Esc,
                    KeyCode::Left => Key::Left,
                    KeyCode::Right => Key::Right,
                    KeyCode::Up => Key::Up,
                    KeyCode::Down => Key::Down,
                    KeyCode::Home => Key::Home,
                    KeyCode::End => Key::End,
                    KeyCode::PageUp => Key::PageUp,
                    KeyCode::PageDown => Key::PageDown,
                    KeyCode::F(n) => Key::F(n),
                    _ => return None,
                };
                let mods = k.modifiers;
                let mut ev = KeyEvent::new(key);
                if mods.contains(KeyModifiers::CONTROL) {
                    ev = ev.with_ctrl();
                }
                if mods.contains(KeyModifiers::ALT) {
                    ev = ev.with_alt();
                }
                if mods.contains(KeyModifiers::SHIFT) {
                    ev = ev.with_shift();
                }
                Some(ev)
            }
            _ => None,
        }
    }
}

impl Default for CrosstermTty {
    fn default() -> Self {
        Self::new()
    }
}

impl Tty for CrosstermTty {
    fn read(&mut self) -> io::Result<KeyEvent> {
        if let Some(ev) = self.pending.take() {
            return Ok(ev);
        }
        loop {
            let event = crossterm::event::read()?;
            if let Some(ev) = Self::decode(event) {
                return Ok(ev);
            }
        }
    }

    fn read_timeout(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if let Some(ev) = self.pending.take() {
            return Ok(Some(ev));
        }
        if !crossterm::event::poll(timeout)? {
            return Ok(None);
        }
        let event = crossterm::event::read()?;
        Ok(Self::decode(event))
    }

    fn push_back(&mut self, key: KeyEvent) {
        self.pending = Some(key);
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        self.raw_mode_enabled = true;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if self.raw_mode_enabled {
            crossterm::terminal::disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        Ok(())
    }
}

impl Drop for CrosstermTty {
    fn drop(&mut self) {
        let _ = self.disable_raw_mode();
    }
}

/// Scripted terminal for tests: yields keys from a fixed queue and
/// reports a fixed size.
pub struct MockTty {
    queue: std::collections::VecDeque<KeyEvent>,
    width: u16,
    height: u16,
}

impl MockTty {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            queue: keys.into_iter().collect(),
            width: 80,
            height: 24,
        }
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Tty for MockTty {
    fn read(&mut self) -> io::Result<KeyEvent> {
        self.queue
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "mock tty exhausted"))
    }

    fn read_timeout(&mut self, _timeout: Duration) -> io::Result<Option<KeyEvent>> {
        Ok(self.queue.pop_front())
    }

    fn push_back(&mut self, key: KeyEvent) {
        self.queue.push_front(key);
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.width, self.height))
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mock_tty_replays_scripted_keys_then_eofs() {
        let mut tty = MockTty::new([KeyEvent::new(Key::Char('a')), KeyEvent::new(Key::Enter)]);
        assert_eq!(tty.read().unwrap().key, Key::Char('a'));
        assert_eq!(tty.read().unwrap().key, Key::Enter);
        assert!(tty.read().is_err());
    }

    #[test]
    fn push_back_is_read_next() {
        let mut tty = MockTty::new([KeyEvent::new(Key::Char('a'))]);
        tty.push_back(KeyEvent::new(Key::Esc));
        assert_eq!(tty.read().unwrap().key, Key::Esc);
        assert_eq!(tty.read().unwrap().key, Key::Char('a'));
    }
}
