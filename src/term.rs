use crate::{Coords, Size, TermInt};
use std::{io::{Stdout, Write, stdout}, thread::sleep, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal, Result};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};
use log::warn;

/// Everything the game needs from the outside world: a grid of cells it can
/// draw on and a keyboard it can poll without blocking.
pub trait Surface {
    fn dimensions(&self) -> Size;

    /// Draws a single glyph. Cells outside the grid are ignored.
    fn write_char(&mut self, pos: Coords, ch: char, color: Color) -> Result<()>;

    fn write_str(&mut self, pos: Coords, text: &str, color: Color) -> Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.write_char((pos.0 + i as i32, pos.1), ch, color)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn key_available(&mut self) -> Result<bool>;

    /// Blocks until a key is pressed. Only called after `key_available`
    /// returned true, or when the game is waiting for an acknowledgement.
    fn read_key(&mut self) -> Result<KeyEvent>;

    fn wait(&mut self, duration: Duration) {
        sleep(duration);
    }
}

pub struct TermManager {
    size: Size,
    stdout: Stdout,
    active: bool,
    pending: Option<KeyEvent>,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let size = terminal::size()?;
        Ok(TermManager { size, stdout: stdout(), active: false, pending: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        self.active = true;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        self.size = terminal::size()?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(self.stdout, style::ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    fn in_bounds(&self, pos: Coords) -> bool {
        let (width, height) = self.size;
        pos.0 >= 0 && pos.1 >= 0 && pos.0 < width as i32 && pos.1 < height as i32
    }
}

impl Surface for TermManager {
    fn dimensions(&self) -> Size {
        self.size
    }

    fn write_char(&mut self, pos: Coords, ch: char, color: Color) -> Result<()> {
        if !self.in_bounds(pos) {
            return Ok(());
        }

        queue!(
            self.stdout,
            cursor::MoveTo(pos.0 as TermInt, pos.1 as TermInt),
            style::SetForegroundColor(color),
            style::Print(ch),
            style::ResetColor
        )
    }

    fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        // Pick up a resize between games, the grid itself is fixed while playing
        self.size = terminal::size()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    fn key_available(&mut self) -> Result<bool> {
        // Non-key events are discarded
        while self.pending.is_none() && poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                self.pending = Some(ev);
            }
        }

        Ok(self.pending.is_some())
    }

    fn read_key(&mut self) -> Result<KeyEvent> {
        if let Some(ev) = self.pending.take() {
            return Ok(ev);
        }

        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!("Error restoring terminal: {}", err);
        }
    }
}
