use crate::{Coords, TermInt};
use std::io::{self, Stdout, Write, stdout};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};

/// Queued terminal output plus a shadow copy of every cell printed so far.
///
/// The writer is generic so the game can be driven headlessly: tests hand
/// it a `Vec<u8>` and read back the shadow buffer with [`TermManager::char_at`].
pub struct TermManager<W: Write> {
    width: TermInt,
    height: TermInt,
    out: W,
    screen: Vec<char>,
}

impl TermManager<Stdout> {
    pub fn stdout() -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        Ok(TermManager::new(stdout(), width, height))
    }
}

impl<W: Write> TermManager<W> {
    pub fn new(out: W, width: TermInt, height: TermInt) -> Self {
        let screen = vec![' '; width as usize * height as usize];
        TermManager { width, height, out, screen }
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.out, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error setting raw mode")?;
        execute!(self.out, cursor::Hide, cursor::DisableBlinking).context("Error hiding cursor")?;
        self.clear()
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode().context("Error unsetting raw mode")?;
        execute!(self.out, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen")?;
        Ok(())
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> io::Result<()> {
        let idx = self.index_of(pos).ok_or_else(|| out_of_screen(pos))?;
        queue!(self.out, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        self.screen[idx] = ch;
        Ok(())
    }

    /// Prints a single-line string starting at `pos`. Nothing is queued
    /// unless the whole string fits on the screen.
    pub fn print_str_at(&mut self, pos: Coords, s: &str) -> io::Result<()> {
        let len = s.chars().count();
        if len == 0 {
            return Ok(());
        }

        let start = self.index_of(pos).ok_or_else(|| out_of_screen(pos))?;
        if pos.0 as usize + len > self.width as usize {
            let last = (pos.0.saturating_add(TermInt::try_from(len - 1).unwrap_or(TermInt::MAX)), pos.1);
            return Err(out_of_screen(last));
        }

        queue!(self.out, cursor::MoveTo(pos.0, pos.1), style::Print(s))?;
        for (cell, ch) in self.screen[start..start + len].iter_mut().zip(s.chars()) {
            *cell = ch;
        }

        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.out, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// What was last printed at `pos`, if it is on screen.
    pub fn char_at(&self, pos: Coords) -> Option<char> {
        self.index_of(pos).map(|idx| self.screen[idx])
    }

    pub fn row_text(&self, y: TermInt) -> String {
        (0..self.width)
            .filter_map(|x| self.char_at((x, y)))
            .collect()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index_of(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }
}

fn out_of_screen(pos: Coords) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("position ({}, {}) is outside the screen", pos.0, pos.1),
    )
}
