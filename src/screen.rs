//! Root window plus an optional bordered sub-window, in the spirit of a
//! curses `newwin`. Every write is bounds-checked against its window and
//! reported as an error instead of being clipped.

use std::io::Write;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::term::TermManager;
use crate::{Coords, TermInt};

pub const SUBWINDOW_ORIGIN: Coords = (4, 4);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

const BORDER_CORNER: char = '+';
const BORDER_HORIZONTAL: char = '-';
const BORDER_VERTICAL: char = '|';

/// A rectangular region of the terminal, in absolute screen coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub origin: Coords,
    pub height: TermInt,
    pub width: TermInt,
}

impl Window {
    fn absolute(&self, row: TermInt, col: TermInt, len: usize) -> Result<Coords> {
        if row >= self.height || col >= self.width || len > (self.width - col) as usize {
            bail!("write out of bounds at ({}, {}) in {}x{} window", row, col, self.height, self.width);
        }
        Ok((self.origin.0 + col, self.origin.1 + row))
    }
}

pub struct ScreenInterface<W: Write> {
    term: TermManager<W>,
    root: Window,
    window: Window,
    cursor: (TermInt, TermInt),
    refresh_interval: Duration,
}

impl<W: Write> ScreenInterface<W> {
    /// A zero `height` or `width` makes the sub-window the root window.
    pub fn new(term: TermManager<W>, height: TermInt, width: TermInt) -> Self {
        let (term_width, term_height) = term.get_terminal_size();
        let root = Window { origin: (0, 0), height: term_height, width: term_width };
        let window = if height != 0 && width != 0 {
            Window { origin: SUBWINDOW_ORIGIN, height, width }
        } else {
            root
        };

        ScreenInterface { term, root, window, cursor: (0, 0), refresh_interval: DEFAULT_REFRESH_INTERVAL }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn root(&self) -> Window {
        self.root
    }

    /// `(height, width)` of the sub-window.
    pub fn size(&self) -> (TermInt, TermInt) {
        (self.window.height, self.window.width)
    }

    pub fn term(&self) -> &TermManager<W> {
        &self.term
    }

    pub fn into_term(self) -> TermManager<W> {
        self.term
    }

    /// Writes at the sub-window's cursor and moves the cursor past the text.
    pub fn write(&mut self, text: &str) -> Result<()> {
        let (row, col) = self.cursor;
        self.write_at(row, col, text)
    }

    pub fn write_at(&mut self, row: TermInt, col: TermInt, text: &str) -> Result<()> {
        let len = text.chars().count();
        let pos = self.window.absolute(row, col, len)?;
        self.term.print_str_at(pos, text)?;
        // absolute() kept col + len within the window width
        self.cursor = (row, col + len as TermInt);
        Ok(())
    }

    pub fn write_root(&mut self, row: TermInt, col: TermInt, text: &str) -> Result<()> {
        let pos = self.root.absolute(row, col, text.chars().count())?;
        self.term.print_str_at(pos, text)?;
        Ok(())
    }

    pub fn draw_box(&mut self) -> Result<()> {
        let Window { height, width, .. } = self.window;
        if height < 2 || width < 2 {
            bail!("window {}x{} is too small for a border", height, width);
        }

        let (end_row, end_col) = (height - 1, width - 1);

        for col in 0..width {
            let ch = if col == 0 || col == end_col { BORDER_CORNER } else { BORDER_HORIZONTAL };
            self.put_char(0, col, ch)?;
            self.put_char(end_row, col, ch)?;
        }

        for row in 1..end_row {
            self.put_char(row, 0, BORDER_VERTICAL)?;
            self.put_char(row, end_col, BORDER_VERTICAL)?;
        }

        Ok(())
    }

    /// Pushes queued output to the terminal, then holds for the refresh interval.
    pub fn refresh(&mut self) -> Result<()> {
        self.term.flush()?;
        if !self.refresh_interval.is_zero() {
            sleep(self.refresh_interval);
        }
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn put_char(&mut self, row: TermInt, col: TermInt, ch: char) -> Result<()> {
        let pos = self.window.absolute(row, col, 1)?;
        self.term.print_at(pos, ch)?;
        Ok(())
    }
}
