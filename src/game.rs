use std::io::Write;
use std::sync::Arc;
use std::{thread::sleep, time::Duration};

use anyhow::Result;
use log::{info, warn};

use crate::input::InputState;
use crate::screen::{ScreenInterface, DEFAULT_REFRESH_INTERVAL};
use crate::snake::{Direction, Position, Snake};
use crate::TermInt;

pub const BOARD_HEIGHT: TermInt = 11;
pub const BOARD_WIDTH: TermInt = 17;
pub const TARGET_LENGTH: usize = 5;

const TICK_INTERVAL: Duration = Duration::from_millis(250);
const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

const HEAD_CHAR: char = 'X';
const BLANK_CHAR: char = ' ';
const BORDER: TermInt = 1;

/// The fixed delays of the game. Zeroed in tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    pub tick: Duration,
    pub pause_poll: Duration,
    pub refresh: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing { tick: TICK_INTERVAL, pause_poll: PAUSE_POLL_INTERVAL, refresh: DEFAULT_REFRESH_INTERVAL }
    }
}

impl Timing {
    pub fn instant() -> Self {
        Timing { tick: Duration::ZERO, pause_poll: Duration::ZERO, refresh: Duration::ZERO }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Initializing,
    Running,
    Paused,
    Stopped,
}

/// Faults raised during a tick, shown on the next status line.
#[derive(Default)]
pub struct FaultLog {
    pending: String,
}

impl FaultLog {
    pub fn record(&mut self, err: &anyhow::Error) {
        self.pending.push_str(&format!("{:#}", err));
    }

    pub fn take(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub struct SnakeGame<W: Write> {
    screen: ScreenInterface<W>,
    input: Arc<InputState>,
    snake: Snake,
    width: TermInt,
    height: TermInt,
    timing: Timing,
    faults: FaultLog,
    phase: GamePhase,
    status_width: usize,
}

impl<W: Write> SnakeGame<W> {
    pub fn new(screen: ScreenInterface<W>, input: Arc<InputState>, timing: Timing) -> Self {
        let screen = screen.with_refresh_interval(timing.refresh);
        let (h, w) = screen.size();

        SnakeGame {
            screen,
            input,
            snake: Snake::new(Position::default(), TARGET_LENGTH),
            width: w.saturating_sub(2 * BORDER),
            height: h.saturating_sub(2 * BORDER),
            timing,
            faults: FaultLog::default(),
            phase: GamePhase::Initializing,
            status_width: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn screen(&self) -> &ScreenInterface<W> {
        &self.screen
    }

    pub fn into_screen(self) -> ScreenInterface<W> {
        self.screen
    }

    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    /// Play-field size inside the border, as `(width, height)`.
    pub fn field_size(&self) -> (TermInt, TermInt) {
        (self.width, self.height)
    }

    pub fn run(&mut self) -> Result<()> {
        self.screen.draw_box()?;
        self.phase = GamePhase::Running;
        info!("Game running on a {}x{} field", self.width, self.height);

        while self.run_once() != GamePhase::Stopped {}

        info!("Game stopped at {:?}", self.snake.position());
        Ok(())
    }

    /// One pass of the loop: a tick, a pause poll, or the stop. Sleeps included.
    pub fn run_once(&mut self) -> GamePhase {
        let input = self.input.snapshot();

        if !input.running {
            self.phase = GamePhase::Stopped;
            return self.phase;
        }

        if input.paused {
            if self.phase != GamePhase::Paused {
                self.phase = GamePhase::Paused;
                info!("Paused");
                self.show_paused();
            }
            sleep(self.timing.pause_poll);
            return self.phase;
        }

        if self.phase == GamePhase::Paused {
            info!("Resumed");
        }
        self.phase = GamePhase::Running;

        self.step(input.direction);
        sleep(self.timing.tick);
        self.phase
    }

    /// One tick with the current input, faults recorded instead of returned.
    pub fn step(&mut self, direction: Direction) {
        if let Err(e) = self.tick(direction) {
            warn!("Tick fault: {:#}", e);
            self.faults.record(&e);
        }
    }

    pub fn tick(&mut self, direction: Direction) -> Result<()> {
        let status = match self.faults.take() {
            Some(fault) => format!("Fault: {}", fault),
            None => {
                let pos = self.snake.position();
                format!("{}, {}", pos.x, pos.y)
            }
        };
        self.write_status(&status)?;

        let pos = self.snake.position();
        self.screen.write_at(pos.y + BORDER, pos.x + BORDER, &HEAD_CHAR.to_string())?;

        self.delete_snake_tail()?;
        self.snake.move_step(direction, self.width, self.height);
        self.screen.refresh()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn delete_snake_tail(&mut self) -> Result<()> {
        while let Some(old) = self.snake.evict_tail() {
            if !self.snake.occupies(old) {
                self.screen.write_at(old.y + BORDER, old.x + BORDER, &BLANK_CHAR.to_string())?;
            }
        }
        Ok(())
    }

    /// Status text is cut to the root width so a long fault still shows.
    fn write_status(&mut self, text: &str) -> Result<()> {
        let max = self.screen.root().width as usize;
        let len = text.chars().count().min(max);
        let padded: String = format!("{:<width$}", text, width = self.status_width.max(len))
            .chars()
            .take(max)
            .collect();
        self.screen.write_root(0, 0, &padded)?;
        self.status_width = len;
        Ok(())
    }

    fn show_paused(&mut self) {
        let shown = self.write_status("Paused").and_then(|_| self.screen.refresh());
        if let Err(e) = shown {
            warn!("Could not show pause status: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TermManager;

    fn game() -> SnakeGame<Vec<u8>> {
        let term = TermManager::new(Vec::new(), 40, 20);
        let screen = ScreenInterface::new(term, BOARD_HEIGHT, BOARD_WIDTH);
        SnakeGame::new(screen, Arc::new(InputState::new()), Timing::instant())
    }

    #[test]
    fn test_field_excludes_border() {
        assert_eq!(game().field_size(), (15, 9));
    }

    #[test]
    fn test_tick_draws_head_and_status() {
        let mut game = game();
        game.tick(Direction::Right).unwrap();

        assert_eq!(game.screen().term().char_at((5, 5)), Some('X'));
        assert!(game.screen().term().row_text(0).starts_with("0, 0"));
        assert_eq!(game.snake().position(), Position::new(1, 0));
    }

    #[test]
    fn test_wraps_right_edge() {
        let mut game = game();
        for _ in 0..14 {
            game.tick(Direction::Right).unwrap();
        }
        assert_eq!(game.snake().position(), Position::new(14, 0));

        game.tick(Direction::Right).unwrap();
        assert_eq!(game.snake().position(), Position::new(0, 0));
    }

    #[test]
    fn test_tail_erased_behind_snake() {
        let mut game = game();
        for _ in 0..8 {
            game.tick(Direction::Right).unwrap();
        }

        let term = game.screen().term();
        assert_eq!(term.char_at((5, 5)), Some(' '));
        assert_eq!(term.char_at((12, 5)), Some('X'));
        assert!(game.snake().trail().len() <= TARGET_LENGTH + 1);
    }

    #[test]
    fn test_standing_still_keeps_head() {
        let mut game = game();
        for _ in 0..10 {
            game.tick(Direction::None).unwrap();
        }

        assert_eq!(game.screen().term().char_at((5, 5)), Some('X'));
    }

    #[test]
    fn test_status_padding_clears_stale_text() {
        let mut game = game();
        game.write_status("Fault: something long").unwrap();
        game.tick(Direction::None).unwrap();

        assert_eq!(game.screen().term().row_text(0).trim_end(), "0, 0");
    }

    #[test]
    fn test_long_status_clipped_to_root() {
        let term = TermManager::new(Vec::new(), 22, 20);
        let screen = ScreenInterface::new(term, BOARD_HEIGHT, BOARD_WIDTH);
        let mut game = SnakeGame::new(screen, Arc::new(InputState::new()), Timing::instant());

        game.write_status("Fault: a message far wider than the screen").unwrap();
        assert_eq!(game.screen().term().row_text(0), "Fault: a message far w");

        game.write_status("1, 0").unwrap();
        assert_eq!(game.screen().term().row_text(0).trim_end(), "1, 0");
    }

    #[test]
    fn test_paused_loop_holds_position() {
        let mut game = game();
        game.input.turn(Direction::Right);
        game.input.toggle_pause();

        assert_eq!(game.run_once(), GamePhase::Paused);
        assert_eq!(game.run_once(), GamePhase::Paused);
        assert_eq!(game.snake().position(), Position::new(0, 0));
        assert_eq!(game.screen().term().row_text(0).trim_end(), "Paused");

        game.input.toggle_pause();
        assert_eq!(game.run_once(), GamePhase::Running);
        assert_eq!(game.snake().position(), Position::new(1, 0));
    }

    #[test]
    fn test_quit_honored_while_paused() {
        let mut game = game();
        game.input.toggle_pause();
        assert_eq!(game.run_once(), GamePhase::Paused);

        game.input.stop();
        assert_eq!(game.run_once(), GamePhase::Stopped);
        assert_eq!(game.snake().position(), Position::new(0, 0));
    }

    #[test]
    fn test_fault_log_take_clears() {
        let mut log = FaultLog::default();
        assert_eq!(log.take(), None);

        log.record(&anyhow::anyhow!("boom"));
        log.record(&anyhow::anyhow!("bang"));
        assert_eq!(log.take().as_deref(), Some("boombang"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_run_exits_when_not_running() {
        let mut game = game();
        game.input.stop();

        game.run().unwrap();
        assert_eq!(game.phase(), GamePhase::Stopped);
        assert_eq!(game.screen().term().char_at((4, 4)), Some('+'));
    }
}
