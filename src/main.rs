use std::fs::File;
use std::io::Stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use wrapsnake::game::{SnakeGame, Timing, BOARD_HEIGHT, BOARD_WIDTH};
use wrapsnake::input::{spawn_listener, InputState, TerminalKeys};
use wrapsnake::screen::ScreenInterface;
use wrapsnake::term::TermManager;

const LOG_FILE: &str = "wrapsnake.log";

fn main() -> Result<()> {
    // Reported before the alternate screen hides stderr
    if let Err(e) = init_logging(LOG_FILE) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let mut term = TermManager::stdout()?;
    let (result, mut term) = match term.setup() {
        Ok(()) => {
            info!("Terminal ready, size {:?}", term.get_terminal_size());
            play(term)
        }
        Err(e) => (Err(e), term),
    };

    // Always try to restore terminal state, even after a partial setup
    let restored = term.restore();
    result.and(restored)
}

/// The terminal is the game screen, so logs go to a file.
fn init_logging(path: &str) -> Result<()> {
    let log_file = File::create(path).with_context(|| format!("could not create {}", path))?;
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    WriteLogger::init(LevelFilter::Debug, log_config, log_file).context("could not install logger")?;
    Ok(())
}

fn play(term: TermManager<Stdout>) -> (Result<()>, TermManager<Stdout>) {
    let input = Arc::new(InputState::new());
    let screen = ScreenInterface::new(term, BOARD_HEIGHT, BOARD_WIDTH);
    let mut game = SnakeGame::new(screen, Arc::clone(&input), Timing::default());

    // Detached: the listener is left blocked on its read when the game ends
    let result = spawn_listener(input, TerminalKeys)
        .map_err(anyhow::Error::from)
        .and_then(|_| game.run());

    (result, game.into_screen().into_term())
}
