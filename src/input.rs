//! Keyboard listener running beside the game loop.
//!
//! The two threads share an [`InputState`] of atomic cells; the listener
//! writes, the game loop reads one [`InputSnapshot`] per iteration.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error, info};

use crate::snake::Direction;

pub struct InputState {
    direction: AtomicU8,
    paused: AtomicBool,
    running: AtomicBool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InputSnapshot {
    pub direction: Direction,
    pub paused: bool,
    pub running: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Turned(Direction),
    Rejected(Direction),
    PauseToggled { paused: bool },
    Quit,
    Ignored,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            direction: AtomicU8::new(Direction::None as u8),
            paused: AtomicBool::new(false),
            running: AtomicBool::new(true),
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_tag(self.direction.load(Ordering::SeqCst))
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            direction: self.direction(),
            paused: self.is_paused(),
            running: self.is_running(),
        }
    }

    /// Turns unless `direction` would reverse the current heading.
    pub fn turn(&self, direction: Direction) -> KeyOutcome {
        let current = self.direction();
        if direction == current.opposite() && current != Direction::None {
            return KeyOutcome::Rejected(direction);
        }

        self.direction.store(direction as u8, Ordering::SeqCst);
        KeyOutcome::Turned(direction)
    }

    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn apply_key(&self, key: KeyEvent) -> KeyOutcome {
        if is_ctrl_c(&key) {
            self.stop();
            return KeyOutcome::Quit;
        }

        match key.code {
            KeyCode::Up => self.turn(Direction::Up),
            KeyCode::Down => self.turn(Direction::Down),
            KeyCode::Right => self.turn(Direction::Right),
            KeyCode::Left => self.turn(Direction::Left),
            KeyCode::Char('q') => {
                self.stop();
                KeyOutcome::Quit
            }
            KeyCode::Char('p') => KeyOutcome::PauseToggled { paused: self.toggle_pause() },
            _ => KeyOutcome::Ignored,
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        InputState::new()
    }
}

/// Blocking source of key presses.
pub trait KeySource {
    fn next_key(&mut self) -> io::Result<KeyEvent>;
}

/// Reads from the terminal. Release events are skipped.
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = event::read()? {
                if ev.kind != KeyEventKind::Release {
                    return Ok(ev);
                }
            }
        }
    }
}

/// Replays a fixed list of keys, then reports end of input.
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new<I: IntoIterator<Item = KeyEvent>>(keys: I) -> Self {
        ScriptedKeys { keys: keys.into_iter().collect() }
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> io::Result<KeyEvent> {
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted keys"))
    }
}

/// Starts the listener thread. It is never joined; it ends when the game
/// stops or when reading a key fails, in which case the game is stopped too.
pub fn spawn_listener<K>(state: Arc<InputState>, keys: K) -> io::Result<JoinHandle<()>>
where
    K: KeySource + Send + 'static,
{
    thread::Builder::new()
        .name("input".into())
        .spawn(move || listen(&state, keys))
}

pub fn listen<K: KeySource>(state: &InputState, mut keys: K) {
    while state.is_running() {
        let key = match keys.next_key() {
            Ok(key) => key,
            Err(e) => {
                error!("Input listener stopped: {}", e);
                state.stop();
                return;
            }
        };

        let outcome = state.apply_key(key);
        debug!("Key {:?} -> {:?}", key.code, outcome);
    }

    info!("Input listener finished");
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}
