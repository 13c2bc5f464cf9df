pub mod game;
pub mod input;
pub mod screen;
pub mod snake;
pub mod term;

pub type TermInt = u16;
pub type Coords = (u16, u16);
