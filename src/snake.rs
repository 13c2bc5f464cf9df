use std::collections::VecDeque;

use crate::TermInt;
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    None = 0,
    Up = 1,
    Right = 2,
    Down = 3,
    Left = 4,
}

impl Direction {
    /// Unit step as `(dx, dy)`, with y growing downwards.
    pub fn vector(self) -> (i32, i32) {
        match self {
            None => (0, 0),
            Up => (0, -1),
            Right => (1, 0),
            Down => (0, 1),
            Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            None => None,
            Up => Down,
            Right => Left,
            Down => Up,
            Left => Right,
        }
    }

    pub fn from_tag(tag: u8) -> Direction {
        match tag {
            1 => Up,
            2 => Right,
            3 => Down,
            4 => Left,
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub x: TermInt,
    pub y: TermInt,
}

impl Position {
    pub fn new(x: TermInt, y: TermInt) -> Self {
        Position { x, y }
    }

    /// Moves one step and wraps around a `width` x `height` field.
    pub fn stepped(self, direction: Direction, width: TermInt, height: TermInt) -> Position {
        let (dx, dy) = direction.vector();
        let x = (self.x as i32 + dx).rem_euclid(width.max(1) as i32);
        let y = (self.y as i32 + dy).rem_euclid(height.max(1) as i32);
        Position::new(x as TermInt, y as TermInt)
    }
}

pub struct Snake {
    pos: Position,
    trail: VecDeque<Position>,
    target_len: usize,
}

impl Snake {
    pub fn new(pos: Position, target_len: usize) -> Self {
        let mut trail = VecDeque::with_capacity(target_len + 1);
        trail.push_back(pos);
        Snake { pos, trail, target_len }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn trail(&self) -> &VecDeque<Position> {
        &self.trail
    }

    /// Pops the oldest cell once the trail is over its target length.
    pub fn evict_tail(&mut self) -> Option<Position> {
        if self.trail.len() > self.target_len {
            self.trail.pop_front()
        } else {
            Option::None
        }
    }

    /// Whether `cell` is still drawn as part of the snake.
    pub fn occupies(&self, cell: Position) -> bool {
        self.pos == cell || self.trail.contains(&cell)
    }

    pub fn move_step(&mut self, direction: Direction, width: TermInt, height: TermInt) -> Position {
        self.pos = self.pos.stepped(direction, width, height);
        self.trail.push_back(self.pos);
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors() {
        assert_eq!(None.vector(), (0, 0));
        for dir in [Up, Right, Down, Left] {
            let (dx, dy) = dir.vector();
            assert_eq!(dx.abs() + dy.abs(), 1, "{:?} is not a unit step", dir);
            assert_eq!(dir.opposite().vector(), (-dx, -dy));
        }
    }

    #[test]
    fn test_tag_roundtrip() {
        for dir in [None, Up, Right, Down, Left] {
            assert_eq!(Direction::from_tag(dir as u8), dir);
        }
        assert_eq!(Direction::from_tag(42), None);
    }

    #[test]
    fn test_wraparound() {
        assert_eq!(Position::new(14, 0).stepped(Right, 15, 9), Position::new(0, 0));
        assert_eq!(Position::new(0, 0).stepped(Left, 15, 9), Position::new(14, 0));
        assert_eq!(Position::new(3, 0).stepped(Up, 15, 9), Position::new(3, 8));
        assert_eq!(Position::new(3, 8).stepped(Down, 15, 9), Position::new(3, 0));
        assert_eq!(Position::new(7, 4).stepped(None, 15, 9), Position::new(7, 4));
    }

    #[test]
    fn test_trail_capped_after_eviction() {
        let mut snake = Snake::new(Position::default(), 5);

        for _ in 0..20 {
            while snake.evict_tail().is_some() {}
            assert!(snake.trail().len() <= 5);
            snake.move_step(Right, 15, 9);
        }

        while snake.evict_tail().is_some() {}
        assert_eq!(snake.trail().len(), 5);
        assert_eq!(snake.trail().back(), Some(&snake.position()));
    }

    #[test]
    fn test_standing_still_keeps_occupying() {
        let mut snake = Snake::new(Position::default(), 2);
        for _ in 0..3 {
            snake.move_step(None, 15, 9);
        }

        let evicted = snake.evict_tail().unwrap();
        assert_eq!(evicted, Position::default());
        assert!(snake.occupies(evicted));
    }
}
