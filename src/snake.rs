use std::collections::HashSet;

use crate::{Coords, Size};
use crossterm::event::KeyCode;
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// Moves `pos` by `increment` cells in this direction. A negative increment
    /// steps backwards, which is how the tail grows.
    pub fn step(self, pos: Coords, increment: i32) -> Coords {
        match self {
            Up => (pos.0, pos.1 - increment),
            Down => (pos.0, pos.1 + increment),
            Left => (pos.0 - increment, pos.1),
            Right => (pos.0 + increment, pos.1),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }

    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Char('w') | KeyCode::Up => Some(Up),
            KeyCode::Char('a') | KeyCode::Left => Some(Left),
            KeyCode::Char('s') | KeyCode::Down => Some(Down),
            KeyCode::Char('d') | KeyCode::Right => Some(Right),
            _ => None,
        }
    }
}

/// A body cell together with the direction the snake was heading when it
/// entered it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Point {
    coords: Coords,
    direction: Direction,
}

impl Point {
    pub fn new(coords: Coords, direction: Direction) -> Self {
        Point { coords, direction }
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Coords, old_tail: Coords },
    Collided
}

pub struct Snake {
    // Tail first, head last
    body: Vec<Point>,
    direction: Direction,
}

impl Snake {
    pub fn new(pos: Coords, direction: Direction) -> Self {
        Snake { body: vec![Point::new(pos, direction)], direction }
    }

    #[cfg(test)]
    pub fn from_points(body: Vec<Point>, direction: Direction) -> Self {
        assert!(!body.is_empty());
        Snake { body, direction }
    }

    pub fn body(&self) -> &[Point] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Coords {
        self.body[self.body.len() - 1].coords
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn occupied_cells(&self) -> HashSet<Coords> {
        self.body().iter().map(Point::coords).collect()
    }

    /// Steps the head one cell forward and drops the tail. The caller is
    /// responsible for drawing `new_head` and blanking `old_tail`.
    pub fn advance(&mut self, bounds: Size) -> MoveResult {
        let new_head = self.direction.step(self.head(), 1);
        let (width, height) = (bounds.0 as i32, bounds.1 as i32);

        if new_head.0 < 0 || new_head.1 < 0 || new_head.0 >= width || new_head.1 >= height {
            return Collided;
        }

        // The tail is still in place at this point, so running into it counts
        if self.body.iter().any(|p| p.coords == new_head) {
            return Collided;
        }

        self.body.push(Point::new(new_head, self.direction));
        let old_tail = self.body.remove(0).coords;

        Moved { new_head, old_tail }
    }

    pub fn set_direction(&mut self, requested: Direction) {
        if requested != self.direction.opposite() {
            self.direction = requested;
        }
    }

    pub fn head_touches(&self, pos: Coords) -> bool {
        self.head() == pos
    }

    /// Adds a cell behind the tail, following the tail's own direction.
    /// No collision check is made. Returns the new tail cell.
    pub fn grow(&mut self) -> Coords {
        let tail = self.body[0];
        let coords = tail.direction.step(tail.coords, -1);
        self.body.insert(0, Point::new(coords, tail.direction));
        coords
    }
}
