//! # Game Module
//!
//! Core game state, world representation, and the concurrent runtime.
//!
//! This module contains the fundamental building blocks of the chase game:
//! - Grid and cell model
//! - Player and pursuer entities, power-ups
//! - The pursuer decision engine
//! - The world model and its lock-guarded engine
//! - The periodic worker scheduler and the game session that drives it

pub mod autopilot;
pub mod clock;
pub mod engine;
pub mod entities;
pub mod grid;
pub mod powerups;
pub mod pursuer_ai;
pub mod scheduler;
pub mod session;
pub mod state;

pub use autopilot::*;
pub use clock::*;
pub use engine::*;
pub use entities::*;
pub use grid::*;
pub use powerups::*;
pub use pursuer_ai::*;
pub use scheduler::*;
pub use session::*;
pub use state::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a cell coordinate on the board.
///
/// # Examples
///
/// ```
/// use mazechase::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.row, 10);
/// assert_eq!(pos.col, 5);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.row - other.row).abs() + (self.col - other.col).abs()) as u32
    }

    /// Returns the neighbouring position one step along `direction`.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::ALL.iter().map(|&d| self.step(d)).collect()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.row + other.row, self.col + other.col)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.row - other.row, self.col - other.col)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four cardinal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::{Direction, Position};
    ///
    /// let delta = Direction::Up.to_delta();
    /// assert_eq!(delta, Position::new(-1, 0));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::Up => Position::new(-1, 0),
            Direction::Down => Position::new(1, 0),
            Direction::Left => Position::new(0, -1),
            Direction::Right => Position::new(0, 1),
        }
    }

    /// Converts a unit position delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.row, delta.col) {
            (-1, 0) => Some(Direction::Up),
            (1, 0) => Some(Direction::Down),
            (0, -1) => Some(Direction::Left),
            (0, 1) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Returns the direction pointing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Identifier of one game session (one maze, one set of workers).
pub type SessionId = Uuid;

/// Creates a new unique session ID.
pub fn new_session_id() -> SessionId {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.row, 5);
        assert_eq!(pos.col, 10);
    }

    #[test]
    fn test_position_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(pos2), 7);
        assert_eq!(pos2.manhattan_distance(pos1), 7);
    }

    #[test]
    fn test_position_cardinal_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.cardinal_adjacent_positions();
        assert_eq!(adjacent.len(), 4);
        assert!(adjacent.contains(&Position::new(4, 5)));
        assert!(adjacent.contains(&Position::new(5, 4)));
        assert!(!adjacent.contains(&Position::new(4, 4)));
    }

    #[test]
    fn test_position_arithmetic() {
        let pos1 = Position::new(5, 10);
        let pos2 = Position::new(3, 2);
        assert_eq!(pos1 + pos2, Position::new(8, 12));
        assert_eq!(pos1 - pos2, Position::new(2, 8));
    }

    #[test]
    fn test_direction_round_trip_through_delta() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_delta(direction.to_delta()), Some(direction));
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(Direction::from_delta(Position::new(1, 1)), None);
    }

    #[test]
    fn test_session_id_uniqueness() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
