//! # Entities
//!
//! The player and the pursuers. Both are small positional state machines; all
//! rules that move them live in the world model.

use crate::game::{Direction, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// The player-controlled entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Position,
    pub current_direction: Option<Direction>,
    /// Requested turn, applied as soon as it becomes legal
    pub next_direction: Option<Direction>,
    pub speed_multiplier: f32,
    pub can_pass_walls: bool,
    pub double_points: bool,
    pub magnet: bool,
    pub animation_frame: u8,
}

impl Player {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            current_direction: None,
            next_direction: None,
            speed_multiplier: 1.0,
            can_pass_walls: false,
            double_points: false,
            magnet: false,
            animation_frame: 0,
        }
    }

    /// Buffers a direction request.
    pub fn request_direction(&mut self, direction: Direction) {
        self.next_direction = Some(direction);
    }

    pub fn is_moving(&self) -> bool {
        self.current_direction.is_some()
    }

    pub fn stop(&mut self) {
        self.current_direction = None;
        self.next_direction = None;
    }

    /// Cycles the four-frame mouth animation.
    pub fn advance_animation(&mut self) -> u8 {
        self.animation_frame = (self.animation_frame + 1) % 4;
        self.animation_frame
    }
}

/// Behaviour selected by a pursuer's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuerStrategy {
    /// Greedy chase along the closer axis
    Chaser,
    /// Aims a few cells ahead of the player's heading
    Ambusher,
    /// Mixes direct chase with random turns
    Erratic,
    /// Keeps its distance when close
    Keeper,
}

impl PursuerStrategy {
    pub fn for_id(id: usize) -> Self {
        match id % 4 {
            0 => PursuerStrategy::Chaser,
            1 => PursuerStrategy::Ambusher,
            2 => PursuerStrategy::Erratic,
            _ => PursuerStrategy::Keeper,
        }
    }

    pub fn color(self) -> PursuerColor {
        match self {
            PursuerStrategy::Chaser => PursuerColor::Red,
            PursuerStrategy::Ambusher => PursuerColor::Pink,
            PursuerStrategy::Erratic => PursuerColor::Cyan,
            PursuerStrategy::Keeper => PursuerColor::Orange,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuerColor {
    Red,
    Pink,
    Cyan,
    Orange,
}

/// An autonomous pursuer.
///
/// Each pursuer owns its random source so its choices do not depend on how
/// often the other pursuers draw.
#[derive(Debug, Clone)]
pub struct Pursuer {
    pub id: usize,
    pub strategy: PursuerStrategy,
    pub position: Position,
    pub direction: Direction,
    pub frightened: bool,
    pub frozen: bool,
    pub last_decision_ms: u64,
    pub rng: StdRng,
}

impl Pursuer {
    /// Creates pursuer `id` at `position`; `seed` feeds its private random source.
    pub fn new(id: usize, position: Position, seed: u64, now_ms: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(id as u64 * 1000));
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        Self {
            id,
            strategy: PursuerStrategy::for_id(id),
            position,
            direction,
            frightened: false,
            frozen: false,
            last_decision_ms: now_ms,
            rng,
        }
    }

    pub fn color(&self) -> PursuerColor {
        self.strategy.color()
    }

    /// Clears frightened/frozen and picks a fresh heading.
    pub fn reset(&mut self) {
        self.frightened = false;
        self.frozen = false;
        self.direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
    }

    pub fn view(&self) -> PursuerView {
        PursuerView {
            id: self.id,
            strategy: self.strategy,
            color: self.color(),
            position: self.position,
            direction: self.direction,
            frightened: self.frightened,
            frozen: self.frozen,
        }
    }
}

/// Read-only pursuer state for snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PursuerView {
    pub id: usize,
    pub strategy: PursuerStrategy,
    pub color: PursuerColor,
    pub position: Position,
    pub direction: Direction,
    pub frightened: bool,
    pub frozen: bool,
}
