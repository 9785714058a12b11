//! # Pursuer Decision Engine
//!
//! Chooses a heading for one pursuer. The engine only proposes; the world
//! model checks whether the move is legal. Decisions are rate limited, and
//! every failure of the random source degrades to a deterministic direct chase
//! so a decision can never abort a tick.

use crate::game::{Direction, Grid, Player, Position, Pursuer, PursuerStrategy};
use log::debug;
use rand::RngCore;

/// Default minimum time between two decisions of the same pursuer.
pub const DECISION_INTERVAL_MS: u64 = 400;

/// Distance under which the keeper may turn away.
pub const KEEPER_COMFORT_DISTANCE: u32 = 5;

/// Internal failure while proposing a direction.
///
/// Always handled inside this module; callers only ever see a direction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionFault {
    #[error("random source failed: {0}")]
    RandomSource(String),

    #[error("pursuer stands outside the board at {0}")]
    OffBoard(Position),
}

/// Uniform draw in `[0, 1)` that reports a failing random source.
fn draw_unit<R: RngCore + ?Sized>(rng: &mut R) -> Result<f64, DecisionFault> {
    let mut bytes = [0u8; 8];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| DecisionFault::RandomSource(e.to_string()))?;
    Ok((u64::from_le_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64)
}

fn chance<R: RngCore + ?Sized>(rng: &mut R, probability: f64) -> Result<bool, DecisionFault> {
    Ok(draw_unit(rng)? < probability)
}

fn draw_below<R: RngCore + ?Sized>(rng: &mut R, bound: usize) -> Result<usize, DecisionFault> {
    let index = (draw_unit(rng)? * bound as f64) as usize;
    Ok(index.min(bound.saturating_sub(1)))
}

/// A uniformly random cardinal direction.
pub fn random_direction<R: RngCore + ?Sized>(rng: &mut R) -> Result<Direction, DecisionFault> {
    Ok(Direction::ALL[draw_below(rng, Direction::ALL.len())?])
}

fn vertical_toward(delta_row: i32) -> Direction {
    if delta_row > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

fn horizontal_toward(delta_col: i32) -> Direction {
    if delta_col > 0 {
        Direction::Right
    } else {
        Direction::Left
    }
}

/// Steps along the axis with the larger gap; horizontal on a tie.
pub fn chase_direct(from: Position, target: Position) -> Direction {
    let delta = target - from;
    if delta.row.abs() > delta.col.abs() {
        vertical_toward(delta.row)
    } else {
        horizontal_toward(delta.col)
    }
}

/// Direct chase with equal gaps resolved by a coin flip between the axes.
fn chase<R: RngCore + ?Sized>(
    rng: &mut R,
    from: Position,
    target: Position,
) -> Result<Direction, DecisionFault> {
    let delta = target - from;
    if delta.row.abs() == delta.col.abs() {
        return Ok(if chance(rng, 0.5)? {
            vertical_toward(delta.row)
        } else {
            horizontal_toward(delta.col)
        });
    }
    Ok(chase_direct(from, target))
}

/// Steps along the larger-gap axis away from the target.
pub fn flee_direct(from: Position, target: Position) -> Direction {
    chase_direct(from, target).opposite()
}

/// Aims 3 to 5 cells ahead of the player's heading. The point may lie past
/// the border; only its offset from `from` matters.
fn ambush<R: RngCore + ?Sized>(
    rng: &mut R,
    from: Position,
    player: &Player,
) -> Result<Direction, DecisionFault> {
    let mut target = player.position;
    if let Some(heading) = player.current_direction {
        let lead = 3 + draw_below(rng, 3)? as i32;
        let delta = heading.to_delta();
        target = Position::new(
            target.row + delta.row * lead,
            target.col + delta.col * lead,
        );
    }
    Ok(chase_direct(from, target))
}

/// Proposes a heading for a pursuer standing at `from`.
///
/// # Examples
///
/// ```
/// use mazechase::{propose, Direction, Grid, Player, Position, PursuerStrategy};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let grid = Grid::new(12, 12);
/// let player = Player::new(Position::new(1, 8));
/// let mut rng = StdRng::seed_from_u64(3);
///
/// let heading = propose(PursuerStrategy::Chaser, false, Position::new(1, 1), &grid, &player, &mut rng);
/// assert_eq!(heading, Ok(Direction::Right));
/// ```
pub fn propose<R: RngCore + ?Sized>(
    strategy: PursuerStrategy,
    frightened: bool,
    from: Position,
    grid: &Grid,
    player: &Player,
    rng: &mut R,
) -> Result<Direction, DecisionFault> {
    if !grid.is_valid_position(from) {
        return Err(DecisionFault::OffBoard(from));
    }
    if frightened {
        return random_direction(rng);
    }

    let target = player.position;
    match strategy {
        PursuerStrategy::Chaser => chase(rng, from, target),
        PursuerStrategy::Ambusher => {
            if chance(rng, 0.8)? {
                ambush(rng, from, player)
            } else {
                chase(rng, from, target)
            }
        }
        PursuerStrategy::Erratic => {
            if chance(rng, 0.6)? {
                chase(rng, from, target)
            } else {
                random_direction(rng)
            }
        }
        PursuerStrategy::Keeper => {
            if from.manhattan_distance(target) < KEEPER_COMFORT_DISTANCE && chance(rng, 0.4)? {
                Ok(flee_direct(from, target))
            } else {
                chase(rng, from, target)
            }
        }
    }
}

/// Updates and returns the pursuer's heading for this tick.
///
/// Frozen pursuers and pursuers inside their decision interval keep their
/// current heading. A failed proposal is logged and replaced by a direct chase.
pub fn decide(
    pursuer: &mut Pursuer,
    grid: &Grid,
    player: &Player,
    now_ms: u64,
    interval_ms: u64,
) -> Direction {
    if pursuer.frozen {
        return pursuer.direction;
    }
    if now_ms.saturating_sub(pursuer.last_decision_ms) < interval_ms {
        return pursuer.direction;
    }

    let direction = match propose(
        pursuer.strategy,
        pursuer.frightened,
        pursuer.position,
        grid,
        player,
        &mut pursuer.rng,
    ) {
        Ok(direction) => direction,
        Err(fault) => {
            debug!("pursuer {} falling back to direct chase: {}", pursuer.id, fault);
            chase_direct(pursuer.position, player.position)
        }
    };

    pursuer.last_decision_ms = now_ms;
    pursuer.direction = direction;
    direction
}
