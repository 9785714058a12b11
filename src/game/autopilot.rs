//! # Autopilot Module
//!
//! Steers the player automatically for demos and soak runs: walk to the
//! nearest collectible while keeping clear of pursuers that can still bite.

use crate::game::{Direction, Position, WorldSnapshot};
use crate::input::Intent;
use crate::utils::path_to_nearest;
use std::collections::HashSet;

/// Autopilot state carried between ticks.
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Whether the autopilot is currently steering
    pub enabled: bool,
    /// Remaining cells of the path being followed, next step first
    pub current_path: Vec<Position>,
    /// Cell the current path leads to
    pub target: Option<Position>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an autopilot that is already steering.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Toggles the autopilot on/off.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.clear();
        }
        self.enabled
    }

    /// Reacts to a player intent. Returns true when the intent was meant for
    /// the autopilot and should go no further.
    ///
    /// A manual move while steering hands control back to the player.
    pub fn handle_intent(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::ToggleAutopilot => {
                self.toggle();
                true
            }
            intent if intent.is_gameplay() && self.enabled => {
                self.toggle();
                false
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        self.current_path.clear();
        self.target = None;
    }

    /// Cells on or next to a pursuer that is not frightened.
    fn danger_zone(snapshot: &WorldSnapshot) -> HashSet<Position> {
        snapshot
            .pursuers
            .iter()
            .filter(|p| !p.frightened)
            .flat_map(|p| {
                let mut cells = p.position.cardinal_adjacent_positions();
                cells.push(p.position);
                cells
            })
            .collect()
    }

    /// Picks the direction to request for the next tick, if any.
    pub fn next_direction(&mut self, snapshot: &WorldSnapshot) -> Option<Direction> {
        if !self.enabled || snapshot.status.is_terminal() {
            return None;
        }

        let here = snapshot.player.position;
        let danger = Self::danger_zone(snapshot);

        // Drop steps already taken, then keep following while it stays safe.
        if let Some(index) = self.current_path.iter().position(|&pos| pos == here) {
            self.current_path.drain(..=index);
        }
        let still_valid = self.current_path.first().map_or(false, |&next| {
            next.manhattan_distance(here) == 1
                && snapshot.board.is_passable(next)
                && !danger.contains(&next)
        });
        let target_present = self
            .target
            .map_or(false, |target| Self::is_goal(snapshot, target));
        if !still_valid || !target_present {
            self.replan(snapshot, &danger);
        }

        let next = *self.current_path.first()?;
        Direction::from_delta(next - here)
    }

    fn is_goal(snapshot: &WorldSnapshot, pos: Position) -> bool {
        let collectible = snapshot
            .board
            .content(pos)
            .map_or(false, |content| content.is_collectible());
        let prey = snapshot
            .pursuers
            .iter()
            .any(|p| p.frightened && p.position == pos);
        collectible || prey
    }

    fn replan(&mut self, snapshot: &WorldSnapshot, danger: &HashSet<Position>) {
        self.clear();
        let here = snapshot.player.position;
        let goal = |pos: Position| Self::is_goal(snapshot, pos);

        let path = path_to_nearest(&snapshot.board, here, |pos| danger.contains(&pos), goal)
            .or_else(|| {
                // Cornered: any safe neighbour beats standing still.
                snapshot
                    .board
                    .passable_neighbors(here)
                    .into_iter()
                    .find(|pos| !danger.contains(pos))
                    .map(|pos| vec![here, pos])
            });

        if let Some(mut path) = path {
            path.remove(0);
            self.target = path.last().copied();
            self.current_path = path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChaseConfig;
    use crate::game::{CellContent, Grid, ManualClock, World};
    use std::sync::Arc;

    /// 7x9 board: open row 1 with a dot at its far end, open column 1 below.
    fn corridor_world() -> World {
        let mut grid = Grid::new(7, 9);
        for col in 1..=7 {
            grid.set_content(Position::new(1, col), CellContent::Empty);
        }
        for row in 2..=5 {
            grid.set_content(Position::new(row, 1), CellContent::Empty);
        }
        grid.set_content(Position::new(1, 7), CellContent::Dot);
        grid.set_player_spawn(Position::new(1, 1));
        grid.set_pursuer_anchor(Position::new(5, 1));
        let mut world = World::with_grid(
            grid,
            ChaseConfig::for_testing(4),
            Arc::new(ManualClock::new()),
            4,
        );
        for pursuer in &mut world.pursuers {
            pursuer.position = Position::new(5, 1);
            pursuer.frozen = true;
        }
        world
    }

    #[test]
    fn test_autopilot_toggle() {
        let mut autopilot = Autopilot::new();
        assert!(!autopilot.enabled);
        assert!(autopilot.toggle());
        autopilot.current_path.push(Position::new(1, 1));
        assert!(!autopilot.toggle());
        assert!(autopilot.current_path.is_empty());
    }

    #[test]
    fn test_manual_move_takes_control_back() {
        let mut autopilot = Autopilot::new();
        assert!(autopilot.handle_intent(Intent::ToggleAutopilot));
        assert!(autopilot.enabled);

        assert!(!autopilot.handle_intent(Intent::TogglePause));
        assert!(autopilot.enabled);

        assert!(!autopilot.handle_intent(Intent::Move(Direction::Left)));
        assert!(!autopilot.enabled);
        assert!(!autopilot.handle_intent(Intent::Move(Direction::Up)));
        assert!(!autopilot.enabled);
    }

    #[test]
    fn test_disabled_autopilot_is_silent() {
        let world = corridor_world();
        assert_eq!(Autopilot::new().next_direction(&world.snapshot()), None);
    }

    #[test]
    fn test_heads_for_collectible() {
        let world = corridor_world();
        let mut autopilot = Autopilot::enabled();
        assert_eq!(autopilot.next_direction(&world.snapshot()), Some(Direction::Right));
        assert_eq!(autopilot.target, Some(Position::new(1, 7)));
        assert_eq!(autopilot.current_path.len(), 6);
    }

    #[test]
    fn test_avoids_pursuer() {
        let mut world = corridor_world();
        world.pursuers[0].position = Position::new(1, 3);
        let mut autopilot = Autopilot::enabled();
        // The only route east runs past the pursuer, so retreat south instead.
        assert_eq!(autopilot.next_direction(&world.snapshot()), Some(Direction::Down));
    }
}
