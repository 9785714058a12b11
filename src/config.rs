//! # Configuration
//!
//! Compile-time game constants and the runtime [`ChaseConfig`].

use crate::{ChaseError, ChaseResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Smallest board accepted by [`crate::GameSession::start_game`].
pub const MIN_BOARD_DIMENSION: usize = 10;

/// Largest board accepted by [`crate::GameSession::start_game`].
pub const MAX_BOARD_DIMENSION: usize = 100;

/// Smallest board the maze generator can carve at all.
pub const MIN_MAZE_DIMENSION: usize = 5;

/// Default board height in cells
pub const DEFAULT_ROWS: usize = 21;

/// Default board width in cells
pub const DEFAULT_COLS: usize = 27;

/// Number of pursuers per game
pub const PURSUER_COUNT: usize = 4;

/// Points for a dot
pub const DOT_POINTS: u32 = 10;

/// Points for a power pellet
pub const PELLET_POINTS: u32 = 50;

/// Points for picking up a power-up
pub const POWER_UP_POINTS: u32 = 100;

/// Points for catching a frightened pursuer
pub const PURSUER_POINTS: u32 = 200;

/// Maximum number of high-score records kept
pub const MAX_HIGH_SCORES: usize = 10;

/// Runtime tuning for a game session.
///
/// Every field has a default matching the classic timing, so a partial JSON
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseConfig {
    /// Logic worker cadence in milliseconds
    pub logic_cadence_ms: u64,
    /// Animation worker cadence in milliseconds
    pub animation_cadence_ms: u64,
    /// Spawn-maintenance worker cadence in milliseconds
    pub spawn_cadence_ms: u64,
    /// Render worker cadence in milliseconds
    pub render_cadence_ms: u64,
    /// How long `stop` waits for each worker before abandoning it
    pub join_timeout_ms: u64,
    /// Lives at game start
    pub initial_lives: u32,
    /// Interval between dot respawn passes
    pub dot_respawn_interval_ms: u64,
    /// Chance that an eligible empty cell receives a collectible
    pub dot_respawn_chance: f64,
    /// Interval between power-up spawn attempts
    pub power_up_spawn_interval_ms: u64,
    /// Chance that a spawn attempt places a power-up
    pub power_up_spawn_chance: f64,
    /// Minimum time between two pursuer decisions
    pub decision_interval_ms: u64,
    /// Score that ends the game in victory, if any
    pub victory_score: Option<u32>,
    /// Fixed seed for maze and entity randomness
    pub seed: Option<u64>,
    /// Capacity of the event channel handed to observers
    pub event_capacity: usize,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            logic_cadence_ms: 80,
            animation_cadence_ms: 150,
            spawn_cadence_ms: 500,
            render_cadence_ms: 40,
            join_timeout_ms: 1000,
            initial_lives: 3,
            dot_respawn_interval_ms: 5000,
            dot_respawn_chance: 0.3,
            power_up_spawn_interval_ms: 3000,
            power_up_spawn_chance: 0.2,
            decision_interval_ms: 400,
            victory_score: None,
            seed: None,
            event_capacity: 256,
        }
    }
}

impl ChaseConfig {
    /// Creates a configuration for tests: fixed seed, no victory score.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file and validates it.
    pub fn load_from_path(path: impl AsRef<Path>) -> ChaseResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ChaseConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cadences and probabilities.
    pub fn validate(&self) -> ChaseResult<()> {
        let cadences = [
            ("logic_cadence_ms", self.logic_cadence_ms),
            ("animation_cadence_ms", self.animation_cadence_ms),
            ("spawn_cadence_ms", self.spawn_cadence_ms),
            ("render_cadence_ms", self.render_cadence_ms),
        ];
        for (name, value) in cadences {
            if value == 0 {
                return Err(ChaseError::InvalidState(format!("{} must be positive", name)));
            }
        }

        let chances = [
            ("dot_respawn_chance", self.dot_respawn_chance),
            ("power_up_spawn_chance", self.power_up_spawn_chance),
        ];
        for (name, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(ChaseError::InvalidState(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }

        if self.event_capacity == 0 {
            return Err(ChaseError::InvalidState(
                "event_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChaseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_lives, 3);
        assert_eq!(config.render_cadence_ms, 40);
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let config = ChaseConfig {
            logic_cadence_ms: 0,
            ..ChaseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chance_out_of_range_rejected() {
        let config = ChaseConfig {
            dot_respawn_chance: 1.5,
            ..ChaseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ChaseConfig = serde_json::from_str(r#"{"initial_lives": 5}"#).unwrap();
        assert_eq!(config.initial_lives, 5);
        assert_eq!(config.logic_cadence_ms, 80);
        assert!(config.victory_score.is_none());
    }
}
