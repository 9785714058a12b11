//! # Generation Module
//!
//! Procedural maze generation.
//!
//! Generators implement [`Generator`] over a [`GenerationConfig`] and a seeded
//! random source, so the same seed always produces the same board.

pub mod maze;

pub use maze::*;

use crate::ChaseResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Board height in cells
    pub rows: usize,
    /// Board width in cells
    pub cols: usize,
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Probability that an open interior cell receives a dot rather than a
    /// power pellet (0.0 to 1.0)
    pub dot_chance: f64,
    /// Minimum share of the board that must be open (0.0 to 1.0)
    pub min_open_ratio: f64,
}

impl GenerationConfig {
    /// Creates a configuration with the classic collectible split.
    ///
    /// # Examples
    ///
    /// ```
    /// use mazechase::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(21, 27, 42);
    /// assert_eq!(config.rows, 21);
    /// assert!(config.dot_chance > 0.5);
    /// ```
    pub fn new(rows: usize, cols: usize, seed: u64) -> Self {
        Self {
            rows,
            cols,
            seed,
            dot_chance: 0.9,
            min_open_ratio: 0.1,
        }
    }

    /// Creates a small board for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self::new(11, 13, seed)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ROWS, crate::config::DEFAULT_COLS, 42)
    }
}

/// Trait for content generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> ChaseResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> ChaseResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Creates a seeded random number generator from the config.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed)
}
