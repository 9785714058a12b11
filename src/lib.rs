//! # Mazechase
//!
//! A real-time maze chase game core: a player roams a procedurally carved maze
//! collecting dots while four pursuers hunt it down.
//!
//! ## Architecture Overview
//!
//! The crate is split the way the data flows, leaves first:
//!
//! - **Grid**: the passive cell substrate with validity and passability queries
//! - **Generation**: spanning-tree maze carving plus collectible and spawn placement
//! - **Entities**: the player and the pursuers, each a small positional state machine
//! - **Pursuer AI**: the per-tick decision engine, one strategy per pursuer identity
//! - **World / Engine**: the lock-guarded world model that owns every mutable piece
//! - **Scheduler / Session**: periodic worker threads with pause, resume and bounded shutdown
//!
//! Rendering, menus and keyboard handling live outside the core. They read
//! [`WorldSnapshot`] copies from the event channel and feed [`Intent`]s back in.

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scores;
pub mod utils;

// Core module re-exports
pub use config::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use scores::*;
pub use utils::*;

/// Core error type for the chase engine.
#[derive(thiserror::Error, Debug)]
pub enum ChaseError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Requested board size is outside the supported range
    #[error("Invalid board dimensions {rows}x{cols}: rows and cols must be within {min}..={max}")]
    InvalidDimension {
        rows: usize,
        cols: usize,
        min: usize,
        max: usize,
    },

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Maze generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A scheduled unit of work failed
    #[error("Worker fault: {0}")]
    WorkerFault(String),

    /// High-score entry was rejected
    #[error("Invalid score entry: {0}")]
    InvalidScore(String),
}

/// Result type used throughout the mazechase codebase.
pub type ChaseResult<T> = Result<T, ChaseError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
