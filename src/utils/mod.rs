//! # Utilities Module
//!
//! Grid search helpers shared by maze generation, the world model and the
//! autopilot.

pub mod search;

pub use search::*;
