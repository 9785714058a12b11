//! # Rendering Module
//!
//! Text rendering of world snapshots for terminals and logs.

pub mod display;

pub use display::*;
