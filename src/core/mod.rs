//! Core primitives.
//!
//! Identifiers, heuristic classifiers and the game-time scheduler shared by
//! the challenge logic and the network layer.

pub mod ids;
pub mod classify;
pub mod timers;

// Re-export core types
pub use ids::{PlayerId, EntityIndex, Team, GameTime};
pub use classify::{AbilityClassifier, NameHeuristics};
pub use timers::{Timers, TimerHandle};
