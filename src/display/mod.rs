//! Display Client
//!
//! Client-side model of the challenge panel, fed by networked server
//! messages.

pub mod hud;

pub use hud::{ChallengeHud, ChallengeRow, HudError};
