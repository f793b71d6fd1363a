//! Identifier Primitives
//!
//! Player slots, entity handles, teams and game time as the engine reports them.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Game clock value in seconds since the engine started the match.
pub type GameTime = f64;

// =============================================================================
// PLAYER ID
// =============================================================================

/// Player slot index assigned by the engine (0-based).
///
/// Implements Ord so per-player tables iterate in slot order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Create from a raw slot index.
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Raw slot index.
    pub fn slot(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Engine entity index. May refer to any unit, not only heroes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityIndex(pub i32);

// =============================================================================
// TEAM
// =============================================================================

/// Playable team side.
///
/// Discriminants are the engine's team numbers, which is also what
/// display clients receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Team {
    /// The "good guys" side
    Radiant = 2,
    /// The "bad guys" side
    Dire = 3,
}

impl Team {
    /// Both sides, in wire order.
    pub const ALL: [Team; 2] = [Team::Radiant, Team::Dire];

    /// Engine team number.
    #[inline]
    pub fn wire_value(self) -> i32 {
        self as i32
    }

    /// Parse an engine team number. Spectators and neutrals have no side.
    pub fn from_wire(value: i32) -> Option<Team> {
        match value {
            2 => Some(Team::Radiant),
            3 => Some(Team::Dire),
            _ => None,
        }
    }

    /// Human-readable side name used in announcements.
    pub fn name(self) -> &'static str {
        match self {
            Team::Radiant => "Radiant",
            Team::Dire => "Dire",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
