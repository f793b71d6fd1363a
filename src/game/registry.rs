//! Challenge Registry
//!
//! Static challenge metadata and completion thresholds. Pure data.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

// =============================================================================
// CHALLENGE ID
// =============================================================================

/// Identifier of a tracked challenge.
///
/// Serializes as the wire key (`"dust200"`, `"lastHits150"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeId {
    Dust200,
    LotusCombo,
    UltimateOrb,
    FountainDeath,
    DoubleKill,
    CancelChannel,
    UseVeil,
    CastUltFirst,
    WandCharges20,
    LastHits150,
    Denies20,
    Heal1000,
    MaxAttackSpeed,
    HighestLevel,
    Armor30,
    MostStunDuration,
    LowestHeroDamage,
    KillTower,
    TormentorKill,
    RoshanKill,
    Trees100,
    Deward,
    BottleArcane,
}

impl ChallengeId {
    /// Every challenge, in display order.
    pub const ALL: [ChallengeId; 23] = [
        ChallengeId::Dust200,
        ChallengeId::LotusCombo,
        ChallengeId::UltimateOrb,
        ChallengeId::FountainDeath,
        ChallengeId::DoubleKill,
        ChallengeId::CancelChannel,
        ChallengeId::UseVeil,
        ChallengeId::CastUltFirst,
        ChallengeId::WandCharges20,
        ChallengeId::LastHits150,
        ChallengeId::Denies20,
        ChallengeId::Heal1000,
        ChallengeId::MaxAttackSpeed,
        ChallengeId::HighestLevel,
        ChallengeId::Armor30,
        ChallengeId::MostStunDuration,
        ChallengeId::LowestHeroDamage,
        ChallengeId::KillTower,
        ChallengeId::TormentorKill,
        ChallengeId::RoshanKill,
        ChallengeId::Trees100,
        ChallengeId::Deward,
        ChallengeId::BottleArcane,
    ];

    /// Wire key.
    pub fn key(self) -> &'static str {
        match self {
            ChallengeId::Dust200 => "dust200",
            ChallengeId::LotusCombo => "lotusCombo",
            ChallengeId::UltimateOrb => "ultimateOrb",
            ChallengeId::FountainDeath => "fountainDeath",
            ChallengeId::DoubleKill => "doubleKill",
            ChallengeId::CancelChannel => "cancelChannel",
            ChallengeId::UseVeil => "useVeil",
            ChallengeId::CastUltFirst => "castUltFirst",
            ChallengeId::WandCharges20 => "wandCharges20",
            ChallengeId::LastHits150 => "lastHits150",
            ChallengeId::Denies20 => "denies20",
            ChallengeId::Heal1000 => "heal1000",
            ChallengeId::MaxAttackSpeed => "maxAttackSpeed",
            ChallengeId::HighestLevel => "highestLevel",
            ChallengeId::Armor30 => "armor30",
            ChallengeId::MostStunDuration => "mostStunDuration",
            ChallengeId::LowestHeroDamage => "lowestHeroDamage",
            ChallengeId::KillTower => "killTower",
            ChallengeId::TormentorKill => "tormentorKill",
            ChallengeId::RoshanKill => "roshanKill",
            ChallengeId::Trees100 => "trees100",
            ChallengeId::Deward => "deward",
            ChallengeId::BottleArcane => "bottleArcane",
        }
    }
}

impl fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error for an unrecognized challenge key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown challenge key: {0}")]
pub struct UnknownChallenge(pub String);

impl FromStr for ChallengeId {
    type Err = UnknownChallenge;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChallengeId::ALL
            .into_iter()
            .find(|id| id.key() == s)
            .ok_or_else(|| UnknownChallenge(s.to_string()))
    }
}

// =============================================================================
// DEFINITIONS
// =============================================================================

/// Immutable description of one challenge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDefinition {
    /// Identifier
    pub id: ChallengeId,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Completion threshold (1 = one-shot)
    pub max_progress: f64,
}

impl ChallengeDefinition {
    /// Create a definition.
    pub fn new(id: ChallengeId, name: &str, description: &str, max_progress: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            max_progress,
        }
    }

    /// True for boolean challenges.
    pub fn is_one_shot(&self) -> bool {
        self.max_progress <= 1.0
    }
}

const STANDARD: [(ChallengeId, &str, &str, f64); 23] = [
    (ChallengeId::Dust200, "Dust Collector", "Buy 200 Dust of Appearance", 200.0),
    (ChallengeId::LotusCombo, "Lotus Master", "Combine a Lotus Orb", 1.0),
    (ChallengeId::UltimateOrb, "Ultimate Power", "Purchase an Ultimate Orb", 1.0),
    (ChallengeId::FountainDeath, "Fountain Dive", "Die to the enemy fountain", 1.0),
    (ChallengeId::DoubleKill, "Double Trouble", "Get a double kill", 1.0),
    (ChallengeId::CancelChannel, "Interrupt", "Cancel a channeling ability", 1.0),
    (ChallengeId::UseVeil, "Veil User", "Use Veil of Discord", 1.0),
    (ChallengeId::CastUltFirst, "Ultimate First", "Be first to cast an ultimate", 1.0),
    (ChallengeId::WandCharges20, "Charged Up", "Use Magic Wand with 20 charges", 1.0),
    (ChallengeId::LastHits150, "Farming King", "Get 150 last hits", 150.0),
    (ChallengeId::Denies20, "Deny Master", "Get 20 denies", 20.0),
    (ChallengeId::Heal1000, "Healer", "Heal 1000 HP", 1000.0),
    (ChallengeId::MaxAttackSpeed, "Speed Demon", "Reach maximum attack speed", 1.0),
    (ChallengeId::HighestLevel, "Level Leader", "Have the highest ending level", 1.0),
    (ChallengeId::Armor30, "Tank", "Reach at least 30 armor", 1.0),
    (ChallengeId::MostStunDuration, "Stunner", "Deal the most stun duration", 1.0),
    (ChallengeId::LowestHeroDamage, "Pacifist", "Deal the lowest hero damage", 1.0),
    (ChallengeId::KillTower, "Tower Destroyer", "Kill a tower", 1.0),
    (ChallengeId::TormentorKill, "Tormentor Slayer", "Kill a Tormentor", 1.0),
    (ChallengeId::RoshanKill, "Roshan Slayer", "Kill Roshan", 1.0),
    (ChallengeId::Trees100, "Lumberjack", "Destroy 100 trees", 100.0),
    (ChallengeId::Deward, "Dewarder", "Kill an enemy ward", 1.0),
    (ChallengeId::BottleArcane, "Arcane Bottler", "Bottle an Arcane rune", 1.0),
];

/// Ordered set of challenge definitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeRegistry {
    definitions: Vec<ChallengeDefinition>,
}

impl ChallengeRegistry {
    /// Build from explicit definitions. Later duplicates of an id are dropped.
    pub fn new(definitions: Vec<ChallengeDefinition>) -> Self {
        let mut unique: Vec<ChallengeDefinition> = Vec::with_capacity(definitions.len());
        for def in definitions {
            if !unique.iter().any(|d| d.id == def.id) {
                unique.push(def);
            }
        }
        Self { definitions: unique }
    }

    /// The full game-mode challenge set.
    pub fn standard() -> Self {
        Self::new(
            STANDARD
                .iter()
                .map(|(id, name, description, max)| ChallengeDefinition::new(*id, name, description, *max))
                .collect(),
        )
    }

    /// Look up a definition.
    pub fn get(&self, id: ChallengeId) -> Option<&ChallengeDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Completion threshold, if registered.
    pub fn max_progress(&self, id: ChallengeId) -> Option<f64> {
        self.get(id).map(|d| d.max_progress)
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ChallengeDefinition> {
        self.definitions.iter()
    }

    /// Number of registered challenges.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for ChallengeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
