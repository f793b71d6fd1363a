//! Inbound Game Events
//!
//! One variant per engine event kind. Payloads are validated here, at the
//! boundary: engine 0/1 flags become `bool`, optional fields default, and
//! unknown event names are rejected before anything reaches the dispatcher.

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::core::ids::{EntityIndex, PlayerId};

/// Engine 0/1 flags, accepted as numbers or booleans.
mod flag {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(b),
            Raw::Int(0) => Ok(false),
            Raw::Int(1) => Ok(true),
            Raw::Float(f) if f == 0.0 => Ok(false),
            Raw::Float(f) if f == 1.0 => Ok(true),
            Raw::Int(n) => Err(D::Error::custom(format!("flag must be 0 or 1, got {n}"))),
            Raw::Float(f) => Err(D::Error::custom(format!("flag must be 0 or 1, got {f}"))),
        }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// `dota_item_purchased`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemPurchased {
    #[serde(rename = "PlayerID")]
    pub player_id: PlayerId,
    #[serde(rename = "itemname")]
    pub item_name: String,
    #[serde(rename = "itemcost", default)]
    pub item_cost: u32,
}

/// `dota_item_combined`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemCombined {
    #[serde(rename = "PlayerID")]
    pub player_id: PlayerId,
    #[serde(rename = "itemname")]
    pub item_name: String,
    #[serde(rename = "itemcost", default)]
    pub item_cost: u32,
}

/// `dota_item_used`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemUsed {
    #[serde(rename = "PlayerID")]
    pub player_id: PlayerId,
    #[serde(rename = "itemname")]
    pub item_name: String,
    /// Item charges at the moment of use, when the host can read them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charges: Option<u32>,
}

/// `dota_player_killed`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerKilled {
    /// Victim
    #[serde(rename = "PlayerID")]
    pub player_id: PlayerId,
    #[serde(rename = "HeroKill", with = "flag", default)]
    pub hero_kill: bool,
    #[serde(rename = "TowerKill", with = "flag", default)]
    pub tower_kill: bool,
}

/// `dota_player_used_ability`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityUsed {
    #[serde(rename = "PlayerID")]
    pub player_id: PlayerId,
    #[serde(rename = "abilityname")]
    pub ability_name: String,
    #[serde(rename = "caster_entindex", default, skip_serializing_if = "Option::is_none")]
    pub caster: Option<EntityIndex>,
}

/// `dota_ability_channel_finished`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityChannelFinished {
    #[serde(rename = "caster_entindex")]
    pub caster: EntityIndex,
    #[serde(rename = "abilityname", default)]
    pub ability_name: String,
    #[serde(with = "flag", default)]
    pub interrupted: bool,
}

/// `last_hit`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LastHit {
    #[serde(rename = "PlayerID")]
    pub player_id: PlayerId,
    #[serde(rename = "EntKilled", default)]
    pub entity_killed: EntityIndex,
    #[serde(rename = "FirstBlood", with = "flag", default)]
    pub first_blood: bool,
    #[serde(rename = "HeroKill", with = "flag", default)]
    pub hero_kill: bool,
    #[serde(rename = "TowerKill", with = "flag", default)]
    pub tower_kill: bool,
    /// Set by the host when the killed unit was allied (a deny)
    #[serde(with = "flag", default)]
    pub deny: bool,
}

/// `dota_tower_kill`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerKill {
    /// Entity that destroyed the tower
    #[serde(rename = "killer_userid")]
    pub killer: EntityIndex,
    #[serde(default)]
    pub gold: u32,
    #[serde(rename = "teamnumber", default)]
    pub team_number: i32,
}

/// `dota_roshan_kill`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoshanKill {
    #[serde(rename = "teamnumber")]
    pub team_number: i32,
    #[serde(default)]
    pub gold: u32,
}

/// `dota_miniboss_kill`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinibossKill {
    #[serde(rename = "teamnumber")]
    pub team_number: i32,
}

/// `tree_cut`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeCut {
    #[serde(default)]
    pub tree_x: f64,
    #[serde(default)]
    pub tree_y: f64,
}

/// `dota_ward_killed`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WardKilled {
    /// Entity that destroyed the ward
    #[serde(rename = "userid")]
    pub killer: EntityIndex,
    #[serde(default)]
    pub team: i32,
    #[serde(rename = "wardtype", default)]
    pub ward_type: i32,
}

/// `dota_rune_pickup`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunePickup {
    /// Entity that picked the rune up
    #[serde(rename = "userid")]
    pub picker: EntityIndex,
    /// Engine rune type number
    pub rune: u32,
}

impl RunePickup {
    /// Parsed rune type.
    pub fn rune_type(&self) -> Option<RuneType> {
        RuneType::from_index(self.rune)
    }
}

/// `dota_player_gained_level`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerGainedLevel {
    #[serde(rename = "PlayerID")]
    pub player_id: PlayerId,
    pub level: u32,
}

/// `dota_combatlog`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatLog {
    /// Engine combat log entry type
    #[serde(rename = "type")]
    pub entry_type: i32,
    #[serde(default)]
    pub value: f64,
    #[serde(rename = "attackerhero", with = "flag", default)]
    pub attacker_hero: bool,
    #[serde(rename = "targethero", with = "flag", default)]
    pub target_hero: bool,
    /// Owning player of the attacker/healer, resolved by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker_player: Option<PlayerId>,
}

impl CombatLog {
    /// Engine code for a damage entry.
    pub const DAMAGE: i32 = 0;
    /// Engine code for a heal entry.
    pub const HEAL: i32 = 1;

    /// Hero-to-hero damage entry.
    pub fn is_hero_damage(&self) -> bool {
        self.entry_type == Self::DAMAGE && self.attacker_hero && self.target_hero
    }

    /// Heal entry.
    pub fn is_heal(&self) -> bool {
        self.entry_type == Self::HEAL
    }
}

/// `game_rules_state_change`, with the new state filled in by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub state: GameRulesState,
}

/// `npc_spawned`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawned {
    #[serde(rename = "entindex")]
    pub entity: EntityIndex,
}

// =============================================================================
// ENUMS
// =============================================================================

/// Rune types as numbered by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum RuneType {
    DoubleDamage = 0,
    Haste = 1,
    Illusion = 2,
    Invisibility = 3,
    Regeneration = 4,
    Bounty = 5,
    Arcane = 6,
    Water = 7,
    Wisdom = 8,
    Shield = 9,
}

impl RuneType {
    /// Get from engine index.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(RuneType::DoubleDamage),
            1 => Some(RuneType::Haste),
            2 => Some(RuneType::Illusion),
            3 => Some(RuneType::Invisibility),
            4 => Some(RuneType::Regeneration),
            5 => Some(RuneType::Bounty),
            6 => Some(RuneType::Arcane),
            7 => Some(RuneType::Water),
            8 => Some(RuneType::Wisdom),
            9 => Some(RuneType::Shield),
            _ => None,
        }
    }
}

/// Game rules state machine of the host engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum GameRulesState {
    Init = 0,
    WaitForPlayersToLoad = 1,
    CustomGameSetup = 2,
    PlayerDraft = 3,
    HeroSelection = 4,
    StrategyTime = 5,
    TeamShowcase = 6,
    WaitForMapToLoad = 7,
    PreGame = 8,
    ScenarioSetup = 9,
    GameInProgress = 10,
    PostGame = 11,
    Disconnect = 12,
}

impl TryFrom<i32> for GameRulesState {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        use GameRulesState::*;
        Ok(match value {
            0 => Init,
            1 => WaitForPlayersToLoad,
            2 => CustomGameSetup,
            3 => PlayerDraft,
            4 => HeroSelection,
            5 => StrategyTime,
            6 => TeamShowcase,
            7 => WaitForMapToLoad,
            8 => PreGame,
            9 => ScenarioSetup,
            10 => GameInProgress,
            11 => PostGame,
            12 => Disconnect,
            other => return Err(format!("unknown game rules state {other}")),
        })
    }
}

impl From<GameRulesState> for i32 {
    fn from(state: GameRulesState) -> i32 {
        state as i32
    }
}

// =============================================================================
// EVENT
// =============================================================================

/// Kind of inbound event, used for subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    ItemPurchased,
    ItemCombined,
    ItemUsed,
    PlayerKilled,
    AbilityUsed,
    AbilityChannelFinished,
    LastHit,
    TowerKill,
    RoshanKill,
    MinibossKill,
    TreeCut,
    WardKilled,
    RunePickup,
    PlayerGainedLevel,
    CombatLog,
    StateChange,
    NpcSpawned,
}

impl EventKind {
    /// Every kind, in registration order.
    pub const ALL: [EventKind; 17] = [
        EventKind::StateChange,
        EventKind::NpcSpawned,
        EventKind::ItemPurchased,
        EventKind::ItemCombined,
        EventKind::ItemUsed,
        EventKind::PlayerKilled,
        EventKind::AbilityUsed,
        EventKind::AbilityChannelFinished,
        EventKind::LastHit,
        EventKind::TowerKill,
        EventKind::RoshanKill,
        EventKind::MinibossKill,
        EventKind::TreeCut,
        EventKind::WardKilled,
        EventKind::RunePickup,
        EventKind::PlayerGainedLevel,
        EventKind::CombatLog,
    ];

    /// Engine event name.
    pub fn engine_name(self) -> &'static str {
        match self {
            EventKind::ItemPurchased => "dota_item_purchased",
            EventKind::ItemCombined => "dota_item_combined",
            EventKind::ItemUsed => "dota_item_used",
            EventKind::PlayerKilled => "dota_player_killed",
            EventKind::AbilityUsed => "dota_player_used_ability",
            EventKind::AbilityChannelFinished => "dota_ability_channel_finished",
            EventKind::LastHit => "last_hit",
            EventKind::TowerKill => "dota_tower_kill",
            EventKind::RoshanKill => "dota_roshan_kill",
            EventKind::MinibossKill => "dota_miniboss_kill",
            EventKind::TreeCut => "tree_cut",
            EventKind::WardKilled => "dota_ward_killed",
            EventKind::RunePickup => "dota_rune_pickup",
            EventKind::PlayerGainedLevel => "dota_player_gained_level",
            EventKind::CombatLog => "dota_combatlog",
            EventKind::StateChange => "game_rules_state_change",
            EventKind::NpcSpawned => "npc_spawned",
        }
    }

    /// Look up a kind by engine name.
    pub fn from_engine_name(name: &str) -> Option<EventKind> {
        EventKind::ALL.into_iter().find(|k| k.engine_name() == name)
    }
}

/// Inbound game event.
///
/// Serialized with the engine event name under `"event"` next to the
/// payload fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum GameEvent {
    #[serde(rename = "dota_item_purchased")]
    ItemPurchased(ItemPurchased),
    #[serde(rename = "dota_item_combined")]
    ItemCombined(ItemCombined),
    #[serde(rename = "dota_item_used")]
    ItemUsed(ItemUsed),
    #[serde(rename = "dota_player_killed")]
    PlayerKilled(PlayerKilled),
    #[serde(rename = "dota_player_used_ability")]
    AbilityUsed(AbilityUsed),
    #[serde(rename = "dota_ability_channel_finished")]
    AbilityChannelFinished(AbilityChannelFinished),
    #[serde(rename = "last_hit")]
    LastHit(LastHit),
    #[serde(rename = "dota_tower_kill")]
    TowerKill(TowerKill),
    #[serde(rename = "dota_roshan_kill")]
    RoshanKill(RoshanKill),
    #[serde(rename = "dota_miniboss_kill")]
    MinibossKill(MinibossKill),
    #[serde(rename = "tree_cut")]
    TreeCut(TreeCut),
    #[serde(rename = "dota_ward_killed")]
    WardKilled(WardKilled),
    #[serde(rename = "dota_rune_pickup")]
    RunePickup(RunePickup),
    #[serde(rename = "dota_player_gained_level")]
    PlayerGainedLevel(PlayerGainedLevel),
    #[serde(rename = "dota_combatlog")]
    CombatLog(CombatLog),
    #[serde(rename = "game_rules_state_change")]
    StateChange(StateChange),
    #[serde(rename = "npc_spawned")]
    NpcSpawned(NpcSpawned),
}

/// Event parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Event name the dispatcher does not subscribe to.
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Payload does not match the event schema.
    #[error("Malformed {event} payload: {source}")]
    Malformed {
        /// Engine event name
        event: String,
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// Payload is not a JSON object.
    #[error("Payload for {0} is not an object")]
    NotAnObject(String),
}

impl GameEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ItemPurchased(_) => EventKind::ItemPurchased,
            GameEvent::ItemCombined(_) => EventKind::ItemCombined,
            GameEvent::ItemUsed(_) => EventKind::ItemUsed,
            GameEvent::PlayerKilled(_) => EventKind::PlayerKilled,
            GameEvent::AbilityUsed(_) => EventKind::AbilityUsed,
            GameEvent::AbilityChannelFinished(_) => EventKind::AbilityChannelFinished,
            GameEvent::LastHit(_) => EventKind::LastHit,
            GameEvent::TowerKill(_) => EventKind::TowerKill,
            GameEvent::RoshanKill(_) => EventKind::RoshanKill,
            GameEvent::MinibossKill(_) => EventKind::MinibossKill,
            GameEvent::TreeCut(_) => EventKind::TreeCut,
            GameEvent::WardKilled(_) => EventKind::WardKilled,
            GameEvent::RunePickup(_) => EventKind::RunePickup,
            GameEvent::PlayerGainedLevel(_) => EventKind::PlayerGainedLevel,
            GameEvent::CombatLog(_) => EventKind::CombatLog,
            GameEvent::StateChange(_) => EventKind::StateChange,
            GameEvent::NpcSpawned(_) => EventKind::NpcSpawned,
        }
    }

    /// Decode an engine event from its name and raw payload.
    pub fn from_engine(name: &str, payload: Value) -> Result<Self, EventError> {
        if EventKind::from_engine_name(name).is_none() {
            return Err(EventError::UnknownEvent(name.to_string()));
        }

        let mut object = match payload {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            _ => return Err(EventError::NotAnObject(name.to_string())),
        };
        object.insert("event".to_string(), Value::String(name.to_string()));

        serde_json::from_value(Value::Object(object)).map_err(|source| EventError::Malformed {
            event: name.to_string(),
            source,
        })
    }

    /// Decode a tagged JSON event (`{"event": "...", ...}`).
    pub fn from_json(s: &str) -> Result<Self, EventError> {
        let value: Value = serde_json::from_str(s).map_err(|source| EventError::Malformed {
            event: "<unparsed>".to_string(),
            source,
        })?;

        let name = value
            .get("event")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| EventError::UnknownEvent("<missing>".to_string()))?;

        Self::from_engine(&name, value)
    }

    /// Serialize to tagged JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
