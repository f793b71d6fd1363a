//! Host Engine Boundary
//!
//! The engine is an opaque collaborator. Challenge logic only reaches it
//! through [`Host`] for lookups and announcements, and through [`EventBus`]
//! to subscribe to event kinds.

use std::collections::BTreeMap;

use crate::core::ids::{EntityIndex, GameTime, PlayerId, Team};
use crate::game::events::EventKind;

/// Point-in-time view of a player's assigned hero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeroStatus {
    /// Hero is alive
    pub alive: bool,
    /// Physical armor value
    pub armor: f64,
    /// Attacks per second
    pub attacks_per_second: f64,
    /// Item names by inventory slot (`None` = empty slot)
    pub inventory: Vec<Option<String>>,
}

impl HeroStatus {
    /// Whether `item` sits in one of the first `slots` inventory slots.
    pub fn holds_item(&self, item: &str, slots: usize) -> bool {
        self.inventory
            .iter()
            .take(slots)
            .any(|slot| slot.as_deref() == Some(item))
    }
}

/// Engine services used by the challenge logic.
///
/// Every lookup may come back empty: events routinely reference creeps,
/// buildings or players that already left.
pub trait Host {
    /// Current game time.
    fn game_time(&self) -> GameTime;

    /// Valid player slots in the match.
    fn player_slots(&self) -> Vec<PlayerId>;

    /// Team of a player.
    fn team_of(&self, player: PlayerId) -> Option<Team>;

    /// Owning player of `entity` if it is a real hero (not an illusion or creep).
    fn resolve_real_hero(&self, entity: EntityIndex) -> Option<PlayerId>;

    /// The player's assigned hero, if spawned.
    fn hero_status(&self, player: PlayerId) -> Option<HeroStatus>;

    /// Show a message to everyone in game.
    fn announce(&mut self, message: &str);

    /// End the game with `team` as winner.
    fn declare_winner(&mut self, team: Team);
}

/// Event subscription surface of the engine.
pub trait EventBus {
    /// Deliver events of `kind` to the match.
    fn listen(&mut self, kind: EventKind);
}

// =============================================================================
// LOCAL HOST
// =============================================================================

/// In-memory engine stand-in for replays, demos and tests.
///
/// Hero entities are registered explicitly; any other entity index resolves
/// to nothing, like a creep or an illusion would.
#[derive(Clone, Debug, Default)]
pub struct LocalHost {
    /// Current game time
    pub time: GameTime,
    /// Team of each connected player
    pub teams: BTreeMap<PlayerId, Team>,
    /// Real hero entities and their owners
    pub hero_entities: BTreeMap<EntityIndex, PlayerId>,
    /// Hero status per player
    pub heroes: BTreeMap<PlayerId, HeroStatus>,
    /// Every announcement made, in order
    pub announcements: Vec<String>,
    /// Winner, once declared
    pub winner: Option<Team>,
    /// Event kinds subscribed through [`EventBus`]
    pub listening: Vec<EventKind>,
}

impl LocalHost {
    /// Base entity index for hero entities created by [`LocalHost::standard`].
    pub const HERO_ENTITY_BASE: i32 = 100;

    /// Ten players: slots 0-4 Radiant, 5-9 Dire, each with a real hero
    /// entity at `HERO_ENTITY_BASE + slot`.
    pub fn standard() -> Self {
        let mut host = Self::default();
        for slot in 0..10u32 {
            let team = if slot < 5 { Team::Radiant } else { Team::Dire };
            host.add_player(PlayerId::new(slot), team);
        }
        host
    }

    /// Add a player with a real hero entity.
    pub fn add_player(&mut self, player: PlayerId, team: Team) {
        self.teams.insert(player, team);
        self.hero_entities.insert(Self::hero_entity(player), player);
    }

    /// Entity index of a player's hero.
    pub fn hero_entity(player: PlayerId) -> EntityIndex {
        EntityIndex(Self::HERO_ENTITY_BASE + player.slot() as i32)
    }
}

impl Host for LocalHost {
    fn game_time(&self) -> GameTime {
        self.time
    }

    fn player_slots(&self) -> Vec<PlayerId> {
        self.teams.keys().copied().collect()
    }

    fn team_of(&self, player: PlayerId) -> Option<Team> {
        self.teams.get(&player).copied()
    }

    fn resolve_real_hero(&self, entity: EntityIndex) -> Option<PlayerId> {
        self.hero_entities.get(&entity).copied()
    }

    fn hero_status(&self, player: PlayerId) -> Option<HeroStatus> {
        self.heroes.get(&player).cloned()
    }

    fn announce(&mut self, message: &str) {
        self.announcements.push(message.to_string());
    }

    fn declare_winner(&mut self, team: Team) {
        self.winner = Some(team);
    }
}

impl EventBus for LocalHost {
    fn listen(&mut self, kind: EventKind) {
        if !self.listening.contains(&kind) {
            self.listening.push(kind);
        }
    }
}
