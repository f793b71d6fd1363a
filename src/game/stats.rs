//! Player and Team Stat Accumulators
//!
//! Running counters derived from the event stream. Only the dispatcher
//! writes here; completion predicates read the results.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::ids::{GameTime, PlayerId, Team};

/// Per-player counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Non-hero last hits
    pub last_hits: u32,
    /// Allied units denied
    pub denies: u32,
    /// Trees destroyed
    pub trees_cut: u32,
    /// Damage dealt to enemy heroes
    pub hero_damage: f64,
    /// HP healed
    pub healing: f64,
    /// Accumulated stun seconds from known stun abilities
    pub stun_duration: f64,
    /// Current hero level
    pub level: u32,
    /// Dust of Appearance purchased
    pub dust_purchased: u32,
    /// Kills counted by the double-kill window
    pub kills: u32,
    /// Time of the last counted kill
    pub last_kill_time: GameTime,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            last_hits: 0,
            denies: 0,
            trees_cut: 0,
            hero_damage: 0.0,
            healing: 0.0,
            stun_duration: 0.0,
            level: 1,
            dust_purchased: 0,
            kills: 0,
            last_kill_time: 0.0,
        }
    }
}

/// Per-team counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    /// Dust of Appearance purchased by the whole team
    pub dust_purchased: u32,
    /// Trees destroyed (counted for the team)
    pub trees_cut: u32,
}

/// All accumulators for one match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsBook {
    players: BTreeMap<PlayerId, PlayerStats>,
    teams: BTreeMap<Team, TeamStats>,
}

impl Default for StatsBook {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsBook {
    /// Team stats for both sides, no players yet.
    pub fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            teams: Team::ALL.iter().map(|t| (*t, TeamStats::default())).collect(),
        }
    }

    /// Create stats for `player` if this is the first time we see them.
    pub fn ensure_player(&mut self, player: PlayerId) -> &mut PlayerStats {
        self.players.entry(player).or_default()
    }

    /// Stats for a player already seen.
    pub fn player(&self, player: PlayerId) -> Option<&PlayerStats> {
        self.players.get(&player)
    }

    /// Mutable stats for a player already seen.
    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut PlayerStats> {
        self.players.get_mut(&player)
    }

    /// All tracked players in slot order.
    pub fn players(&self) -> impl Iterator<Item = (PlayerId, &PlayerStats)> {
        self.players.iter().map(|(id, s)| (*id, s))
    }

    /// Team counters (zeroed if the side never recorded anything).
    pub fn team(&self, team: Team) -> TeamStats {
        self.teams.get(&team).cloned().unwrap_or_default()
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamStats {
        self.teams.entry(team).or_default()
    }

    /// Count a dust purchase. Returns the team's new total.
    pub fn record_dust(&mut self, player: PlayerId, team: Team) -> u32 {
        self.ensure_player(player).dust_purchased += 1;
        let stats = self.team_mut(team);
        stats.dust_purchased += 1;
        stats.dust_purchased
    }

    /// Count a tree for every team. Returns the highest team total.
    pub fn record_tree_for_all_teams(&mut self) -> u32 {
        for team in Team::ALL {
            self.team_mut(team).trees_cut += 1;
        }
        self.max_team_trees()
    }

    /// Highest trees total across teams.
    pub fn max_team_trees(&self) -> u32 {
        self.teams.values().map(|t| t.trees_cut).max().unwrap_or(0)
    }

    /// Count a last hit. Returns the player's new total.
    pub fn record_last_hit(&mut self, player: PlayerId) -> u32 {
        let stats = self.ensure_player(player);
        stats.last_hits += 1;
        stats.last_hits
    }

    /// Count a deny. Returns the player's new total.
    pub fn record_deny(&mut self, player: PlayerId) -> u32 {
        let stats = self.ensure_player(player);
        stats.denies += 1;
        stats.denies
    }

    /// Add stun seconds. Returns the player's new total.
    pub fn record_stun(&mut self, player: PlayerId, seconds: f64) -> f64 {
        let stats = self.ensure_player(player);
        stats.stun_duration += seconds.max(0.0);
        stats.stun_duration
    }

    /// Add hero damage. Returns the player's new total.
    pub fn record_hero_damage(&mut self, player: PlayerId, amount: f64) -> f64 {
        let stats = self.ensure_player(player);
        stats.hero_damage += amount.max(0.0);
        stats.hero_damage
    }

    /// Add healing. Returns the player's new total.
    pub fn record_healing(&mut self, player: PlayerId, amount: f64) -> f64 {
        let stats = self.ensure_player(player);
        stats.healing += amount.max(0.0);
        stats.healing
    }

    /// Set the player's level.
    pub fn record_level(&mut self, player: PlayerId, level: u32) {
        self.ensure_player(player).level = level;
    }

    /// Highest level among tracked players.
    pub fn max_level(&self) -> u32 {
        self.players.values().map(|p| p.level).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_player_defaults() {
        let mut book = StatsBook::new();
        let p = PlayerId::new(3);
        assert!(book.player(p).is_none());

        let stats = book.ensure_player(p);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.last_hits, 0);

        // Second call keeps existing values
        book.record_last_hit(p);
        book.ensure_player(p);
        assert_eq!(book.player(p).unwrap().last_hits, 1);
    }

    #[test]
    fn test_team_dust_aggregates_players() {
        let mut book = StatsBook::new();
        book.record_dust(PlayerId::new(0), Team::Radiant);
        book.record_dust(PlayerId::new(1), Team::Radiant);
        assert_eq!(book.record_dust(PlayerId::new(5), Team::Dire), 1);

        assert_eq!(book.team(Team::Radiant).dust_purchased, 2);
        assert_eq!(book.player(PlayerId::new(1)).unwrap().dust_purchased, 1);
    }

    #[test]
    fn test_trees_count_for_both_teams() {
        let mut book = StatsBook::new();
        assert_eq!(book.record_tree_for_all_teams(), 1);
        assert_eq!(book.record_tree_for_all_teams(), 2);
        assert_eq!(book.team(Team::Radiant).trees_cut, 2);
        assert_eq!(book.team(Team::Dire).trees_cut, 2);
    }

    #[test]
    fn test_negative_amounts_ignored() {
        let mut book = StatsBook::new();
        let p = PlayerId::new(0);
        book.record_healing(p, 50.0);
        assert_eq!(book.record_healing(p, -20.0), 50.0);
        assert_eq!(book.record_stun(p, -1.0), 0.0);
    }
}
