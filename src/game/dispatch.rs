//! Event Dispatcher
//!
//! Routes each inbound event to its handler. Handlers update accumulators
//! first, then evaluate completion predicates and commit through
//! [`complete_challenge`]. Missing players, teams or heroes are skipped.

use tracing::{debug, info};

use crate::core::ids::{PlayerId, Team};
use crate::game::commit::complete_challenge;
use crate::game::events::*;
use crate::game::host::Host;
use crate::game::registry::ChallengeId;
use crate::game::state::{MatchPhase, MatchState};
use crate::game::stats::PlayerStats;
use crate::game::store::StoreError;

// =============================================================================
// ITEM NAMES
// =============================================================================

/// Dust of Appearance
pub const ITEM_DUST: &str = "item_dust";
/// Ultimate Orb
pub const ITEM_ULTIMATE_ORB: &str = "item_ultimate_orb";
/// Lotus Orb
pub const ITEM_LOTUS_ORB: &str = "item_lotus_orb";
/// Veil of Discord
pub const ITEM_VEIL: &str = "item_veil_of_discord";
/// Magic Wand
pub const ITEM_MAGIC_WAND: &str = "item_magic_wand";
/// Bottle
pub const ITEM_BOTTLE: &str = "item_bottle";

/// Announcement made when the victory item is bought.
pub const VICTORY_ANNOUNCEMENT: &str = "congrats";

// =============================================================================
// DISPATCH
// =============================================================================

/// Apply one event to the match.
pub fn dispatch(state: &mut MatchState, host: &mut dyn Host, event: &GameEvent) -> Result<(), StoreError> {
    #[cfg(feature = "debug-tracing")]
    tracing::trace!(kind = ?event.kind(), time = host.game_time(), ?event, "dispatch");

    match event {
        GameEvent::ItemPurchased(e) => on_item_purchased(state, host, e),
        GameEvent::ItemCombined(e) => on_item_combined(state, host, e),
        GameEvent::ItemUsed(e) => on_item_used(state, host, e),
        GameEvent::PlayerKilled(e) => on_player_killed(state, host, e),
        GameEvent::AbilityUsed(e) => on_ability_used(state, host, e),
        GameEvent::AbilityChannelFinished(e) => on_channel_finished(state, host, e),
        GameEvent::LastHit(e) => on_last_hit(state, host, e),
        GameEvent::TowerKill(e) => on_tower_kill(state, host, e),
        GameEvent::RoshanKill(e) => on_team_objective(state, host, e.team_number, ChallengeId::RoshanKill, "Kill Roshan"),
        GameEvent::MinibossKill(e) => {
            on_team_objective(state, host, e.team_number, ChallengeId::TormentorKill, "Kill a Tormentor")
        }
        GameEvent::TreeCut(_) => on_tree_cut(state, host),
        GameEvent::WardKilled(e) => on_ward_killed(state, host, e),
        GameEvent::RunePickup(e) => on_rune_pickup(state, host, e),
        GameEvent::PlayerGainedLevel(e) => on_level(state, e),
        GameEvent::CombatLog(e) => on_combat_log(state, host, e),
        GameEvent::StateChange(e) => on_state_change(state, host, e),
        GameEvent::NpcSpawned(_) => Ok(()),
    }
}

/// Completion threshold of a registered challenge.
fn threshold(state: &MatchState, id: ChallengeId) -> Result<f64, StoreError> {
    state.registry.max_progress(id).ok_or(StoreError::NotFound(id))
}

fn team_or_skip(host: &dyn Host, player: PlayerId) -> Option<Team> {
    let team = host.team_of(player);
    if team.is_none() {
        debug!("{} has no team, skipping", player);
    }
    team
}

// =============================================================================
// ITEMS
// =============================================================================

fn on_item_purchased(state: &mut MatchState, host: &mut dyn Host, e: &ItemPurchased) -> Result<(), StoreError> {
    let Some(team) = team_or_skip(host, e.player_id) else {
        return Ok(());
    };
    state.stats.ensure_player(e.player_id);

    match e.item_name.as_str() {
        ITEM_DUST => {
            let total = f64::from(state.stats.record_dust(e.player_id, team));
            state.store.raise_progress(ChallengeId::Dust200, total)?;
            if total >= threshold(state, ChallengeId::Dust200)? {
                complete_challenge(state, host, ChallengeId::Dust200, team, "Buy 200 Dust of Appearance")?;
            }
        }
        ITEM_ULTIMATE_ORB => {
            complete_challenge(state, host, ChallengeId::UltimateOrb, team, "Purchase an Ultimate Orb")?;
        }
        _ => {}
    }

    if state.config.victory_item.as_deref() == Some(e.item_name.as_str()) {
        info!("{} bought the victory item, {} wins", e.player_id, team);
        host.announce(VICTORY_ANNOUNCEMENT);
        host.declare_winner(team);
    }

    Ok(())
}

fn on_item_combined(state: &mut MatchState, host: &mut dyn Host, e: &ItemCombined) -> Result<(), StoreError> {
    if e.item_name != ITEM_LOTUS_ORB {
        return Ok(());
    }
    let Some(team) = team_or_skip(host, e.player_id) else {
        return Ok(());
    };
    complete_challenge(state, host, ChallengeId::LotusCombo, team, "Combine a Lotus Orb")?;
    Ok(())
}

fn on_item_used(state: &mut MatchState, host: &mut dyn Host, e: &ItemUsed) -> Result<(), StoreError> {
    let Some(team) = team_or_skip(host, e.player_id) else {
        return Ok(());
    };

    match e.item_name.as_str() {
        ITEM_VEIL => {
            complete_challenge(state, host, ChallengeId::UseVeil, team, "Use Veil of Discord")?;
        }
        ITEM_MAGIC_WAND => {
            let charges = e.charges.unwrap_or(0);
            if charges >= state.config.wand_charges {
                complete_challenge(state, host, ChallengeId::WandCharges20, team, "Use Magic Wand with 20 charges")?;
            }
        }
        _ => {}
    }
    Ok(())
}

// =============================================================================
// COMBAT
// =============================================================================

fn on_player_killed(state: &mut MatchState, host: &mut dyn Host, e: &PlayerKilled) -> Result<(), StoreError> {
    let now = host.game_time();
    let window = state.config.double_kill_window;
    let needed = state.config.double_kill_count;

    state.stats.ensure_player(e.player_id);

    // Every tracked player's window is checked and restarted on any kill.
    let mut earned = Vec::new();
    for player in host.player_slots() {
        let Some(stats) = state.stats.player_mut(player) else {
            continue;
        };
        if now - stats.last_kill_time < window {
            stats.kills += 1;
            if stats.kills >= needed {
                earned.push(player);
            }
        }
        stats.last_kill_time = now;
    }

    for player in earned {
        if let Some(team) = host.team_of(player) {
            complete_challenge(state, host, ChallengeId::DoubleKill, team, "Get a double kill")?;
        }
    }
    Ok(())
}

fn on_ability_used(state: &mut MatchState, host: &mut dyn Host, e: &AbilityUsed) -> Result<(), StoreError> {
    state.stats.ensure_player(e.player_id);

    let stun = state.classifier.stun_duration(&e.ability_name);
    if stun > 0.0 {
        state.stats.record_stun(e.player_id, stun);
    }

    if state.classifier.is_ultimate(&e.ability_name) {
        if let Some(team) = team_or_skip(host, e.player_id) {
            complete_challenge(state, host, ChallengeId::CastUltFirst, team, "Be first to cast an ultimate")?;
        }
    }
    Ok(())
}

fn on_channel_finished(
    state: &mut MatchState,
    host: &mut dyn Host,
    e: &AbilityChannelFinished,
) -> Result<(), StoreError> {
    if !e.interrupted {
        return Ok(());
    }
    let Some(player) = host.resolve_real_hero(e.caster) else {
        debug!("Channel caster {:?} is not a real hero", e.caster);
        return Ok(());
    };
    let Some(team) = team_or_skip(host, player) else {
        return Ok(());
    };
    complete_challenge(state, host, ChallengeId::CancelChannel, team, "Cancel a channeling ability")?;
    Ok(())
}

fn on_last_hit(state: &mut MatchState, host: &mut dyn Host, e: &LastHit) -> Result<(), StoreError> {
    if e.hero_kill {
        return Ok(());
    }

    let (id, count, message) = if e.deny {
        (ChallengeId::Denies20, state.stats.record_deny(e.player_id), "Get 20 denies")
    } else {
        (ChallengeId::LastHits150, state.stats.record_last_hit(e.player_id), "Get 150 last hits")
    };

    let count = f64::from(count);
    state.store.raise_progress(id, count)?;

    if count >= threshold(state, id)? {
        if let Some(team) = team_or_skip(host, e.player_id) {
            complete_challenge(state, host, id, team, message)?;
        }
    }
    Ok(())
}

fn on_combat_log(state: &mut MatchState, host: &mut dyn Host, e: &CombatLog) -> Result<(), StoreError> {
    let Some(player) = e.attacker_player else {
        return Ok(());
    };

    if e.is_hero_damage() {
        state.stats.record_hero_damage(player, e.value);
    } else if e.is_heal() {
        let healed = state.stats.record_healing(player, e.value);
        state.store.raise_progress(ChallengeId::Heal1000, healed)?;
        if healed >= threshold(state, ChallengeId::Heal1000)? {
            if let Some(team) = team_or_skip(host, player) {
                complete_challenge(state, host, ChallengeId::Heal1000, team, "Heal 1000 HP")?;
            }
        }
    }
    Ok(())
}

// =============================================================================
// OBJECTIVES
// =============================================================================

fn on_tower_kill(state: &mut MatchState, host: &mut dyn Host, e: &TowerKill) -> Result<(), StoreError> {
    let Some(player) = host.resolve_real_hero(e.killer) else {
        debug!("Tower killer {:?} is not a real hero", e.killer);
        return Ok(());
    };
    let Some(team) = team_or_skip(host, player) else {
        return Ok(());
    };
    complete_challenge(state, host, ChallengeId::KillTower, team, "Kill a tower")?;
    Ok(())
}

fn on_team_objective(
    state: &mut MatchState,
    host: &mut dyn Host,
    team_number: i32,
    id: ChallengeId,
    message: &str,
) -> Result<(), StoreError> {
    let Some(team) = Team::from_wire(team_number) else {
        debug!("{} credited to non-playing team {}", id, team_number);
        return Ok(());
    };
    complete_challenge(state, host, id, team, message)?;
    Ok(())
}

fn on_tree_cut(state: &mut MatchState, host: &mut dyn Host) -> Result<(), StoreError> {
    let most = f64::from(state.stats.record_tree_for_all_teams());
    state.store.raise_progress(ChallengeId::Trees100, most)?;

    let needed = threshold(state, ChallengeId::Trees100)?;
    for team in Team::ALL {
        if f64::from(state.stats.team(team).trees_cut) >= needed {
            complete_challenge(state, host, ChallengeId::Trees100, team, "Destroy 100 trees")?;
        }
    }
    Ok(())
}

fn on_ward_killed(state: &mut MatchState, host: &mut dyn Host, e: &WardKilled) -> Result<(), StoreError> {
    let Some(player) = host.resolve_real_hero(e.killer) else {
        debug!("Ward killer {:?} is not a real hero", e.killer);
        return Ok(());
    };
    let Some(team) = team_or_skip(host, player) else {
        return Ok(());
    };
    complete_challenge(state, host, ChallengeId::Deward, team, "Kill an enemy ward")?;
    Ok(())
}

fn on_rune_pickup(state: &mut MatchState, host: &mut dyn Host, e: &RunePickup) -> Result<(), StoreError> {
    if e.rune_type() != Some(RuneType::Arcane) {
        return Ok(());
    }
    let Some(player) = host.resolve_real_hero(e.picker) else {
        return Ok(());
    };
    let Some(hero) = host.hero_status(player) else {
        return Ok(());
    };
    if !hero.holds_item(ITEM_BOTTLE, state.config.inventory_slots) {
        return Ok(());
    }
    let Some(team) = team_or_skip(host, player) else {
        return Ok(());
    };
    complete_challenge(state, host, ChallengeId::BottleArcane, team, "Bottle an Arcane rune")?;
    Ok(())
}

fn on_level(state: &mut MatchState, e: &PlayerGainedLevel) -> Result<(), StoreError> {
    state.stats.record_level(e.player_id, e.level);
    state
        .store
        .raise_progress(ChallengeId::HighestLevel, f64::from(state.stats.max_level()))?;
    Ok(())
}

// =============================================================================
// GAME STATE
// =============================================================================

fn on_state_change(state: &mut MatchState, host: &mut dyn Host, e: &StateChange) -> Result<(), StoreError> {
    match e.state {
        GameRulesState::PreGame => {
            state.schedule_start(host.game_time());
            Ok(())
        }
        GameRulesState::PostGame => award_final_standings(state, host),
        _ => Ok(()),
    }
}

/// Player leading on `score`, ties going to the lowest player id.
fn leader<F>(candidates: &[(PlayerId, Team, PlayerStats)], score: F) -> Option<(PlayerId, Team, f64)>
where
    F: Fn(&PlayerStats) -> f64,
{
    let mut best: Option<(PlayerId, Team, f64)> = None;
    for (player, team, stats) in candidates {
        let value = score(stats);
        match best {
            Some((_, _, current)) if value <= current => {}
            _ => best = Some((*player, *team, value)),
        }
    }
    best
}

/// Hand out the challenges decided by end-of-match standings.
fn award_final_standings(state: &mut MatchState, host: &mut dyn Host) -> Result<(), StoreError> {
    if state.phase == MatchPhase::PostGame {
        return Ok(());
    }
    state.phase = MatchPhase::PostGame;

    let candidates: Vec<(PlayerId, Team, PlayerStats)> = state
        .stats
        .players()
        .filter_map(|(player, stats)| host.team_of(player).map(|team| (player, team, stats.clone())))
        .collect();

    if candidates.is_empty() {
        debug!("No players with a team at post-game, no standings");
        return Ok(());
    }

    if let Some((player, team, level)) = leader(&candidates, |s| f64::from(s.level)) {
        debug!("Highest level: {} at {}", player, level);
        complete_challenge(state, host, ChallengeId::HighestLevel, team, "Have the highest ending level")?;
    }

    if let Some((player, team, stun)) = leader(&candidates, |s| s.stun_duration) {
        if stun > 0.0 {
            debug!("Most stun: {} with {:.1}s", player, stun);
            complete_challenge(state, host, ChallengeId::MostStunDuration, team, "Deal the most stun duration")?;
        }
    }

    // Lowest damage is the leader on negated damage.
    if let Some((player, team, damage)) = leader(&candidates, |s| -s.hero_damage) {
        debug!("Lowest hero damage: {} with {:.0}", player, -damage);
        complete_challenge(state, host, ChallengeId::LowestHeroDamage, team, "Deal the lowest hero damage")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::EntityIndex;
    use crate::game::host::{HeroStatus, LocalHost};
    use crate::game::state::MatchConfig;
    use crate::network::protocol::ServerMessage;

    fn setup() -> (MatchState, LocalHost) {
        (MatchState::new(MatchConfig::default()), LocalHost::standard())
    }

    fn purchase(player: u32, item: &str) -> GameEvent {
        GameEvent::ItemPurchased(ItemPurchased {
            player_id: PlayerId::new(player),
            item_name: item.to_string(),
            item_cost: 0,
        })
    }

    fn last_hit(player: u32, deny: bool) -> GameEvent {
        GameEvent::LastHit(LastHit {
            player_id: PlayerId::new(player),
            entity_killed: EntityIndex(900),
            first_blood: false,
            hero_kill: false,
            tower_kill: false,
            deny,
        })
    }

    fn kill(victim: u32) -> GameEvent {
        GameEvent::PlayerKilled(PlayerKilled {
            player_id: PlayerId::new(victim),
            hero_kill: true,
            tower_kill: false,
        })
    }

    fn progress(state: &MatchState, id: ChallengeId) -> f64 {
        state.store().get(id).unwrap().progress
    }

    #[test]
    fn test_dust_completes_on_200th_purchase() {
        let (mut state, mut host) = setup();
        let mut rx = state.hub_mut().connect(PlayerId::new(9));

        for _ in 0..199 {
            dispatch(&mut state, &mut host, &purchase(1, ITEM_DUST)).unwrap();
        }
        assert!(!state.store().is_completed(ChallengeId::Dust200));
        assert_eq!(progress(&state, ChallengeId::Dust200), 199.0);

        dispatch(&mut state, &mut host, &purchase(1, ITEM_DUST)).unwrap();
        let dust = state.store().get(ChallengeId::Dust200).unwrap();
        assert!(dust.completed);
        assert_eq!(dust.completed_by, Some(Team::Radiant));
        assert_eq!(dust.progress, 200.0);

        let completions = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|m| matches!(m, ServerMessage::ChallengeCompleted(_)))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_dust_counts_per_team() {
        let (mut state, mut host) = setup();
        for _ in 0..120 {
            dispatch(&mut state, &mut host, &purchase(0, ITEM_DUST)).unwrap();
            dispatch(&mut state, &mut host, &purchase(7, ITEM_DUST)).unwrap();
        }
        // Neither team alone has reached the threshold.
        assert!(!state.store().is_completed(ChallengeId::Dust200));
        assert_eq!(progress(&state, ChallengeId::Dust200), 120.0);
    }

    #[test]
    fn test_dust_completion_uses_buyer_team_count() {
        let (mut state, mut host) = setup();
        for _ in 0..199 {
            dispatch(&mut state, &mut host, &purchase(7, ITEM_DUST)).unwrap();
        }
        // Radiant's first purchase leaves the shared bar at Dire's count.
        dispatch(&mut state, &mut host, &purchase(0, ITEM_DUST)).unwrap();
        assert_eq!(progress(&state, ChallengeId::Dust200), 199.0);
        assert!(!state.store().is_completed(ChallengeId::Dust200));

        dispatch(&mut state, &mut host, &purchase(7, ITEM_DUST)).unwrap();
        let dust = state.store().get(ChallengeId::Dust200).unwrap();
        assert_eq!(dust.completed_by, Some(Team::Dire));
    }

    #[test]
    fn test_victory_item_declares_winner() {
        let (mut state, mut host) = setup();
        dispatch(&mut state, &mut host, &purchase(8, "item_fluffy_hat")).unwrap();
        assert_eq!(host.winner, Some(Team::Dire));
        assert_eq!(host.announcements, vec![VICTORY_ANNOUNCEMENT.to_string()]);

        let mut state = MatchState::new(MatchConfig { victory_item: None, ..MatchConfig::default() });
        let mut host = LocalHost::standard();
        dispatch(&mut state, &mut host, &purchase(8, "item_fluffy_hat")).unwrap();
        assert_eq!(host.winner, None);
    }

    #[test]
    fn test_last_hits_complete_at_150() {
        let (mut state, mut host) = setup();
        for _ in 0..100 {
            dispatch(&mut state, &mut host, &last_hit(6, false)).unwrap();
        }
        for _ in 0..149 {
            dispatch(&mut state, &mut host, &last_hit(2, false)).unwrap();
        }
        assert_eq!(progress(&state, ChallengeId::LastHits150), 149.0);
        assert!(!state.store().is_completed(ChallengeId::LastHits150));

        dispatch(&mut state, &mut host, &last_hit(2, false)).unwrap();
        let hits = state.store().get(ChallengeId::LastHits150).unwrap();
        assert!(hits.completed);
        assert_eq!(hits.completed_by, Some(Team::Radiant));
        assert_eq!(hits.progress, 150.0);
    }

    #[test]
    fn test_hero_kills_and_denies_split() {
        let (mut state, mut host) = setup();
        let hero_kill = GameEvent::LastHit(LastHit {
            player_id: PlayerId::new(3),
            entity_killed: EntityIndex(105),
            first_blood: true,
            hero_kill: true,
            tower_kill: false,
            deny: false,
        });
        dispatch(&mut state, &mut host, &hero_kill).unwrap();
        assert_eq!(progress(&state, ChallengeId::LastHits150), 0.0);

        for _ in 0..20 {
            dispatch(&mut state, &mut host, &last_hit(3, true)).unwrap();
        }
        assert!(state.store().is_completed(ChallengeId::Denies20));
        assert_eq!(state.stats().player(PlayerId::new(3)).unwrap().last_hits, 0);
    }

    #[test]
    fn test_interrupted_channel_completes_once() {
        let (mut state, mut host) = setup();
        let channel = |player: u32| {
            GameEvent::AbilityChannelFinished(AbilityChannelFinished {
                caster: LocalHost::hero_entity(PlayerId::new(player)),
                ability_name: "crystal_maiden_freezing_field".to_string(),
                interrupted: true,
            })
        };

        dispatch(&mut state, &mut host, &channel(5)).unwrap();
        dispatch(&mut state, &mut host, &channel(6)).unwrap();

        let cancel = state.store().get(ChallengeId::CancelChannel).unwrap();
        assert_eq!(cancel.completed_by, Some(Team::Dire));
        assert_eq!(host.announcements.len(), 1);
    }

    #[test]
    fn test_channel_from_illusion_ignored() {
        let (mut state, mut host) = setup();
        let event = GameEvent::AbilityChannelFinished(AbilityChannelFinished {
            caster: EntityIndex(4242),
            ability_name: String::new(),
            interrupted: true,
        });
        dispatch(&mut state, &mut host, &event).unwrap();
        assert!(!state.store().is_completed(ChallengeId::CancelChannel));
    }

    #[test]
    fn test_double_kill_window() {
        let (mut state, mut host) = setup();
        for slot in 0..10 {
            state.stats.ensure_player(PlayerId::new(slot));
        }

        host.time = 100.0;
        dispatch(&mut state, &mut host, &kill(5)).unwrap();
        assert!(!state.store().is_completed(ChallengeId::DoubleKill));

        host.time = 130.0;
        dispatch(&mut state, &mut host, &kill(6)).unwrap();
        assert!(!state.store().is_completed(ChallengeId::DoubleKill));

        host.time = 140.0;
        dispatch(&mut state, &mut host, &kill(7)).unwrap();
        assert!(!state.store().is_completed(ChallengeId::DoubleKill));
        assert_eq!(state.stats().player(PlayerId::new(0)).unwrap().kills, 1);

        host.time = 150.0;
        dispatch(&mut state, &mut host, &kill(8)).unwrap();
        let double = state.store().get(ChallengeId::DoubleKill).unwrap();
        assert!(double.completed);
        // Slot order decides the credited side.
        assert_eq!(double.completed_by, Some(Team::Radiant));
    }

    #[test]
    fn test_ultimate_and_stuns() {
        let (mut state, mut host) = setup();
        let cast = |player: u32, name: &str| {
            GameEvent::AbilityUsed(AbilityUsed {
                player_id: PlayerId::new(player),
                ability_name: name.to_string(),
                caster: None,
            })
        };

        dispatch(&mut state, &mut host, &cast(1, "storm_bolt")).unwrap();
        dispatch(&mut state, &mut host, &cast(1, "storm_bolt")).unwrap();
        assert!(!state.store().is_completed(ChallengeId::CastUltFirst));
        assert!(state.stats().player(PlayerId::new(1)).unwrap().stun_duration > 0.0);

        dispatch(&mut state, &mut host, &cast(8, "invoker_invoke")).unwrap();
        let ult = state.store().get(ChallengeId::CastUltFirst).unwrap();
        assert_eq!(ult.completed_by, Some(Team::Dire));
    }

    #[test]
    fn test_trees_count_for_both_sides_radiant_first() {
        let (mut state, mut host) = setup();
        for _ in 0..100 {
            dispatch(&mut state, &mut host, &GameEvent::TreeCut(TreeCut::default())).unwrap();
        }
        let trees = state.store().get(ChallengeId::Trees100).unwrap();
        assert_eq!(trees.completed_by, Some(Team::Radiant));
        assert_eq!(trees.progress, 100.0);
        assert_eq!(host.announcements.len(), 1);
    }

    #[test]
    fn test_objectives_by_team_number() {
        let (mut state, mut host) = setup();
        dispatch(&mut state, &mut host, &GameEvent::RoshanKill(RoshanKill { team_number: 3, gold: 200 })).unwrap();
        dispatch(&mut state, &mut host, &GameEvent::MinibossKill(MinibossKill { team_number: 1 })).unwrap();

        assert_eq!(
            state.store().get(ChallengeId::RoshanKill).unwrap().completed_by,
            Some(Team::Dire)
        );
        assert!(!state.store().is_completed(ChallengeId::TormentorKill));
    }

    #[test]
    fn test_tower_and_ward_need_real_heroes() {
        let (mut state, mut host) = setup();
        let creep_tower = GameEvent::TowerKill(TowerKill { killer: EntityIndex(7), gold: 0, team_number: 2 });
        dispatch(&mut state, &mut host, &creep_tower).unwrap();
        assert!(!state.store().is_completed(ChallengeId::KillTower));

        let hero_tower = GameEvent::TowerKill(TowerKill {
            killer: LocalHost::hero_entity(PlayerId::new(4)),
            gold: 0,
            team_number: 3,
        });
        dispatch(&mut state, &mut host, &hero_tower).unwrap();
        assert_eq!(state.store().get(ChallengeId::KillTower).unwrap().completed_by, Some(Team::Radiant));

        let ward = GameEvent::WardKilled(WardKilled {
            killer: LocalHost::hero_entity(PlayerId::new(9)),
            team: 2,
            ward_type: 0,
        });
        dispatch(&mut state, &mut host, &ward).unwrap();
        assert_eq!(state.store().get(ChallengeId::Deward).unwrap().completed_by, Some(Team::Dire));
    }

    #[test]
    fn test_arcane_rune_needs_bottle() {
        let (mut state, mut host) = setup();
        let pickup = |rune| {
            GameEvent::RunePickup(RunePickup { picker: LocalHost::hero_entity(PlayerId::new(0)), rune })
        };
        host.heroes.insert(
            PlayerId::new(0),
            HeroStatus { alive: true, inventory: vec![Some(ITEM_BOTTLE.to_string())], ..Default::default() },
        );

        dispatch(&mut state, &mut host, &pickup(5)).unwrap();
        assert!(!state.store().is_completed(ChallengeId::BottleArcane));

        dispatch(&mut state, &mut host, &pickup(6)).unwrap();
        assert!(state.store().is_completed(ChallengeId::BottleArcane));
    }

    #[test]
    fn test_wand_charges_and_veil() {
        let (mut state, mut host) = setup();
        let used = |item: &str, charges| {
            GameEvent::ItemUsed(ItemUsed { player_id: PlayerId::new(6), item_name: item.to_string(), charges })
        };

        dispatch(&mut state, &mut host, &used(ITEM_MAGIC_WAND, Some(19))).unwrap();
        dispatch(&mut state, &mut host, &used(ITEM_MAGIC_WAND, None)).unwrap();
        assert!(!state.store().is_completed(ChallengeId::WandCharges20));

        dispatch(&mut state, &mut host, &used(ITEM_MAGIC_WAND, Some(20))).unwrap();
        dispatch(&mut state, &mut host, &used(ITEM_VEIL, None)).unwrap();
        assert!(state.store().is_completed(ChallengeId::WandCharges20));
        assert!(state.store().is_completed(ChallengeId::UseVeil));
    }

    #[test]
    fn test_heal_progress_and_completion() {
        let (mut state, mut host) = setup();
        let heal = |player: u32, value: f64| {
            GameEvent::CombatLog(CombatLog {
                entry_type: CombatLog::HEAL,
                value,
                attacker_hero: true,
                target_hero: true,
                attacker_player: Some(PlayerId::new(player)),
            })
        };

        dispatch(&mut state, &mut host, &heal(2, 600.0)).unwrap();
        dispatch(&mut state, &mut host, &heal(7, 300.0)).unwrap();
        assert_eq!(progress(&state, ChallengeId::Heal1000), 600.0);

        dispatch(&mut state, &mut host, &heal(2, 400.0)).unwrap();
        assert_eq!(state.store().get(ChallengeId::Heal1000).unwrap().completed_by, Some(Team::Radiant));
    }

    #[test]
    fn test_final_standings() {
        let (mut state, mut host) = setup();
        for slot in 0..10 {
            state.stats.ensure_player(PlayerId::new(slot));
            state.stats.record_hero_damage(PlayerId::new(slot), 1000.0);
        }
        dispatch(&mut state, &mut host, &GameEvent::PlayerGainedLevel(PlayerGainedLevel { player_id: PlayerId::new(7), level: 25 })).unwrap();
        state.stats.record_stun(PlayerId::new(3), 4.5);
        // Player 4 and 9 tie for lowest damage; the lower id wins.
        state.stats.player_mut(PlayerId::new(4)).unwrap().hero_damage = 10.0;
        state.stats.player_mut(PlayerId::new(9)).unwrap().hero_damage = 10.0;

        let post = GameEvent::StateChange(StateChange { state: GameRulesState::PostGame });
        dispatch(&mut state, &mut host, &post).unwrap();
        dispatch(&mut state, &mut host, &post).unwrap();

        let by = |id| state.store().get(id).unwrap().completed_by;
        assert_eq!(by(ChallengeId::HighestLevel), Some(Team::Dire));
        assert_eq!(by(ChallengeId::MostStunDuration), Some(Team::Radiant));
        assert_eq!(by(ChallengeId::LowestHeroDamage), Some(Team::Radiant));
        assert_eq!(progress(&state, ChallengeId::HighestLevel), 25.0);
        assert_eq!(state.phase, MatchPhase::PostGame);
        assert_eq!(host.announcements.len(), 3);
    }

    #[test]
    fn test_pregame_schedules_start() {
        let (mut state, mut host) = setup();
        host.time = 30.0;
        let pre = GameEvent::StateChange(StateChange { state: GameRulesState::PreGame });
        dispatch(&mut state, &mut host, &pre).unwrap();
        dispatch(&mut state, &mut host, &pre).unwrap();
        assert_eq!(state.phase, MatchPhase::PreGame);

        host.time = 30.1;
        state.advance_time(&mut host);
        assert_eq!(state.phase, MatchPhase::PreGame);

        host.time = 30.25;
        state.advance_time(&mut host);
        assert_eq!(state.phase, MatchPhase::Playing);
        assert!(state.is_tracking(PlayerId::new(9)));
        assert!(state.sampler_handle().is_some());
        assert_eq!(state.timers.len(), 1);
    }

    #[test]
    fn test_unregistered_challenge_surfaces_error() {
        use crate::core::classify::NameHeuristics;
        use crate::game::registry::{ChallengeDefinition, ChallengeRegistry};

        let registry = ChallengeRegistry::new(vec![ChallengeDefinition::new(ChallengeId::Deward, "Dewarder", "", 1.0)]);
        let mut state = MatchState::with_parts(MatchConfig::default(), registry, Box::new(NameHeuristics::default()));
        let mut host = LocalHost::standard();

        let result = dispatch(&mut state, &mut host, &last_hit(0, false));
        assert_eq!(result, Err(StoreError::NotFound(ChallengeId::LastHits150)));
        // Accumulators were updated before the failing commit.
        assert_eq!(state.stats().player(PlayerId::new(0)).unwrap().last_hits, 1);
    }
}
