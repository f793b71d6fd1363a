//! Periodic Sampler
//!
//! Some challenges depend on hero state the engine never raises events for
//! (armor, attack rate). A repeating game-time timer polls every living hero.

use tracing::trace;

use crate::core::ids::GameTime;
use crate::core::timers::TimerHandle;
use crate::game::commit::complete_challenge;
use crate::game::host::Host;
use crate::game::registry::ChallengeId;
use crate::game::state::{MatchState, MatchTask};
use crate::game::store::StoreError;

/// Arm the repeating sampler. First pass runs one interval after `now`.
pub fn start_sampler(state: &mut MatchState, now: GameTime) -> TimerHandle {
    let interval = state.config.sample_interval;
    state.timers.every(now, interval, MatchTask::PeriodicSample)
}

/// One pass over every living hero.
pub fn sample(state: &mut MatchState, host: &mut dyn Host) -> Result<(), StoreError> {
    let armor_threshold = state.config.armor_threshold;
    let rate_threshold = state.config.attack_rate_threshold;

    for player in host.player_slots() {
        let Some(hero) = host.hero_status(player) else {
            continue;
        };
        if !hero.alive {
            continue;
        }
        let Some(team) = host.team_of(player) else {
            continue;
        };

        trace!(
            "{}: armor {:.1}, {:.2} attacks/s",
            player,
            hero.armor,
            hero.attacks_per_second
        );

        if hero.armor >= armor_threshold && !state.store.is_completed(ChallengeId::Armor30) {
            complete_challenge(state, host, ChallengeId::Armor30, team, "Reach at least 30 armor")?;
        }

        if hero.attacks_per_second >= rate_threshold
            && !state.store.is_completed(ChallengeId::MaxAttackSpeed)
        {
            complete_challenge(state, host, ChallengeId::MaxAttackSpeed, team, "Reach maximum attack speed")?;
        }
    }

    Ok(())
}
