//! Property tests over random event streams.

use std::collections::BTreeMap;
use proptest::prelude::*;

use crate::core::ids::{EntityIndex, PlayerId};
use crate::game::events::*;
use crate::game::host::LocalHost;
use crate::game::registry::ChallengeId;
use crate::game::state::{MatchConfig, MatchState};
use crate::game::store::ChallengeState;
use crate::network::protocol::ServerMessage;

fn event_strategy() -> impl Strategy<Value = GameEvent> {
    let player = (0u32..10).prop_map(PlayerId::new);
    prop_oneof![
        player.clone().prop_map(|p| GameEvent::ItemPurchased(ItemPurchased {
            player_id: p,
            item_name: "item_dust".to_string(),
            item_cost: 80,
        })),
        (player.clone(), any::<bool>()).prop_map(|(p, deny)| GameEvent::LastHit(LastHit {
            player_id: p,
            entity_killed: EntityIndex(900),
            first_blood: false,
            hero_kill: false,
            tower_kill: false,
            deny,
        })),
        Just(GameEvent::TreeCut(TreeCut::default())),
        (player.clone(), 0.0f64..400.0).prop_map(|(p, value)| GameEvent::CombatLog(CombatLog {
            entry_type: CombatLog::HEAL,
            value,
            attacker_hero: true,
            target_hero: false,
            attacker_player: Some(p),
        })),
        (player.clone(), 1u32..30).prop_map(|(p, level)| GameEvent::PlayerGainedLevel(PlayerGainedLevel {
            player_id: p,
            level,
        })),
        (2i32..4).prop_map(|team| GameEvent::RoshanKill(RoshanKill { team_number: team, gold: 0 })),
        player.prop_map(|p| GameEvent::AbilityChannelFinished(AbilityChannelFinished {
            caster: LocalHost::hero_entity(p),
            ability_name: String::new(),
            interrupted: true,
        })),
    ]
}

fn states(state: &MatchState) -> BTreeMap<ChallengeId, ChallengeState> {
    state.store().iter().map(|(id, s)| (id, s.clone())).collect()
}

proptest! {
    #[test]
    fn progress_monotonic_and_completion_final(events in prop::collection::vec(event_strategy(), 1..400)) {
        let mut state = MatchState::new(MatchConfig::default());
        let mut host = LocalHost::standard();
        let mut rx = state.hub_mut().connect(PlayerId::new(0));
        let mut notified: BTreeMap<ChallengeId, u32> = BTreeMap::new();

        let mut before = states(&state);
        for (i, event) in events.iter().enumerate() {
            host.time = i as f64;
            state.handle_event(&mut host, event);

            while let Ok(message) = rx.try_recv() {
                if let ServerMessage::ChallengeCompleted(info) = message {
                    *notified.entry(info.challenge_key).or_default() += 1;
                }
            }

            let after = states(&state);
            for (id, old) in &before {
                let new = &after[id];
                prop_assert!(new.progress >= old.progress, "{} progress went down", id);
                if old.completed {
                    prop_assert!(new.completed);
                    prop_assert_eq!(new.completed_by, old.completed_by);
                    prop_assert_eq!(new.completed_at, old.completed_at);
                }
            }
            before = after;
        }

        for (id, count) in notified {
            prop_assert_eq!(count, 1, "{} notified more than once", id);
            prop_assert!(state.store().is_completed(id));
        }
    }
}
