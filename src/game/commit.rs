//! Completion Commit & Broadcast
//!
//! The single path by which a challenge becomes completed. Side effects
//! (announcement, notification, snapshot broadcast) fire only when the store
//! accepts the completion, so each challenge produces them at most once.

use tracing::{debug, info};

use crate::core::ids::{PlayerId, Team};
use crate::game::host::Host;
use crate::game::registry::ChallengeId;
use crate::game::state::MatchState;
use crate::game::store::StoreError;
use crate::network::hub::HubError;
use crate::network::protocol::{ChallengeCompleted, ServerMessage};

/// Complete `id` for `team` with an announcement `message`.
///
/// Returns `Ok(true)` if this call completed it, `Ok(false)` if it already
/// was.
pub fn complete_challenge(
    state: &mut MatchState,
    host: &mut dyn Host,
    id: ChallengeId,
    team: Team,
    message: &str,
) -> Result<bool, StoreError> {
    let now = host.game_time();
    if !state.store.try_set_completed(id, team, now)? {
        debug!("{} already completed, ignoring {} claim", id, team);
        return Ok(false);
    }

    let name = state
        .registry
        .get(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| id.key().to_string());

    info!("Challenge {} completed by {} at {:.1}", id, team, now);
    host.announce(&format!("{} completed: {}", team.name(), message));

    state
        .hub
        .broadcast(ServerMessage::ChallengeCompleted(ChallengeCompleted::new(id, name, team)));
    broadcast_progress(state);

    Ok(true)
}

/// Send the full snapshot to every client. Returns how many accepted it.
pub fn broadcast_progress(state: &mut MatchState) -> usize {
    let challenges = state.snapshot();
    state.hub.broadcast(ServerMessage::ChallengeProgressUpdate { challenges })
}

/// Send the full snapshot to one client.
pub fn send_progress_to(state: &mut MatchState, player: PlayerId) -> Result<(), HubError> {
    let challenges = state.snapshot();
    state
        .hub
        .send_to(player, ServerMessage::ChallengeProgressUpdate { challenges })
}
