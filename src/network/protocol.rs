//! Protocol Messages
//!
//! Display-client messages. Everything is JSON; messages handed to the
//! engine's client transport go through [`crate::network::wire`] first.

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::core::ids::{PlayerId, Team};
use crate::game::registry::ChallengeId;
use crate::game::snapshot::Snapshot;
use crate::network::wire::to_networked;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from a display client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask for the full challenge table. The engine stamps the sender.
    ChallengeProgressRequest {
        /// Requesting player
        #[serde(rename = "PlayerID")]
        player_id: PlayerId,
    },
}

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent to display clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full challenge table, to one client or all.
    ChallengeProgressUpdate {
        /// Every registered challenge
        challenges: Snapshot,
    },

    /// A challenge was just completed. Sent once per challenge.
    ChallengeCompleted(ChallengeCompleted),
}

/// Completion notification payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeCompleted {
    /// Challenge key
    pub challenge_key: ChallengeId,
    /// Display name of the challenge
    pub challenge_name: String,
    /// Team number of the completing side
    pub team: i32,
    /// Display name of the completing side
    pub team_name: String,
}

impl ChallengeCompleted {
    /// Notification for `id` completed by `team`.
    pub fn new(id: ChallengeId, name: impl Into<String>, team: Team) -> Self {
        Self {
            challenge_key: id,
            challenge_name: name.into(),
            team: team.wire_value(),
            team_name: team.name().to_string(),
        }
    }
}

impl ServerMessage {
    /// Custom event name used on the engine's client transport.
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::ChallengeProgressUpdate { .. } => "challenge_progress_update",
            ServerMessage::ChallengeCompleted(_) => "challenge_completed",
        }
    }

    /// Message body without the type tag.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            ServerMessage::ChallengeProgressUpdate { challenges } => {
                Ok(serde_json::json!({ "challenges": serde_json::to_value(challenges)? }))
            }
            ServerMessage::ChallengeCompleted(info) => serde_json::to_value(info),
        }
    }

    /// Body as the engine transmits it (booleans as 0/1, arrays as maps).
    pub fn networked_payload(&self) -> Result<Value, serde_json::Error> {
        Ok(to_networked(&self.payload()?))
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::registry::ChallengeRegistry;
    use crate::game::snapshot::build_snapshot;
    use crate::game::store::ChallengeStore;

    #[test]
    fn test_client_request_from_engine_json() {
        let msg = ClientMessage::from_json(r#"{"type":"challenge_progress_request","PlayerID":4}"#).unwrap();
        assert_eq!(msg, ClientMessage::ChallengeProgressRequest { player_id: PlayerId::new(4) });
    }

    #[test]
    fn test_completed_message_shape() {
        let msg = ServerMessage::ChallengeCompleted(ChallengeCompleted::new(
            ChallengeId::Dust200,
            "Dust Collector",
            Team::Radiant,
        ));
        assert_eq!(msg.name(), "challenge_completed");

        let payload = msg.payload().unwrap();
        assert_eq!(payload["challengeKey"], "dust200");
        assert_eq!(payload["team"], 2);
        assert_eq!(payload["teamName"], "Radiant");

        let parsed = ServerMessage::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_progress_update_networked_flags() {
        let registry = ChallengeRegistry::standard();
        let mut store = ChallengeStore::new(&registry);
        store.try_set_completed(ChallengeId::Deward, Team::Dire, 42.0).unwrap();

        let msg = ServerMessage::ChallengeProgressUpdate {
            challenges: build_snapshot(&registry, &store),
        };
        let wire = msg.networked_payload().unwrap();

        assert_eq!(wire["challenges"]["deward"]["completed"], 1);
        assert_eq!(wire["challenges"]["deward"]["completedBy"], 3);
        assert_eq!(wire["challenges"]["dust200"]["completed"], 0);

        let parsed = ServerMessage::from_json(&msg.to_json().unwrap()).unwrap();
        assert_eq!(parsed, msg);
    }
}
