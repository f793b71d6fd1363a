//! Challenge HUD Model
//!
//! Headless model of the display client's challenge panel. It consumes
//! messages in their networked shape (flags as 0/1) and produces the rows
//! the panel would draw.

use serde_json::Value;
use tracing::{debug, info};

use crate::core::ids::{PlayerId, Team};
use crate::game::registry::ChallengeId;
use crate::network::protocol::ClientMessage;
use crate::network::wire::read_flag;

/// HUD errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HudError {
    /// Message name the panel does not subscribe to.
    #[error("Unhandled message: {0}")]
    UnknownMessage(String),

    /// Payload is missing a field the panel needs.
    #[error("Malformed {message}: missing {field}")]
    Malformed {
        /// Message name
        message: String,
        /// Missing or mistyped field
        field: String,
    },
}

/// One drawn challenge row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeRow {
    /// Challenge key
    pub key: String,
    /// Display name
    pub name: String,
    /// Description line
    pub description: String,
    /// Current progress
    pub progress: f64,
    /// Completion threshold
    pub max_progress: f64,
    /// Completed flag
    pub completed: bool,
    /// Raw `completedBy` team number
    pub completed_by: i32,
}

impl ChallengeRow {
    /// Status label: the completing side, `progress/max`, or `Pending`.
    pub fn status_text(&self) -> String {
        if self.completed {
            match Team::from_wire(self.completed_by) {
                Some(Team::Radiant) => "Radiant".to_string(),
                _ => "Dire".to_string(),
            }
        } else if self.max_progress > 1.0 {
            format!("{}/{}", self.progress, self.max_progress)
        } else {
            "Pending".to_string()
        }
    }

    /// Progress bar fill in percent. `None` when no bar is drawn.
    pub fn progress_percent(&self) -> Option<f64> {
        if self.completed || self.max_progress <= 1.0 {
            return None;
        }
        Some((self.progress / self.max_progress * 100.0).clamp(0.0, 100.0))
    }

    /// Style classes applied to the row.
    pub fn classes(&self) -> Vec<&'static str> {
        let mut classes = vec!["challenge-item"];
        if self.completed {
            classes.push("completed");
            match Team::from_wire(self.completed_by) {
                Some(Team::Radiant) => classes.push("radiant-completed"),
                Some(Team::Dire) => classes.push("dire-completed"),
                None => {}
            }
        }
        classes
    }
}

/// Challenge panel state.
#[derive(Debug, Clone, Default)]
pub struct ChallengeHud {
    rows: Vec<ChallengeRow>,
    notifications: Vec<String>,
    visible: bool,
}

impl ChallengeHud {
    /// Hidden panel with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the panel is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Toggle the panel. Opening it returns the refresh request to send.
    pub fn toggle(&mut self, player: PlayerId) -> Option<ClientMessage> {
        self.visible = !self.visible;
        self.visible
            .then_some(ClientMessage::ChallengeProgressRequest { player_id: player })
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[ChallengeRow] {
        &self.rows
    }

    /// Row for a challenge key.
    pub fn row(&self, key: &str) -> Option<&ChallengeRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Completion notifications received so far.
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    /// Apply a networked server message.
    pub fn apply(&mut self, name: &str, payload: &Value) -> Result<(), HudError> {
        match name {
            "challenge_progress_update" => {
                let challenges = payload
                    .get("challenges")
                    .and_then(Value::as_object)
                    .ok_or_else(|| malformed(name, "challenges"))?;

                let mut rows = challenges
                    .iter()
                    .map(|(key, entry)| parse_row(name, key, entry))
                    .collect::<Result<Vec<_>, _>>()?;
                // Networked maps lose ordering; restore registry order.
                rows.sort_by_key(|row| (display_rank(&row.key), row.key.clone()));

                debug!("Challenge list updated ({} rows)", rows.len());
                self.rows = rows;
                Ok(())
            }
            "challenge_completed" => {
                let field = |f: &str| {
                    payload
                        .get(f)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| malformed(name, f))
                };
                let challenge = field("challengeName")?;
                let team = field("teamName")?;

                info!("Challenge completed: {} by {}", challenge, team);
                self.notifications.push(format!("{} completed by {}", challenge, team));
                Ok(())
            }
            other => Err(HudError::UnknownMessage(other.to_string())),
        }
    }

    /// Plain-text rendering of the panel, one line per row.
    pub fn render(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| match row.progress_percent() {
                Some(pct) => format!("{} [{}] {:.0}%", row.name, row.status_text(), pct),
                None => format!("{} [{}]", row.name, row.status_text()),
            })
            .collect()
    }
}

fn malformed(message: &str, field: &str) -> HudError {
    HudError::Malformed {
        message: message.to_string(),
        field: field.to_string(),
    }
}

fn display_rank(key: &str) -> usize {
    key.parse::<ChallengeId>()
        .ok()
        .and_then(|id| ChallengeId::ALL.iter().position(|k| *k == id))
        .unwrap_or(usize::MAX)
}

fn parse_row(message: &str, key: &str, entry: &Value) -> Result<ChallengeRow, HudError> {
    let text = |f: &str| {
        entry
            .get(f)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| malformed(message, &format!("{key}.{f}")))
    };
    let number = |f: &str| {
        entry
            .get(f)
            .and_then(Value::as_f64)
            .ok_or_else(|| malformed(message, &format!("{key}.{f}")))
    };

    Ok(ChallengeRow {
        key: key.to_string(),
        name: text("name")?,
        description: text("description").unwrap_or_default(),
        progress: number("progress")?,
        max_progress: number("maxProgress")?,
        completed: entry.get("completed").is_some_and(read_flag),
        completed_by: entry
            .get("completedBy")
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(crate::game::snapshot::NO_TEAM),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::registry::ChallengeRegistry;
    use crate::game::snapshot::build_snapshot;
    use crate::game::store::ChallengeStore;
    use crate::network::protocol::{ChallengeCompleted, ServerMessage};
    use serde_json::json;

    fn apply(hud: &mut ChallengeHud, msg: &ServerMessage) {
        hud.apply(msg.name(), &msg.networked_payload().unwrap()).unwrap();
    }

    #[test]
    fn test_rows_from_networked_snapshot() {
        let registry = ChallengeRegistry::standard();
        let mut store = ChallengeStore::new(&registry);
        store.set_progress(ChallengeId::Dust200, 50.0).unwrap();
        store.try_set_completed(ChallengeId::RoshanKill, Team::Radiant, 1200.0).unwrap();
        store.try_set_completed(ChallengeId::Deward, Team::Dire, 300.0).unwrap();

        let mut hud = ChallengeHud::new();
        apply(&mut hud, &ServerMessage::ChallengeProgressUpdate { challenges: build_snapshot(&registry, &store) });

        assert_eq!(hud.rows().len(), registry.len());
        assert_eq!(hud.rows()[0].key, "dust200");
        assert_eq!(hud.rows().last().unwrap().key, "bottleArcane");

        let dust = hud.row("dust200").unwrap();
        assert_eq!(dust.status_text(), "50/200");
        assert_eq!(dust.progress_percent(), Some(25.0));
        assert_eq!(dust.classes(), vec!["challenge-item"]);

        let roshan = hud.row("roshanKill").unwrap();
        assert_eq!(roshan.status_text(), "Radiant");
        assert_eq!(roshan.progress_percent(), None);
        assert_eq!(roshan.classes(), vec!["challenge-item", "completed", "radiant-completed"]);

        let ward = hud.row("deward").unwrap();
        assert_eq!(ward.classes(), vec!["challenge-item", "completed", "dire-completed"]);

        assert_eq!(hud.row("lotusCombo").unwrap().status_text(), "Pending");
        assert!(hud.render().contains(&"Dust Collector [50/200] 25%".to_string()));
    }

    #[test]
    fn test_completion_notification() {
        let mut hud = ChallengeHud::new();
        let msg = ServerMessage::ChallengeCompleted(ChallengeCompleted::new(
            ChallengeId::Trees100,
            "Lumberjack",
            Team::Dire,
        ));
        apply(&mut hud, &msg);
        assert_eq!(hud.notifications(), &["Lumberjack completed by Dire".to_string()]);
    }

    #[test]
    fn test_toggle_requests_refresh_on_open() {
        let mut hud = ChallengeHud::new();
        assert_eq!(
            hud.toggle(PlayerId::new(2)),
            Some(ClientMessage::ChallengeProgressRequest { player_id: PlayerId::new(2) })
        );
        assert!(hud.is_visible());
        assert_eq!(hud.toggle(PlayerId::new(2)), None);
    }

    #[test]
    fn test_rejects_unknown_and_malformed() {
        let mut hud = ChallengeHud::new();
        assert_eq!(
            hud.apply("example_event", &json!({})),
            Err(HudError::UnknownMessage("example_event".to_string()))
        );
        assert!(matches!(
            hud.apply("challenge_progress_update", &json!({ "challenges": { "dust200": { "name": "x" } } })),
            Err(HudError::Malformed { .. })
        ));
    }
}
