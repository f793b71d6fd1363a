//! Snapshot Serialization
//!
//! Joins challenge state with registry metadata into the shape display
//! clients consume. Entries keep registry order on the wire.

use std::fmt;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::ids::Team;
use crate::game::registry::{ChallengeId, ChallengeRegistry};
use crate::game::store::ChallengeStore;

/// `completedBy` value when no team has completed the challenge.
pub const NO_TEAM: i32 = -1;

/// One challenge as seen by display clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub name: String,
    pub description: String,
    pub progress: f64,
    pub max_progress: f64,
    pub completed: bool,
    /// Team number, or [`NO_TEAM`]
    pub completed_by: i32,
    pub completed_at: f64,
}

impl SnapshotEntry {
    /// Completing team, if any.
    pub fn completed_team(&self) -> Option<Team> {
        Team::from_wire(self.completed_by)
    }
}

/// Full challenge table keyed by challenge id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    entries: Vec<(ChallengeId, SnapshotEntry)>,
}

impl Snapshot {
    /// Entry for one challenge.
    pub fn get(&self, id: ChallengeId) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|(k, _)| *k == id).map(|(_, e)| e)
    }

    /// Entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (ChallengeId, &SnapshotEntry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, entry) in &self.entries {
            map.serialize_entry(id, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = Snapshot;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of challenge keys to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Snapshot, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, entry)) = access.next_entry::<ChallengeId, SnapshotEntry>()? {
                    entries.push((id, entry));
                }
                Ok(Snapshot { entries })
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}

/// Build the snapshot for every registered challenge.
///
/// A challenge missing from the store is reported with fresh state so the
/// client table never silently loses a row.
pub fn build_snapshot(registry: &ChallengeRegistry, store: &ChallengeStore) -> Snapshot {
    let entries = registry
        .iter()
        .map(|def| {
            let state = store.get(def.id).cloned().unwrap_or_default();
            let entry = SnapshotEntry {
                name: def.name.clone(),
                description: def.description.clone(),
                progress: state.progress,
                max_progress: def.max_progress,
                completed: state.completed,
                completed_by: state.completed_by.map(Team::wire_value).unwrap_or(NO_TEAM),
                completed_at: state.completed_at,
            };
            (def.id, entry)
        })
        .collect();

    Snapshot { entries }
}

/// One line per challenge: `key: COMPLETED by Team` or `key: progress/max`.
pub fn progress_report(registry: &ChallengeRegistry, store: &ChallengeStore) -> Vec<String> {
    registry
        .iter()
        .map(|def| {
            let state = store.get(def.id).cloned().unwrap_or_default();
            if state.completed {
                match state.completed_by {
                    Some(team) => format!("{}: COMPLETED by {}", def.id, team),
                    None => format!("{}: COMPLETED", def.id),
                }
            } else {
                format!("{}: {}/{}", def.id, state.progress, def.max_progress)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_challenge_present_with_sentinel() {
        let registry = ChallengeRegistry::standard();
        let mut store = ChallengeStore::new(&registry);
        store.try_set_completed(ChallengeId::RoshanKill, Team::Dire, 900.0).unwrap();

        let snapshot = build_snapshot(&registry, &store);
        assert_eq!(snapshot.len(), registry.len());

        for id in ChallengeId::ALL {
            let entry = snapshot.get(id).expect("entry present");
            if id == ChallengeId::RoshanKill {
                assert!(entry.completed);
                assert_eq!(entry.completed_by, 3);
                assert_eq!(entry.completed_team(), Some(Team::Dire));
                assert_eq!(entry.completed_at, 900.0);
            } else {
                assert_eq!(entry.completed_by, NO_TEAM);
                assert_eq!(entry.completed_team(), None);
            }
        }
    }

    #[test]
    fn test_wire_shape_keeps_registry_order() {
        let registry = ChallengeRegistry::standard();
        let store = ChallengeStore::new(&registry);
        let json = serde_json::to_string(&build_snapshot(&registry, &store)).unwrap();

        assert!(json.starts_with("{\"dust200\":{\"name\":\"Dust Collector\""));
        assert!(json.contains("\"maxProgress\":200.0"));
        assert!(json.contains("\"completedBy\":-1"));

        let dust = json.find("\"dust200\"").unwrap();
        let arcane = json.find("\"bottleArcane\"").unwrap();
        assert!(dust < arcane);

        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), registry.len());
    }

    #[test]
    fn test_progress_report_lines() {
        let registry = ChallengeRegistry::standard();
        let mut store = ChallengeStore::new(&registry);
        store.set_progress(ChallengeId::Dust200, 12.0).unwrap();
        store.try_set_completed(ChallengeId::Deward, Team::Radiant, 5.0).unwrap();

        let lines = progress_report(&registry, &store);
        assert!(lines.contains(&"dust200: 12/200".to_string()));
        assert!(lines.contains(&"deward: COMPLETED by Radiant".to_string()));
    }
}
