//! Challenge State Store
//!
//! Mutable completion state for every registered challenge. The store is the
//! only place a challenge outcome is recorded.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::ids::{GameTime, Team};
use crate::game::registry::{ChallengeId, ChallengeRegistry};

/// Progress and completion of one challenge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeState {
    /// Set once, never cleared
    pub completed: bool,
    /// Team credited with the completion
    pub completed_by: Option<Team>,
    /// Game time of the completion (0 until completed)
    pub completed_at: GameTime,
    /// Current progress toward the threshold
    pub progress: f64,
}

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Challenge id not registered in this store.
    #[error("Challenge not registered: {0}")]
    NotFound(ChallengeId),
}

/// State for every challenge in a registry, keyed by id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChallengeStore {
    states: BTreeMap<ChallengeId, ChallengeState>,
}

impl ChallengeStore {
    /// Fresh state for every challenge in `registry`.
    pub fn new(registry: &ChallengeRegistry) -> Self {
        Self {
            states: registry
                .iter()
                .map(|def| (def.id, ChallengeState::default()))
                .collect(),
        }
    }

    /// Current state of a challenge.
    pub fn get(&self, id: ChallengeId) -> Result<&ChallengeState, StoreError> {
        self.states.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Mark a challenge completed by `team` at `time`.
    ///
    /// Returns `Ok(false)` without touching anything if it was already
    /// completed. This is the at-most-once commit.
    pub fn try_set_completed(
        &mut self,
        id: ChallengeId,
        team: Team,
        time: GameTime,
    ) -> Result<bool, StoreError> {
        let state = self.states.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if state.completed {
            return Ok(false);
        }

        state.completed = true;
        state.completed_by = Some(team);
        state.completed_at = time;
        Ok(true)
    }

    /// Overwrite progress. Callers keep it monotonic.
    pub fn set_progress(&mut self, id: ChallengeId, value: f64) -> Result<(), StoreError> {
        let state = self.states.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        state.progress = value;
        Ok(())
    }

    /// Raise progress to `value` if it is higher than the current one.
    pub fn raise_progress(&mut self, id: ChallengeId, value: f64) -> Result<f64, StoreError> {
        let current = self.get(id)?.progress;
        let next = current.max(value);
        self.set_progress(id, next)?;
        Ok(next)
    }

    /// Whether a challenge is completed. Unregistered ids read as not completed.
    pub fn is_completed(&self, id: ChallengeId) -> bool {
        self.states.get(&id).is_some_and(|s| s.completed)
    }

    /// Number of completed challenges.
    pub fn completed_count(&self) -> usize {
        self.states.values().filter(|s| s.completed).count()
    }

    /// Iterate states in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ChallengeId, &ChallengeState)> {
        self.states.iter().map(|(id, state)| (*id, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::registry::ChallengeDefinition;

    fn store() -> ChallengeStore {
        ChallengeStore::new(&ChallengeRegistry::standard())
    }

    #[test]
    fn test_fresh_store() {
        let s = store();
        let state = s.get(ChallengeId::Dust200).unwrap();
        assert!(!state.completed);
        assert_eq!(state.completed_by, None);
        assert_eq!(state.progress, 0.0);
        assert_eq!(s.completed_count(), 0);
    }

    #[test]
    fn test_at_most_once() {
        let mut s = store();
        assert_eq!(s.try_set_completed(ChallengeId::Deward, Team::Dire, 12.5), Ok(true));
        assert_eq!(s.try_set_completed(ChallengeId::Deward, Team::Radiant, 40.0), Ok(false));

        let state = s.get(ChallengeId::Deward).unwrap();
        assert!(state.completed);
        assert_eq!(state.completed_by, Some(Team::Dire));
        assert_eq!(state.completed_at, 12.5);
    }

    #[test]
    fn test_not_found() {
        let registry = ChallengeRegistry::new(vec![ChallengeDefinition::new(
            ChallengeId::Deward,
            "Dewarder",
            "Kill an enemy ward",
            1.0,
        )]);
        let mut s = ChallengeStore::new(&registry);
        assert_eq!(
            s.get(ChallengeId::Dust200).unwrap_err(),
            StoreError::NotFound(ChallengeId::Dust200)
        );
        assert!(s.try_set_completed(ChallengeId::Dust200, Team::Radiant, 1.0).is_err());
        assert!(s.set_progress(ChallengeId::Dust200, 3.0).is_err());
        assert!(!s.is_completed(ChallengeId::Dust200));
    }

    #[test]
    fn test_raise_progress_is_monotonic() {
        let mut s = store();
        assert_eq!(s.raise_progress(ChallengeId::LastHits150, 10.0), Ok(10.0));
        assert_eq!(s.raise_progress(ChallengeId::LastHits150, 4.0), Ok(10.0));
        assert_eq!(s.get(ChallengeId::LastHits150).unwrap().progress, 10.0);
    }
}
