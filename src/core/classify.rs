//! Ability Classification
//!
//! Name-based heuristics for ability metadata the engine does not report
//! directly. Both lookups are best-effort: ability names follow loose
//! conventions and the stun table only lists a handful of spells. Swap in a
//! different [`AbilityClassifier`] when authoritative data is available.

use std::collections::BTreeMap;

/// Classifies abilities by name.
pub trait AbilityClassifier: Send {
    /// Whether the ability is a hero's ultimate.
    fn is_ultimate(&self, ability_name: &str) -> bool;

    /// Stun seconds credited to the caster for one use. Zero if unknown.
    fn stun_duration(&self, ability_name: &str) -> f64;
}

/// Stun durations for abilities with a fixed stun (seconds).
pub const DEFAULT_STUN_TABLE: &[(&str, f64)] = &[
    ("storm_bolt", 2.5),
    ("magic_missile", 1.75),
    ("wraithfire_blast", 2.0),
    ("chaos_bolt", 2.0),
];

/// Table-driven heuristic classifier.
#[derive(Clone, Debug)]
pub struct NameHeuristics {
    /// Name fragments that mark an ultimate anywhere in the name
    pub ultimate_fragments: Vec<String>,
    /// Name endings that mark an ultimate
    pub ultimate_suffixes: Vec<String>,
    /// Hero-specific names treated as ultimates
    pub ultimate_overrides: Vec<String>,
    /// Ability name -> stun seconds
    pub stun_table: BTreeMap<String, f64>,
}

impl Default for NameHeuristics {
    fn default() -> Self {
        Self {
            ultimate_fragments: vec!["_ultimate".into(), "_ult".into(), "_4".into()],
            ultimate_suffixes: vec!["_r".into()],
            ultimate_overrides: vec!["invoker_invoke".into()],
            stun_table: DEFAULT_STUN_TABLE
                .iter()
                .map(|(name, secs)| (name.to_string(), *secs))
                .collect(),
        }
    }
}

impl AbilityClassifier for NameHeuristics {
    fn is_ultimate(&self, ability_name: &str) -> bool {
        self.ultimate_fragments.iter().any(|f| ability_name.contains(f.as_str()))
            || self.ultimate_suffixes.iter().any(|s| ability_name.ends_with(s.as_str()))
            || self.ultimate_overrides.iter().any(|o| ability_name.contains(o.as_str()))
    }

    fn stun_duration(&self, ability_name: &str) -> f64 {
        self.stun_table.get(ability_name).copied().unwrap_or(0.0)
    }
}
