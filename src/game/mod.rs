//! Challenge Logic Module
//!
//! Everything that decides whether a challenge is completed. Runs on one
//! logical thread; the engine is reached only through [`host::Host`].
//!
//! ## Module Structure
//!
//! - `registry`: Challenge definitions and thresholds
//! - `store`: Per-challenge completion state
//! - `stats`: Player and team accumulators
//! - `events`: Typed inbound engine events
//! - `host`: Engine boundary traits and an in-memory host
//! - `dispatch`: Event handlers and completion predicates
//! - `commit`: At-most-once completion with broadcast
//! - `sampler`: Periodic hero polling
//! - `snapshot`: Client-facing state serialization
//! - `state`: Match aggregate and config

pub mod registry;
pub mod store;
pub mod stats;
pub mod events;
pub mod host;
pub mod dispatch;
pub mod commit;
pub mod sampler;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod properties;

// Re-export key types
pub use registry::{ChallengeId, ChallengeDefinition, ChallengeRegistry};
pub use store::{ChallengeState, ChallengeStore, StoreError};
pub use stats::{PlayerStats, TeamStats, StatsBook};
pub use events::{GameEvent, EventKind, EventError};
pub use host::{Host, EventBus, HeroStatus, LocalHost};
pub use commit::complete_challenge;
pub use snapshot::{Snapshot, SnapshotEntry, NO_TEAM};
pub use state::{MatchState, MatchConfig, MatchPhase, ConfigError};
