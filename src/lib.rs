//! # Challenge Tracker
//!
//! Team challenge tracking for a custom arena game mode: engine events drive
//! per-player and per-team stats, completed challenges are credited to
//! exactly one team, and display clients are kept in sync.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CHALLENGE TRACKER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Primitives                              │
//! │  ├── ids.rs        - Player, entity, team, game time         │
//! │  ├── classify.rs   - Ability name heuristics                 │
//! │  └── timers.rs     - Game-time scheduler                     │
//! │                                                              │
//! │  game/             - Challenge logic (single-threaded)       │
//! │  ├── registry.rs   - Challenge definitions                   │
//! │  ├── store.rs      - Completion state                        │
//! │  ├── stats.rs      - Player/team accumulators                │
//! │  ├── events.rs     - Typed engine events                     │
//! │  ├── host.rs       - Engine boundary                         │
//! │  ├── dispatch.rs   - Event handlers and predicates           │
//! │  ├── commit.rs     - At-most-once completion + broadcast     │
//! │  ├── sampler.rs    - Periodic hero polling                   │
//! │  ├── snapshot.rs   - Client-facing serialization             │
//! │  └── state.rs      - Match aggregate and config              │
//! │                                                              │
//! │  network/          - Messaging                               │
//! │  ├── protocol.rs   - Display-client messages                 │
//! │  ├── wire.rs       - Engine wire coercion                    │
//! │  ├── hub.rs        - Per-client fan-out                      │
//! │  └── driver.rs     - Async single-task match loop            │
//! │                                                              │
//! │  display/          - Display client                          │
//! │  └── hud.rs        - Headless challenge panel                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! Engine event → [`game::dispatch`] updates stats → predicate holds →
//! [`game::commit::complete_challenge`] → store records it once → announce,
//! notify, broadcast snapshot → [`display::ChallengeHud`] redraws.
//!
//! All match state lives in one [`MatchState`]; nothing is global, so
//! several matches can run in one process.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;
pub mod display;

// Re-export commonly used types
pub use core::ids::{PlayerId, EntityIndex, Team, GameTime};
pub use game::events::GameEvent;
pub use game::host::{Host, EventBus, LocalHost};
pub use game::registry::{ChallengeId, ChallengeRegistry};
pub use game::state::{MatchState, MatchConfig};
pub use network::driver::{MatchDriver, DriverConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
