//! Match State
//!
//! The aggregate that owns every mutable table for one match: challenge
//! state, stat accumulators, timers and the display-client hub. Dispatch,
//! commit and sampling functions all take it explicitly, so several matches
//! can run side by side in one process.

use serde::{Serialize, Deserialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::classify::{AbilityClassifier, NameHeuristics};
use crate::core::ids::{GameTime, PlayerId};
use crate::core::timers::{TimerHandle, Timers};
use crate::game::commit::send_progress_to;
use crate::game::dispatch::dispatch;
use crate::game::events::{EventKind, GameEvent};
use crate::game::host::{EventBus, Host};
use crate::game::registry::ChallengeRegistry;
use crate::game::sampler::{sample, start_sampler};
use crate::game::snapshot::{build_snapshot, progress_report, Snapshot};
use crate::game::stats::StatsBook;
use crate::game::store::ChallengeStore;
use crate::network::hub::{DisplayHub, HubConfig};
use crate::network::protocol::ClientMessage;

// =============================================================================
// CONFIG
// =============================================================================

/// Tunables for challenge evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Delay between entering pre-game and starting challenge tracking
    pub start_delay: GameTime,
    /// Period of the armor / attack-rate sampler
    pub sample_interval: GameTime,
    /// Window in which consecutive kills count toward a double kill
    pub double_kill_window: GameTime,
    /// Kills inside the window needed for a double kill
    pub double_kill_count: u32,
    /// Armor needed for the armor challenge
    pub armor_threshold: f64,
    /// Attacks per second needed for the attack-speed challenge
    pub attack_rate_threshold: f64,
    /// Magic wand charges needed when the wand is used
    pub wand_charges: u32,
    /// Inventory slots searched for a bottle on arcane rune pickup
    pub inventory_slots: usize,
    /// Purchasing this item ends the game for the buyer's team
    pub victory_item: Option<String>,
    /// Display-client channel settings
    pub hub: HubConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            start_delay: 0.2,
            sample_interval: 5.0,
            double_kill_window: 18.0,
            double_kill_count: 2,
            armor_threshold: 30.0,
            attack_rate_threshold: 2.5,
            wand_charges: 20,
            inventory_slots: 6,
            victory_item: Some("item_fluffy_hat".to_string()),
            hub: HubConfig::default(),
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A period or delay that must be a positive, finite number of seconds.
    #[error("{field} must be positive and finite, got {value}")]
    InvalidDuration {
        /// Config field name
        field: &'static str,
        /// Offending value
        value: GameTime,
    },
}

impl MatchConfig {
    /// Check the timing fields. The sampler would otherwise spin or never re-arm.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("sample_interval", self.sample_interval),
            ("double_kill_window", self.double_kill_window),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }
        if !self.start_delay.is_finite() || self.start_delay < 0.0 {
            return Err(ConfigError::InvalidDuration { field: "start_delay", value: self.start_delay });
        }
        Ok(())
    }
}

// =============================================================================
// PHASE / TASKS
// =============================================================================

/// Where the match is in its lifecycle, as far as challenges care.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Lobby, hero selection, strategy time
    #[default]
    Setup,
    /// Pre-game reached, tracking start is scheduled
    PreGame,
    /// Tracking started, sampler running
    Playing,
    /// End-of-match standings awarded
    PostGame,
}

/// Deferred work scheduled on the game clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchTask {
    /// Initialize player stats and start the sampler
    StartGame,
    /// One sampler pass
    PeriodicSample,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// All challenge-tracking state for one match.
pub struct MatchState {
    /// Match identifier
    pub match_id: Uuid,

    /// Evaluation tunables
    pub config: MatchConfig,

    /// Lifecycle phase
    pub phase: MatchPhase,

    pub(crate) registry: ChallengeRegistry,
    pub(crate) store: ChallengeStore,
    pub(crate) stats: StatsBook,
    pub(crate) classifier: Box<dyn AbilityClassifier>,
    pub(crate) timers: Timers<MatchTask>,
    pub(crate) start_timer: Option<TimerHandle>,
    pub(crate) sampler_timer: Option<TimerHandle>,
    pub(crate) hub: DisplayHub,
}

impl MatchState {
    /// New match with the standard challenge set and name heuristics.
    pub fn new(config: MatchConfig) -> Self {
        Self::with_parts(config, ChallengeRegistry::standard(), Box::new(NameHeuristics::default()))
    }

    /// New match with an explicit registry and ability classifier.
    ///
    /// The registry may omit challenges. Events that would touch a missing
    /// one are logged and skipped by [`MatchState::handle_event`].
    pub fn with_parts(
        config: MatchConfig,
        registry: ChallengeRegistry,
        classifier: Box<dyn AbilityClassifier>,
    ) -> Self {
        let store = ChallengeStore::new(&registry);
        let hub = DisplayHub::new(config.hub.clone());

        Self {
            match_id: Uuid::new_v4(),
            config,
            phase: MatchPhase::Setup,
            registry,
            store,
            stats: StatsBook::new(),
            classifier,
            timers: Timers::new(),
            start_timer: None,
            sampler_timer: None,
            hub,
        }
    }

    /// Challenge definitions.
    pub fn registry(&self) -> &ChallengeRegistry {
        &self.registry
    }

    /// Challenge state.
    pub fn store(&self) -> &ChallengeStore {
        &self.store
    }

    /// Stat accumulators.
    pub fn stats(&self) -> &StatsBook {
        &self.stats
    }

    /// Display-client hub.
    pub fn hub(&self) -> &DisplayHub {
        &self.hub
    }

    /// Display-client hub, for connecting and disconnecting clients.
    pub fn hub_mut(&mut self) -> &mut DisplayHub {
        &mut self.hub
    }

    /// Handle of the running sampler timer, if started.
    pub fn sampler_handle(&self) -> Option<TimerHandle> {
        self.sampler_timer
    }

    /// Stop the sampler. Returns false if it was not running.
    pub fn cancel_sampler(&mut self) -> bool {
        match self.sampler_timer.take() {
            Some(handle) => self.timers.cancel(handle),
            None => false,
        }
    }

    /// Current snapshot of every challenge.
    pub fn snapshot(&self) -> Snapshot {
        build_snapshot(&self.registry, &self.store)
    }

    /// Human-readable progress lines.
    pub fn progress_report(&self) -> Vec<String> {
        progress_report(&self.registry, &self.store)
    }

    /// Log the progress report.
    pub fn log_progress(&self) {
        info!("=== CHALLENGE PROGRESS ===");
        for line in self.progress_report() {
            info!("{}", line);
        }
        info!("==========================");
    }

    /// Subscribe to every event kind the dispatcher handles.
    pub fn register(&self, bus: &mut dyn EventBus) {
        for kind in EventKind::ALL {
            bus.listen(kind);
        }
    }

    /// Dispatch one engine event.
    ///
    /// Failures are logged and absorbed so one bad event never stops the
    /// stream.
    pub fn handle_event(&mut self, host: &mut dyn Host, event: &GameEvent) {
        if let Err(e) = dispatch(self, host, event) {
            error!("Dropping {:?} event: {}", event.kind(), e);
        }
    }

    /// Answer a display-client request.
    pub fn handle_client_message(&mut self, message: &ClientMessage) {
        match message {
            ClientMessage::ChallengeProgressRequest { player_id } => {
                if let Err(e) = send_progress_to(self, *player_id) {
                    warn!("Progress request from {} not answered: {}", player_id, e);
                }
            }
        }
    }

    /// Schedule tracking start `start_delay` after `now`. Idempotent.
    pub fn schedule_start(&mut self, now: GameTime) {
        if self.start_timer.is_some() || self.phase == MatchPhase::Playing {
            return;
        }
        self.phase = MatchPhase::PreGame;
        self.start_timer = Some(self.timers.after(now, self.config.start_delay, MatchTask::StartGame));
        debug!("Challenge tracking starts in {}s", self.config.start_delay);
    }

    /// Run timers that came due at the host's current game time.
    pub fn advance_time(&mut self, host: &mut dyn Host) {
        let now = host.game_time();
        for task in self.timers.take_due(now) {
            match task {
                MatchTask::StartGame => self.start_game(host),
                MatchTask::PeriodicSample => {
                    if let Err(e) = sample(self, host) {
                        error!("Sampler pass failed: {}", e);
                    }
                }
            }
        }
    }

    fn start_game(&mut self, host: &mut dyn Host) {
        info!("Game starting! match={}", self.match_id);
        self.start_timer = None;

        for player in host.player_slots() {
            self.stats.ensure_player(player);
        }

        if self.sampler_timer.is_none() {
            self.sampler_timer = Some(start_sampler(self, host.game_time()));
        }
        self.phase = MatchPhase::Playing;
    }

    /// Whether the player has stats yet.
    pub fn is_tracking(&self, player: PlayerId) -> bool {
        self.stats.player(player).is_some()
    }

    /// Clear every challenge, stat and timer for a rematch. Clients stay connected.
    pub fn reset(&mut self) {
        info!("Resetting challenge state for match {}", self.match_id);
        self.match_id = Uuid::new_v4();
        self.phase = MatchPhase::Setup;
        self.store = ChallengeStore::new(&self.registry);
        self.stats = StatsBook::new();
        self.timers.clear();
        self.start_timer = None;
        self.sampler_timer = None;
    }
}
