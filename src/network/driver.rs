//! Match Driver
//!
//! Runs one [`MatchState`] inside a single tokio task. Engine events, client
//! requests and host updates arrive on one inbound channel and are applied
//! in arrival order; a frame interval advances game-time timers. Nothing is
//! shared across tasks, so the match logic needs no locks.

use std::time::Duration;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::core::ids::PlayerId;
use crate::game::events::{EventError, GameEvent};
use crate::game::host::{EventBus, Host};
use crate::game::state::MatchState;
use crate::network::protocol::{ClientMessage, ServerMessage};

/// Driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// How often timers are advanced from the host clock (milliseconds)
    pub frame_interval_ms: u64,
    /// Inbound queue depth
    pub inbound_capacity: usize,
    /// Queue depth for display clients connected through the handle
    pub client_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 100,
            inbound_capacity: 1024,
            client_capacity: 64,
        }
    }
}

impl DriverConfig {
    /// Frame interval as a duration.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// Driver errors.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The driver task is gone.
    #[error("Match driver stopped")]
    Stopped,

    /// Engine payload rejected at the boundary.
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Mutation applied to the host inside the driver task.
pub type HostUpdate<H> = Box<dyn FnOnce(&mut H) + Send>;

/// Work item for the driver task.
pub enum DriverInput<H> {
    /// Engine event
    Event(GameEvent),
    /// Display-client request
    Client(ClientMessage),
    /// Attach a display client
    Connect(PlayerId, mpsc::Sender<ServerMessage>),
    /// Detach a display client
    Disconnect(PlayerId),
    /// Change host state (clock, heroes, ...)
    Host(HostUpdate<H>),
    /// Run due timers now instead of waiting for the next frame
    Advance,
}

/// Cloneable sending side of a running driver.
pub struct DriverHandle<H> {
    inbound: mpsc::Sender<DriverInput<H>>,
    shutdown: broadcast::Sender<()>,
    client_capacity: usize,
}

impl<H> Clone for DriverHandle<H> {
    fn clone(&self) -> Self {
        Self {
            inbound: self.inbound.clone(),
            shutdown: self.shutdown.clone(),
            client_capacity: self.client_capacity,
        }
    }
}

impl<H> DriverHandle<H> {
    async fn send(&self, input: DriverInput<H>) -> Result<(), DriverError> {
        self.inbound.send(input).await.map_err(|_| DriverError::Stopped)
    }

    /// Queue a decoded event.
    pub async fn send_event(&self, event: GameEvent) -> Result<(), DriverError> {
        self.send(DriverInput::Event(event)).await
    }

    /// Decode and queue a raw engine event.
    pub async fn send_engine_event(&self, name: &str, payload: Value) -> Result<(), DriverError> {
        let event = GameEvent::from_engine(name, payload)?;
        self.send_event(event).await
    }

    /// Queue a display-client request.
    pub async fn send_client(&self, message: ClientMessage) -> Result<(), DriverError> {
        self.send(DriverInput::Client(message)).await
    }

    /// Connect a display client for `player`.
    pub async fn connect(&self, player: PlayerId) -> Result<mpsc::Receiver<ServerMessage>, DriverError> {
        let (tx, rx) = mpsc::channel(self.client_capacity.max(1));
        self.send(DriverInput::Connect(player, tx)).await?;
        Ok(rx)
    }

    /// Disconnect a display client.
    pub async fn disconnect(&self, player: PlayerId) -> Result<(), DriverError> {
        self.send(DriverInput::Disconnect(player)).await
    }

    /// Mutate the host inside the driver task.
    pub async fn update_host<F>(&self, update: F) -> Result<(), DriverError>
    where
        F: FnOnce(&mut H) + Send + 'static,
    {
        self.send(DriverInput::Host(Box::new(update))).await
    }

    /// Run due timers without waiting for the next frame.
    pub async fn advance(&self) -> Result<(), DriverError> {
        self.send(DriverInput::Advance).await
    }

    /// Stop the driver.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }
}

/// Owns a match and its host for the lifetime of the driver task.
pub struct MatchDriver<H> {
    config: DriverConfig,
    state: MatchState,
    host: H,
    inbound: mpsc::Receiver<DriverInput<H>>,
    shutdown: broadcast::Receiver<()>,
}

impl<H: Host + EventBus + Send + 'static> MatchDriver<H> {
    /// Create a driver and its handle. Subscribes the match to every event
    /// kind on the host's bus.
    pub fn new(config: DriverConfig, state: MatchState, mut host: H) -> (Self, DriverHandle<H>) {
        state.register(&mut host);

        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = DriverHandle {
            inbound: inbound_tx,
            shutdown: shutdown_tx,
            client_capacity: config.client_capacity,
        };

        let driver = Self {
            config,
            state,
            host,
            inbound: inbound_rx,
            shutdown: shutdown_rx,
        };

        (driver, handle)
    }

    /// Run until shutdown or until every handle is dropped. Queued inputs
    /// are drained before shutdown takes effect. Returns the final match
    /// and host.
    #[instrument(skip(self), fields(match_id = %self.state.match_id))]
    pub async fn run(self) -> (MatchState, H) {
        let Self {
            config,
            mut state,
            mut host,
            mut inbound,
            mut shutdown,
        } = self;

        let mut frames = interval(config.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Match driver started ({}ms frames)", config.frame_interval_ms);

        loop {
            tokio::select! {
                biased;

                input = inbound.recv() => {
                    match input {
                        Some(input) => apply(&mut state, &mut host, input),
                        None => {
                            info!("All driver handles dropped");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = frames.tick() => {
                    state.advance_time(&mut host);
                }
            }
        }

        state.log_progress();
        (state, host)
    }
}

fn apply<H: Host>(state: &mut MatchState, host: &mut H, input: DriverInput<H>) {
    match input {
        DriverInput::Event(event) => state.handle_event(host, &event),
        DriverInput::Client(message) => state.handle_client_message(&message),
        DriverInput::Connect(player, sender) => state.hub_mut().attach(player, sender),
        DriverInput::Disconnect(player) => {
            if !state.hub_mut().disconnect(player) {
                debug!("Disconnect for unknown client {}", player);
            }
        }
        DriverInput::Host(update) => update(host),
        DriverInput::Advance => state.advance_time(host),
    }
}
