//! Display-Client Hub
//!
//! Fan-out of [`ServerMessage`]s to connected display clients. Each client
//! owns the receiving end of a bounded channel; the match never waits on a
//! slow client, it drops the message and logs.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::core::ids::PlayerId;
use crate::network::protocol::ServerMessage;

/// Hub settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Per-client queue depth
    pub channel_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { channel_capacity: 64 }
    }
}

/// Delivery errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// No client connected for this player.
    #[error("No display client for {0}")]
    UnknownClient(PlayerId),

    /// Client dropped its receiver.
    #[error("Display client for {0} disconnected")]
    ChannelClosed(PlayerId),

    /// Client is not draining its queue.
    #[error("Display client queue full for {0}")]
    ChannelFull(PlayerId),
}

/// Connected display clients, keyed by player.
///
/// Delivery is best effort. A client whose queue is full misses the message
/// outright, including a one-time `challenge_completed` notice, which is never
/// resent. Completion itself is not lost: every completion is followed by a
/// progress broadcast, and any later snapshot the client receives carries it.
#[derive(Debug, Default)]
pub struct DisplayHub {
    config: HubConfig,
    clients: BTreeMap<PlayerId, mpsc::Sender<ServerMessage>>,
}

impl DisplayHub {
    /// Create an empty hub.
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            clients: BTreeMap::new(),
        }
    }

    /// Connect a client and return its receiving end. Replaces any previous
    /// connection for the same player.
    pub fn connect(&mut self, player: PlayerId) -> mpsc::Receiver<ServerMessage> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        self.attach(player, tx);
        rx
    }

    /// Register an existing sender for a player.
    pub fn attach(&mut self, player: PlayerId, sender: mpsc::Sender<ServerMessage>) {
        if self.clients.insert(player, sender).is_some() {
            debug!("Display client for {} replaced", player);
        } else {
            debug!("Display client for {} connected", player);
        }
    }

    /// Forget a client. Returns false if it was not connected.
    pub fn disconnect(&mut self, player: PlayerId) -> bool {
        self.clients.remove(&player).is_some()
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Whether a player has a client connected.
    pub fn is_connected(&self, player: PlayerId) -> bool {
        self.clients.contains_key(&player)
    }

    /// Send to one client.
    pub fn send_to(&mut self, player: PlayerId, message: ServerMessage) -> Result<(), HubError> {
        let sender = self.clients.get(&player).ok_or(HubError::UnknownClient(player))?;

        match sender.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(HubError::ChannelFull(player)),
            Err(TrySendError::Closed(_)) => {
                self.clients.remove(&player);
                Err(HubError::ChannelClosed(player))
            }
        }
    }

    /// Send to every client. Closed clients are dropped. Returns the number
    /// of clients that accepted the message.
    pub fn broadcast(&mut self, message: ServerMessage) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (player, sender) in &self.clients {
            match sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Dropping {} for {}: queue full", message.name(), player);
                }
                Err(TrySendError::Closed(_)) => closed.push(*player),
            }
        }

        for player in closed {
            debug!("Display client for {} gone, removing", player);
            self.clients.remove(&player);
        }

        delivered
    }
}
