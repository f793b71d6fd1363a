//! Network Layer
//!
//! Display-client messaging and the async match driver. Challenge logic
//! lives in `game/`; this layer only moves messages.

pub mod protocol;
pub mod wire;
pub mod hub;
pub mod driver;

pub use protocol::{ClientMessage, ServerMessage, ChallengeCompleted};
pub use hub::{DisplayHub, HubConfig, HubError};
pub use driver::{MatchDriver, DriverHandle, DriverConfig, DriverError, DriverInput};
