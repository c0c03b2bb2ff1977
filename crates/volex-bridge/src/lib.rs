//! # volex-bridge
//!
//! Device logic of the Volex serial ⇄ ESP-NOW bridge.
//!
//! The bridge owns three collaborators behind traits:
//!
//! - a [`Serial`] port to the host,
//! - a [`Radio`] adapter over the vendor peer-to-peer radio stack,
//! - a millisecond [`Clock`].
//!
//! Everything else lives in [`Bridge`]: the command dispatcher, the inbound
//! request relay and the heartbeat timer. Radio notifications are not handled
//! in the radio's own context; the adapter posts [`RadioEvent`]s into a channel
//! and [`Bridge::poll`] drains it from the main loop, so every serial write
//! happens on one thread.
//!
//! ## Usage
//!
//! ```ignore
//! use volex_bridge::{Bridge, BridgeConfig, SystemClock};
//!
//! let mut bridge = Bridge::new(BridgeConfig::default(), serial, radio, SystemClock::new());
//! bridge.boot()?;
//! loop {
//!     bridge.poll();
//! }
//! ```

mod bridge;
mod config;
mod dispatch;
mod framer;
mod hal;
mod heartbeat;
mod radio;
mod relay;

pub use bridge::{Bridge, BridgeError, BridgeStats};
pub use config::{BridgeConfig, PeerRole, PEER_CHANNEL};
pub use framer::HostLink;
pub use hal::{Clock, ManualClock, MemorySerial, Serial, SystemClock};
pub use heartbeat::Heartbeat;
pub use radio::{event_channel, DeliveryStatus, Radio, RadioError, RadioEvent, RadioEventSender};
