//! Adapter over the peer-to-peer radio stack.
//!
//! The stack itself (queuing, retransmission, the air protocol) is external.
//! The bridge only needs initialization, a peer table, an asynchronous send and
//! two notifications, which the adapter delivers as [`RadioEvent`]s.

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use volex_protocol::MacAddress;

use crate::config::PeerRole;

// ============================================================================
// Events
// ============================================================================

/// Outcome of a transmission as reported by the radio stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The peer acknowledged the frame.
    Success,
    /// The frame was not acknowledged.
    Fail,
}

impl DeliveryStatus {
    /// Map a raw status code (0 = success).
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            DeliveryStatus::Success
        } else {
            DeliveryStatus::Fail
        }
    }
}

/// Notification posted by the radio adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    /// A frame arrived from a peer.
    Received {
        /// Sender address.
        from: MacAddress,
        /// Raw frame bytes.
        data: Vec<u8>,
    },

    /// A previous send completed.
    DeliveryStatus {
        /// Destination of the send.
        to: MacAddress,
        /// Outcome.
        status: DeliveryStatus,
    },
}

/// Sending half of the notification channel, handed to the adapter.
pub type RadioEventSender = Sender<RadioEvent>;

/// Create a notification channel.
pub fn event_channel() -> (RadioEventSender, Receiver<RadioEvent>) {
    crossbeam_channel::unbounded()
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reported by the radio stack.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RadioError {
    /// The stack failed to start.
    #[error("radio initialization failed (code {0})")]
    InitFailed(i32),

    /// Called before a successful [`Radio::init`].
    #[error("radio not initialized")]
    NotInitialized,

    /// The peer table has no free slot.
    #[error("peer table full")]
    PeerTableFull,

    /// The address is not in the peer table.
    #[error("peer {0} not found")]
    PeerNotFound(MacAddress),

    /// The stack refused the frame.
    #[error("send failed: {0}")]
    SendFailed(String),
}

// ============================================================================
// Adapter Trait
// ============================================================================

/// Peer-to-peer radio stack.
pub trait Radio {
    /// Bring the radio up in station mode. A failure here is fatal for the device.
    fn init(&mut self) -> Result<(), RadioError>;

    /// Set the role of this device.
    fn set_self_role(&mut self, role: PeerRole) -> Result<(), RadioError>;

    /// Register where receive and delivery notifications are posted.
    fn register_events(&mut self, events: RadioEventSender);

    /// Add a peer to the peer table.
    fn add_peer(&mut self, addr: MacAddress, role: PeerRole, channel: u8) -> Result<(), RadioError>;

    /// Queue a frame for a peer. The outcome arrives later as
    /// [`RadioEvent::DeliveryStatus`].
    fn send(&mut self, addr: MacAddress, data: &[u8]) -> Result<(), RadioError>;

    /// Remove a peer from the peer table.
    fn remove_peer(&mut self, addr: MacAddress) -> Result<(), RadioError>;
}
