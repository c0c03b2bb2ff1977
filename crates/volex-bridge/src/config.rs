//! Bridge configuration.
//!
//! The firmware runs with [`BridgeConfig::default`]; the fields exist so tests
//! and the host-side simulator can shorten intervals.

use volex_protocol::constants::HEARTBEAT_INTERVAL_MS;

/// Channel peers are registered on when sending.
pub const PEER_CHANNEL: u8 = 1;

/// ESP-NOW device roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerRole {
    /// Neither sends nor receives.
    Idle,
    /// Sends to slaves.
    Controller,
    /// Receives from controllers.
    Slave,
    /// Sends and receives.
    Combo,
}

/// Configuration for a bridge instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Interval between heartbeat lines (milliseconds).
    pub heartbeat_interval_ms: u32,
    /// Role this device takes on the radio.
    pub self_role: PeerRole,
    /// Role transient peers are registered with.
    pub peer_role: PeerRole,
    /// Channel transient peers are registered on.
    pub peer_channel: u8,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            self_role: PeerRole::Combo,
            peer_role: PeerRole::Slave,
            peer_channel: PEER_CHANNEL,
        }
    }
}

impl BridgeConfig {
    /// Set the heartbeat interval.
    pub fn with_heartbeat_interval_ms(mut self, interval_ms: u32) -> Self {
        self.heartbeat_interval_ms = interval_ms;
        self
    }
}
