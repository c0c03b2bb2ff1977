//! Parsing of bridge → host lines.
//!
//! Hosts (and test harnesses) read the bridge output line by line:
//! - `[log]<text>`: diagnostics
//! - `[tx]<address>|<payload>`: data relayed from a radio peer
//! - `hearbeat`: liveness
//!
//! Anything else is reported as [`DeviceLine::Other`].

use crate::address::MacAddress;
use crate::constants::{DATA_PREFIX, FIELD_SEPARATOR, HEARTBEAT_LINE, LOG_PREFIX};

/// A parsed line written by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceLine {
    /// Diagnostic text with the `[log]` tag stripped.
    Log(String),

    /// Data relayed from a radio peer.
    Relay {
        /// Peer that sent the request.
        from: MacAddress,
        /// Request body.
        payload: String,
    },

    /// Heartbeat line.
    Heartbeat,

    /// Unrecognized line (including `[tx]` lines with a malformed address).
    Other(String),
}

impl DeviceLine {
    /// Parse a line. Trailing `\r`/`\n` are ignored.
    pub fn parse(line: &str) -> DeviceLine {
        let line = line.trim_end_matches(['\r', '\n']);

        if line == HEARTBEAT_LINE {
            return DeviceLine::Heartbeat;
        }

        if let Some(text) = line.strip_prefix(LOG_PREFIX) {
            return DeviceLine::Log(text.to_string());
        }

        if let Some(text) = line.strip_prefix(DATA_PREFIX) {
            if let Some((addr, payload)) = text.split_once(FIELD_SEPARATOR) {
                if let Ok(from) = MacAddress::parse(addr) {
                    return DeviceLine::Relay {
                        from,
                        payload: payload.to_string(),
                    };
                }
            }
        }

        DeviceLine::Other(line.to_string())
    }

    /// Check if this is a heartbeat.
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, DeviceLine::Heartbeat)
    }
}
