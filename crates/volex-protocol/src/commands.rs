//! Commands sent from the host to the bridge.
//!
//! There is a single command: `[cmd]<address>|<payload>`, asking the bridge to
//! transmit `<payload>` to the radio peer at `<address>`.

use crate::address::MacAddress;
use crate::constants::{CMD_PREFIX, FIELD_SEPARATOR};
use crate::error::{ProtocolError, ProtocolResult};

/// A parsed send command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCommand {
    /// Destination peer.
    pub address: MacAddress,
    /// Text to transmit, forwarded verbatim.
    pub payload: String,
}

impl SendCommand {
    /// Create a new send command.
    pub fn new(address: MacAddress, payload: impl Into<String>) -> Self {
        SendCommand {
            address,
            payload: payload.into(),
        }
    }

    /// Parse a host line.
    ///
    /// The line must start with `[cmd]`. Everything up to and including the
    /// first `]` is dropped, the rest is split at the first `|` into address
    /// text and payload. The payload may itself contain `|`.
    pub fn parse(line: &str) -> ProtocolResult<Self> {
        if !line.starts_with(CMD_PREFIX) {
            return Err(ProtocolError::MissingCommandPrefix(line.to_string()));
        }

        let body = match line.find(']') {
            Some(idx) => &line[idx + 1..],
            None => line,
        };

        let (address_text, payload) = body
            .split_once(FIELD_SEPARATOR)
            .ok_or_else(|| ProtocolError::MissingSeparator(body.to_string()))?;

        let address = MacAddress::parse(address_text)?;

        Ok(SendCommand {
            address,
            payload: payload.to_string(),
        })
    }

    /// Encode the command as a host line (without terminator).
    pub fn encode(&self) -> String {
        format!("{}{}{}{}", CMD_PREFIX, self.address, FIELD_SEPARATOR, self.payload)
    }

    /// Bytes handed to the radio: the payload followed by a NUL terminator.
    pub fn payload_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.payload.len() + 1);
        data.extend_from_slice(self.payload.as_bytes());
        data.push(0);
        data
    }
}
