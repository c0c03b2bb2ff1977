//! Hardware (MAC) addresses of radio peers.
//!
//! The canonical text form is six colon-separated, two-digit uppercase hex
//! octets: `AA:BB:CC:DD:EE:FF`, always 17 characters.

use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, ProtocolResult};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A 6-byte radio hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Number of octets in an address.
    pub const LEN: usize = 6;

    /// Length of the canonical text form.
    pub const TEXT_LEN: usize = 17;

    /// The broadcast address `FF:FF:FF:FF:FF:FF`.
    pub const BROADCAST: MacAddress = MacAddress([0xFF; 6]);

    /// Create an address from its octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }

    /// Get the raw octets.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Parse the colon-hex text form.
    ///
    /// Exactly six groups are required, each one or two hex digits. Anything
    /// else (missing groups, extra groups, signs, non-hex digits, surrounding
    /// text) is rejected.
    pub fn parse(text: &str) -> ProtocolResult<Self> {
        let invalid = || ProtocolError::InvalidAddress(text.to_string());

        let mut octets = [0u8; 6];
        let mut groups = text.split(':');
        for octet in octets.iter_mut() {
            let group = groups.next().ok_or_else(invalid)?;
            if group.is_empty() || group.len() > 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(group, 16).map_err(|_| invalid())?;
        }

        if groups.next().is_some() {
            return Err(invalid());
        }

        Ok(MacAddress(octets))
    }

    /// Encode the canonical text form into a fixed-size buffer.
    pub fn encode_text(&self) -> [u8; Self::TEXT_LEN] {
        let mut buf = [b':'; Self::TEXT_LEN];
        for (i, octet) in self.0.iter().enumerate() {
            buf[i * 3] = HEX_DIGITS[(octet >> 4) as usize];
            buf[i * 3 + 1] = HEX_DIGITS[(octet & 0x0F) as usize];
        }
        buf
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buf = self.encode_text();
        // Only ASCII hex digits and colons are ever written to the buffer.
        let text = std::str::from_utf8(&buf).map_err(|_| fmt::Error)?;
        f.write_str(text)
    }
}

impl FromStr for MacAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MacAddress::parse(s)
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }
}

impl From<MacAddress> for [u8; 6] {
    fn from(addr: MacAddress) -> Self {
        addr.0
    }
}
