//! Requests received over the radio.
//!
//! A radio frame is a request when its first bytes are exactly the
//! `[volex-conn]` tag. The text after the tag, up to the first NUL byte, is
//! relayed to the host together with the sender's address.

use crate::address::MacAddress;
use crate::constants::{DATA_PREFIX, FIELD_SEPARATOR, REQUEST_PREFIX};
use crate::error::{ProtocolError, ProtocolResult};

/// Check whether a radio frame starts with the request tag.
///
/// Frames shorter than the tag are never valid.
pub fn is_valid_request(data: &[u8]) -> bool {
    data.starts_with(REQUEST_PREFIX.as_bytes())
}

/// Interpret bytes as NUL-terminated text.
///
/// Stops at the first NUL (or the end of the slice); invalid UTF-8 is replaced.
pub fn nul_terminated_text(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

/// A validated request from a radio peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// Sender of the frame.
    pub from: MacAddress,
    /// Text following the request tag.
    pub body: String,
}

impl InboundRequest {
    /// Validate a radio frame and strip the request tag.
    ///
    /// An untagged frame yields [`ProtocolError::InvalidRequest`] carrying the
    /// frame as text.
    pub fn parse(from: MacAddress, data: &[u8]) -> ProtocolResult<Self> {
        if !is_valid_request(data) {
            return Err(ProtocolError::InvalidRequest(nul_terminated_text(data)));
        }

        Ok(InboundRequest {
            from,
            body: nul_terminated_text(&data[REQUEST_PREFIX.len()..]),
        })
    }

    /// Text of the relay line after the `[tx]` tag: `<address>|<body>`.
    pub fn relay_text(&self) -> String {
        format!("{}{}{}", self.from, FIELD_SEPARATOR, self.body)
    }

    /// The complete relay line as seen by the host (without terminator).
    pub fn relay_line(&self) -> String {
        format!("{}{}", DATA_PREFIX, self.relay_text())
    }

    /// Build the radio frame a peer sends to raise this request.
    pub fn encode_frame(body: &str) -> Vec<u8> {
        let mut frame = Vec::with_capacity(REQUEST_PREFIX.len() + body.len() + 1);
        frame.extend_from_slice(REQUEST_PREFIX.as_bytes());
        frame.extend_from_slice(body.as_bytes());
        frame.push(0);
        frame
    }
}
