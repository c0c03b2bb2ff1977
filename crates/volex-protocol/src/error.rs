//! Error types for the bridge line protocol.

use thiserror::Error;

/// Errors that can occur when parsing bridge protocol lines and frames.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The host line does not start with the `[cmd]` tag.
    #[error("missing command prefix: {0}")]
    MissingCommandPrefix(String),

    /// The command has no `|` between address and payload.
    /// Carries the command text after the tag.
    #[error("missing address separator: {0}")]
    MissingSeparator(String),

    /// The address is not six colon-separated hex octets.
    #[error("invalid hardware address: {0:?}")]
    InvalidAddress(String),

    /// A radio frame does not start with the request tag.
    /// Carries the frame interpreted as text.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A host line exceeded the line buffer.
    #[error("line too long: max {max} bytes, got {actual}")]
    LineTooLong { max: usize, actual: usize },
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
