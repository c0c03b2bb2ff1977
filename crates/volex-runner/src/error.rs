//! Runner error types.

use thiserror::Error;
use volex_bridge::BridgeError;

/// Errors that can occur while running the bridge on the host.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Socket or runtime I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bridge stopped with an error.
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The device kept failing to boot.
    #[error("device failed to boot after {0} restarts")]
    RestartLimit(u32),

    /// The Ctrl-C handler could not be installed.
    #[error("cannot install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// A command-line value was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
