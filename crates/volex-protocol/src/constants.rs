//! Protocol constants.
//!
//! These are fixed at build time; the bridge has no runtime configuration.

/// Serial link baud rate.
pub const BAUD_RATE: u32 = 9600;

/// Tag every radio request must start with to be relayed to the host.
pub const REQUEST_PREFIX: &str = "[volex-conn]";

/// Tag of host → bridge send commands.
pub const CMD_PREFIX: &str = "[cmd]";

/// Tag of bridge → host diagnostic lines.
pub const LOG_PREFIX: &str = "[log]";

/// Tag of bridge → host relayed data lines.
pub const DATA_PREFIX: &str = "[tx]";

/// Separator between the address and the payload of a command or relay line.
pub const FIELD_SEPARATOR: char = '|';

/// Liveness line, emitted without a tag. The spelling is part of the wire format.
pub const HEARTBEAT_LINE: &str = "hearbeat";

/// Interval between heartbeat lines (milliseconds).
pub const HEARTBEAT_INTERVAL_MS: u32 = 1000;

/// Terminator written after every complete bridge → host line.
pub const LINE_ENDING: &str = "\r\n";

/// Maximum accepted host → bridge line length, excluding the terminator.
pub const MAX_LINE_LENGTH: usize = 320;

/// Largest payload the radio accepts in a single frame (`ESP_NOW_MAX_DATA_LEN`).
pub const MAX_RADIO_PAYLOAD: usize = 250;
