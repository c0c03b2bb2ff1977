//! Volex Bridge Line Protocol
//!
//! This crate provides the types and utilities shared by the Volex bridge
//! firmware and the host that talks to it over a serial link. The bridge relays
//! between that serial link and an ESP-NOW style peer-to-peer radio, and every
//! exchange on the serial side is a line of ASCII text.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → bridge): `[cmd]<address>|<payload>` terminated with `\n`.
//!   The payload is forwarded verbatim to the peer with that hardware address.
//! - **Diagnostics** (bridge → host): `[log]<text>` terminated with `\r\n`.
//! - **Relayed data** (bridge → host): `[tx]<address>|<payload>` for every radio
//!   frame that starts with the `[volex-conn]` request tag.
//! - **Heartbeat** (bridge → host): the bare line `hearbeat`, once per second.
//!
//! Addresses are written as six colon-separated uppercase hex octets,
//! for example `5C:CF:7F:0A:11:FE`.
//!
//! # Example
//!
//! ```rust
//! use volex_protocol::{MacAddress, SendCommand};
//!
//! let cmd = SendCommand::parse("[cmd]AA:BB:CC:DD:EE:FF|hello")?;
//! assert_eq!(cmd.address, MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
//! assert_eq!(cmd.payload_bytes(), b"hello\0");
//! # Ok::<(), volex_protocol::ProtocolError>(())
//! ```

mod address;
mod codec;
mod commands;
pub mod constants;
mod error;
mod lines;
mod requests;

pub use address::*;
pub use codec::*;
pub use commands::*;
pub use error::*;
pub use lines::*;
pub use requests::*;
