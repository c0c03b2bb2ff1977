//! Host-side runner for the Volex bridge.
//!
//! Runs the bridge device logic on a development machine:
//!
//! - [`uart_server`] exposes the device's serial port as a TCP socket, so any
//!   terminal or host program can talk the line protocol to it.
//! - [`sim_air`] simulates the ESP-NOW medium, the device's radio and remote
//!   peers that answer with `[volex-conn]` requests.
//! - [`supervisor`] boots the device, restarts it when the radio fails to
//!   initialize, and drives the main loop.

pub mod error;
pub mod sim_air;
pub mod supervisor;
pub mod uart_server;

pub use error::{RunnerError, RunnerResult};
pub use sim_air::{SimAir, SimPeer, SimRadio, MAX_PEERS};
pub use supervisor::{Supervisor, SupervisorConfig};
pub use uart_server::{UartHandle, UartServer};
