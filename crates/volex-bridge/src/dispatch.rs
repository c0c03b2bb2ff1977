//! Host command dispatcher.

use volex_protocol::{MacAddress, ProtocolError, ProtocolResult, SendCommand};

use crate::bridge::Bridge;
use crate::hal::{Clock, Serial};
use crate::radio::Radio;

impl<S: Serial, R: Radio, C: Clock> Bridge<S, R, C> {
    /// Handle one host line.
    ///
    /// The line is echoed as a log line, parsed as a `[cmd]` line, and the
    /// payload is sent to the addressed peer: the peer is added to the radio's
    /// peer table, the payload (with a trailing NUL) is sent, and the peer is
    /// removed again. Malformed lines are logged and dropped without touching
    /// the radio. The send outcome only shows up later as a delivery
    /// notification.
    pub fn handle_command(&mut self, line: &str) -> ProtocolResult<MacAddress> {
        self.link.log(&format!("Got command: {}", line));

        let command = match SendCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.stats.commands_rejected += 1;
                match &e {
                    ProtocolError::MissingCommandPrefix(_) => {
                        self.link.log(&format!("Invalid cmd: {}", line));
                    }
                    ProtocolError::MissingSeparator(rest) => {
                        self.link.log(&format!("Invalid cmd format: {}", rest));
                    }
                    ProtocolError::InvalidAddress(_) => {
                        self.link.log("Invalid MAC address format!");
                    }
                    other => {
                        self.link.log(&format!("Invalid cmd: {}", other));
                    }
                }
                return Err(e);
            }
        };

        self.transmit(&command);
        self.stats.commands_sent += 1;
        Ok(command.address)
    }

    /// Send through a transient peer entry. Radio errors are reported to the
    /// developer log only; every step runs regardless of earlier failures.
    fn transmit(&mut self, command: &SendCommand) {
        let addr = command.address;

        if let Err(e) = self
            .radio
            .add_peer(addr, self.config.peer_role, self.config.peer_channel)
        {
            log::warn!("add peer {} failed: {}", addr, e);
        }

        let data = command.payload_bytes();
        match self.radio.send(addr, &data) {
            Ok(()) => log::debug!("queued {} bytes for {}", data.len(), addr),
            Err(e) => log::warn!("send to {} failed: {}", addr, e),
        }

        if let Err(e) = self.radio.remove_peer(addr) {
            log::warn!("remove peer {} failed: {}", addr, e);
        }
    }
}
