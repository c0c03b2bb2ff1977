//! Line framer over the host serial port.

use volex_protocol::{LineCodec, LineEnd, Tag};

use crate::hal::Serial;

/// Writes tagged lines to the host.
///
/// The `*_open` variants leave the line unterminated so that several writes
/// compose one logical line.
#[derive(Debug)]
pub struct HostLink<S> {
    serial: S,
}

impl<S: Serial> HostLink<S> {
    /// Wrap a serial port.
    pub fn new(serial: S) -> Self {
        HostLink { serial }
    }

    /// Write a terminated `[log]` line.
    pub fn log(&mut self, text: &str) {
        log::debug!("[log] {}", text);
        self.write_tagged(Tag::Log, text, LineEnd::Terminated);
    }

    /// Write `[log]` and `text` without terminating the line.
    pub fn log_open(&mut self, text: &str) {
        self.write_tagged(Tag::Log, text, LineEnd::Open);
    }

    /// Write a terminated `[tx]` line.
    pub fn send(&mut self, text: &str) {
        log::trace!("[tx] {}", text);
        self.write_tagged(Tag::Data, text, LineEnd::Terminated);
    }

    /// Write `[tx]` and `text` without terminating the line.
    pub fn send_open(&mut self, text: &str) {
        self.write_tagged(Tag::Data, text, LineEnd::Open);
    }

    /// Write untagged text followed by the line terminator.
    pub fn write_line(&mut self, text: &str) {
        self.serial.write(&LineCodec::encode_raw_line(text));
    }

    /// Write the heartbeat line.
    pub fn heartbeat(&mut self) {
        self.serial.write(&LineCodec::encode_heartbeat());
    }

    /// Read pending host bytes.
    pub fn read(&mut self) -> Option<Vec<u8>> {
        self.serial.read()
    }

    /// Borrow the serial port.
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Mutably borrow the serial port.
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Unwrap the serial port.
    pub fn into_inner(self) -> S {
        self.serial
    }

    fn write_tagged(&mut self, tag: Tag, text: &str, end: LineEnd) {
        self.serial.write(&LineCodec::encode_tagged(tag, text, end));
    }
}
