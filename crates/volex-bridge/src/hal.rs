//! Hardware seams: the host serial port and the millisecond clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Serial port connected to the host.
///
/// Writes never fail from the bridge's point of view; an implementation that
/// cannot deliver data drops it.
pub trait Serial {
    /// Write bytes to the host.
    fn write(&mut self, data: &[u8]);

    /// Take whatever bytes the host has sent since the last call.
    /// Returns `None` if nothing is available. Must not block.
    fn read(&mut self) -> Option<Vec<u8>>;
}

/// Monotonic millisecond counter, like the device's `millis()`.
///
/// The value wraps around at `u32::MAX`.
pub trait Clock {
    /// Milliseconds since an arbitrary origin.
    fn millis(&self) -> u32;
}

/// Clock backed by [`Instant`], starting at zero when created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock starting now.
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u32 {
        // Truncation gives the same wrap-around as the hardware counter.
        self.origin.elapsed().as_millis() as u32
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        ManualClock::default()
    }

    /// Set the current time.
    pub fn set(&self, millis: u32) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Advance the current time, wrapping like the hardware counter.
    pub fn advance(&self, millis: u32) {
        let now = self.now.load(Ordering::SeqCst);
        self.now.store(now.wrapping_add(millis), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u32 {
        self.now.load(Ordering::SeqCst)
    }
}

/// In-memory serial port.
///
/// Input chunks are queued with [`MemorySerial::inject`]; everything the bridge
/// writes is collected and can be inspected as text or taken line by line.
#[derive(Debug, Default)]
pub struct MemorySerial {
    input: VecDeque<Vec<u8>>,
    output: Vec<u8>,
}

impl MemorySerial {
    /// Create an empty port.
    pub fn new() -> Self {
        MemorySerial::default()
    }

    /// Queue bytes as if the host had sent them.
    pub fn inject(&mut self, data: &[u8]) {
        self.input.push_back(data.to_vec());
    }

    /// Everything written so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Everything written so far, as text.
    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Remove and return all complete (`\r\n`-terminated) lines written so far.
    /// An unterminated tail stays in the buffer.
    pub fn take_lines(&mut self) -> Vec<String> {
        let Some(last_end) = self.output.windows(2).rposition(|w| w == b"\r\n") else {
            return Vec::new();
        };
        let complete: Vec<u8> = self.output.drain(..last_end + 2).collect();
        String::from_utf8_lossy(&complete[..last_end])
            .split("\r\n")
            .map(str::to_string)
            .collect()
    }
}

impl Serial for MemorySerial {
    fn write(&mut self, data: &[u8]) {
        self.output.extend_from_slice(data);
    }

    fn read(&mut self) -> Option<Vec<u8>> {
        self.input.pop_front()
    }
}
