//! Line-based codec for the serial link.
//!
//! Inbound (host → bridge) text is accumulated until a `\n` is seen; the line is
//! then trimmed and handed out. Outbound (bridge → host) lines are tagged with
//! `[log]` or `[tx]` and terminated with `\r\n`, unless the caller leaves the
//! line open so several writes compose one logical line.

use bytes::BytesMut;

use crate::constants::{DATA_PREFIX, HEARTBEAT_LINE, LINE_ENDING, LOG_PREFIX, MAX_LINE_LENGTH};
use crate::error::{ProtocolError, ProtocolResult};

/// Tag placed in front of a bridge → host line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Diagnostic text (`[log]`).
    Log,
    /// Relayed radio data (`[tx]`).
    Data,
}

impl Tag {
    /// Get the tag text.
    pub fn prefix(&self) -> &'static str {
        match self {
            Tag::Log => LOG_PREFIX,
            Tag::Data => DATA_PREFIX,
        }
    }
}

/// Whether an encoded line is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnd {
    /// Append `\r\n`.
    #[default]
    Terminated,
    /// Leave the line open for further writes.
    Open,
}

/// A codec for reading host lines and writing bridge lines.
#[derive(Debug)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
    /// Set after an overlong line until its terminator has been skipped.
    discarding: bool,
    /// Maximum line length accepted.
    max_line: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        LineCodec::new()
    }
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec::with_max_line(MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_line(max_line: usize) -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(max_line + 2),
            discarding: false,
            max_line,
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        let mut data = data;
        if self.discarding {
            match data.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    self.discarding = false;
                    data = &data[end + 1..];
                }
                None => return,
            }
        }
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode a complete line from the buffer.
    ///
    /// Returns `None` when more data is needed. The limit applies to the line
    /// content; a `\r` before the `\n` does not count. A line longer than the
    /// limit yields [`ProtocolError::LineTooLong`] once, and the rest of it is
    /// dropped up to its terminator.
    ///
    /// Lines that are empty after trimming are skipped rather than handed out:
    /// a CR LF host sends `\r\n` pairs and stray terminators are not commands.
    pub fn decode_line(&mut self) -> Option<ProtocolResult<String>> {
        loop {
            match self.buffer.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    let line = self.buffer.split_to(end + 1);
                    let content = if end > 0 && line[end - 1] == b'\r' { end - 1 } else { end };
                    if content > self.max_line {
                        return Some(Err(ProtocolError::LineTooLong {
                            max: self.max_line,
                            actual: content,
                        }));
                    }

                    let text = String::from_utf8_lossy(&line[..content]).trim().to_string();
                    if text.is_empty() {
                        continue;
                    }
                    return Some(Ok(text));
                }
                None => {
                    // A trailing `\r` may still be followed by its `\n`.
                    let pending = match self.buffer.last() {
                        Some(b'\r') => self.buffer.len() - 1,
                        _ => self.buffer.len(),
                    };
                    if pending > self.max_line {
                        let actual = pending;
                        log::debug!("discarding unterminated line of {} bytes", actual);
                        self.buffer.clear();
                        self.discarding = true;
                        return Some(Err(ProtocolError::LineTooLong {
                            max: self.max_line,
                            actual,
                        }));
                    }
                    return None;
                }
            }
        }
    }

    /// Encode a tagged bridge → host line.
    pub fn encode_tagged(tag: Tag, text: &str, end: LineEnd) -> Vec<u8> {
        let mut buf = Vec::with_capacity(tag.prefix().len() + text.len() + LINE_ENDING.len());
        buf.extend_from_slice(tag.prefix().as_bytes());
        buf.extend_from_slice(text.as_bytes());
        if end == LineEnd::Terminated {
            buf.extend_from_slice(LINE_ENDING.as_bytes());
        }
        buf
    }

    /// Encode an untagged, terminated line.
    pub fn encode_raw_line(text: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(text.len() + LINE_ENDING.len());
        buf.extend_from_slice(text.as_bytes());
        buf.extend_from_slice(LINE_ENDING.as_bytes());
        buf
    }

    /// Encode the heartbeat line.
    pub fn encode_heartbeat() -> Vec<u8> {
        Self::encode_raw_line(HEARTBEAT_LINE)
    }

    /// Encode a host → bridge line (used by hosts and test harnesses).
    pub fn encode_host_line(line: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}
