//! In-memory stream and clock for exercising the channel without hardware.
//!
//! # Available Mocks
//!
//! - `ScriptedStream` - records outbound bytes and answers queries from a
//!   FIFO of canned replies
//! - `ManualClock` - deterministic time that only moves when observed or
//!   delayed
//!
//! # Example
//!
//! ```rust
//! use odrive_client::mock::{ManualClock, ScriptedStream};
//! use odrive_client::ODrive;
//!
//! let mut stream = ScriptedStream::new();
//! stream.queue_reply("0.2500");
//! let clock = ManualClock::new();
//!
//! let mut odrive = ODrive::with_clock(&mut stream, &clock);
//! assert_eq!(odrive.get_position(0)?, 0.25);
//! # Ok::<(), odrive_client::ClientError>(())
//! ```

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use odrive_ascii_protocol::{Command, LineCodec, TERMINATOR};

use crate::stream::{Clock, Stream};

// =============================================================================
// ScriptedStream
// =============================================================================

/// A byte stream that records what the host writes and plays back replies.
///
/// Each completed outbound line that expects a reply (`r ...` or `f ...`)
/// pops the next queued reply, if any, onto the inbound side with a `\n`
/// appended. Raw bytes can also be pushed directly.
#[derive(Debug, Default)]
pub struct ScriptedStream {
    inbound: VecDeque<u8>,
    written: Vec<u8>,
    codec: LineCodec,
    lines: Vec<String>,
    replies: VecDeque<String>,
}

impl ScriptedStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream with `bytes` already waiting to be read.
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut stream = Self::new();
        stream.push_input(bytes);
        stream
    }

    /// Make `bytes` available to read.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Queue a reply for the next query the host sends.
    pub fn queue_reply(&mut self, reply: impl Into<String>) {
        self.replies.push_back(reply.into());
    }

    /// Number of queued replies not yet consumed by a query.
    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    /// Number of inbound bytes not yet read.
    pub fn pending_input(&self) -> usize {
        self.inbound.len()
    }

    /// Everything the host has written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Completed outbound lines, without terminators.
    pub fn written_lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of outbound lines exactly equal to `line`.
    pub fn count_lines(&self, line: &str) -> usize {
        self.lines.iter().filter(|l| l.as_str() == line).count()
    }
}

impl Stream for ScriptedStream {
    fn available(&mut self) -> io::Result<usize> {
        Ok(self.inbound.len())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.inbound.pop_front())
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(data);
        self.codec.push(data);

        while let Some(line) = self.codec.decode_line() {
            let wants_reply = Command::parse(&line)
                .map(|cmd| cmd.expects_reply())
                .unwrap_or(false);
            if wants_reply {
                if let Some(reply) = self.replies.pop_front() {
                    self.inbound.extend(reply.as_bytes());
                    self.inbound.push_back(TERMINATOR);
                }
            }
            self.lines.push(line);
        }
        Ok(())
    }
}

// =============================================================================
// ManualClock
// =============================================================================

/// A clock that advances by a fixed step each time it is read.
///
/// Stepping on every read lets a timeout loop terminate without real waiting;
/// `delay` advances time by the requested amount and is tallied separately.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: Cell<u64>,
    step_ms: u64,
    delayed_ms: Cell<u64>,
}

impl ManualClock {
    /// Create a clock at zero that advances 1 ms per read.
    pub fn new() -> Self {
        Self::with_step(1)
    }

    /// Create a clock at zero that advances `step_ms` per read.
    pub fn with_step(step_ms: u64) -> Self {
        ManualClock {
            now_ms: Cell::new(0),
            step_ms,
            delayed_ms: Cell::new(0),
        }
    }

    /// Move time forward without recording a delay.
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    /// Sum of all durations passed to `delay`.
    pub fn total_delay_ms(&self) -> u64 {
        self.delayed_ms.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u64 {
        let now = self.now_ms.get();
        self.now_ms.set(now + self.step_ms);
        now
    }

    fn delay(&self, duration: Duration) {
        let ms = duration.as_millis() as u64;
        self.advance(ms);
        self.delayed_ms.set(self.delayed_ms.get() + ms);
    }
}
