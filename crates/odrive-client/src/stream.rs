//! Byte-stream and clock abstractions the command channel runs on.
//!
//! The channel never opens or closes the stream. It only needs to know
//! whether a byte is waiting, read one byte at a time so that nothing past a
//! line terminator is consumed, and write raw bytes.

use std::io;
use std::time::{Duration, Instant};

/// A duplex byte stream, such as a serial port.
pub trait Stream {
    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> io::Result<usize>;

    /// Read a single byte, or `None` if nothing arrived.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write all of `data` to the stream.
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()>;
}

impl<S: Stream + ?Sized> Stream for &mut S {
    fn available(&mut self) -> io::Result<usize> {
        (**self).available()
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_bytes(data)
    }
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn available(&mut self) -> io::Result<usize> {
        (**self).available()
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_bytes(data)
    }
}

/// Monotonic time source used for read timeouts and poll delays.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn millis(&self) -> u64;

    /// Block for `duration`.
    fn delay(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn millis(&self) -> u64 {
        (**self).millis()
    }

    fn delay(&self, duration: Duration) {
        (**self).delay(duration)
    }
}

/// Wall-clock implementation backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let before = clock.millis();
        clock.delay(Duration::from_millis(5));
        let after = clock.millis();
        assert!(after >= before + 5);
    }
}
