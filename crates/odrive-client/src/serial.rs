//! [`Stream`] adapter for a real serial port.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::info;

use crate::error::ClientResult;
use crate::stream::Stream;

/// Per-byte read timeout on the port. The channel checks `available` before
/// reading, so this only bounds a read that races with a flush.
const PORT_TIMEOUT: Duration = Duration::from_millis(10);

/// A serial port carrying the ASCII protocol, 8N1 without flow control.
pub struct SerialStream {
    port: Box<dyn SerialPort>,
}

impl SerialStream {
    /// Open `path` at `baud_rate`.
    pub fn open(path: &str, baud_rate: u32) -> ClientResult<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(PORT_TIMEOUT)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .open()?;

        info!("SerialStream: opened {} at {} baud", path, baud_rate);
        Ok(Self::from_port(port))
    }

    /// Wrap a port the caller already configured.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        SerialStream { port }
    }

    /// Get the underlying port.
    pub fn port(&self) -> &dyn SerialPort {
        self.port.as_ref()
    }

    /// Consume the adapter, returning the port.
    pub fn into_port(self) -> Box<dyn SerialPort> {
        self.port
    }
}

/// Open a serial port for the command channel.
pub fn open_serial(path: &str, baud_rate: u32) -> ClientResult<SerialStream> {
    SerialStream::open(path, baud_rate)
}

impl Stream for SerialStream {
    fn available(&mut self) -> io::Result<usize> {
        let pending = self.port.bytes_to_read().map_err(io::Error::from)?;
        Ok(pending as usize)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }
}
