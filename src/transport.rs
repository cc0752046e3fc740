//! Byte transports feeding the frame reader
//!
//! [`SerialLink`] opens a UART at 8N1 with no flow control. [`ReaderSource`]
//! replays any `Read` (a captured log, stdin, a test cursor).

use crate::error::{Result, StreamError};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Default serial device
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default link speed
pub const DEFAULT_BAUD_RATE: u32 = 230_400;

/// Source of raw bytes in arbitrary chunks
pub trait ByteSource {
    /// Read whatever is available into `buffer`
    ///
    /// Returns `Some(0)` when nothing arrived within the poll timeout and
    /// `None` once the stream has ended for good.
    fn read_chunk(&mut self, buffer: &mut [u8]) -> Result<Option<usize>>;

    /// Read a single byte, `None` at end of stream or on an empty poll
    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read_chunk(&mut byte)? {
            Some(1) => Ok(Some(byte[0])),
            _ => Ok(None),
        }
    }
}

/// Serial port settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path (e.g. "/dev/ttyUSB0", "COM3")
    pub path: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read poll timeout
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Open serial link, readable as a [`ByteSource`] and writable for producers
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open and configure the port in one step
    ///
    /// # Errors
    /// * `StreamError::InvalidParameter` - baud rate of zero
    /// * `StreamError::TransportUnavailable` - the port cannot be opened or
    ///   configured
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if config.baud_rate == 0 {
            return Err(StreamError::InvalidParameter(
                "Baud rate must be non-zero".to_string(),
            ));
        }

        let port = serialport::new(&config.path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout)
            .open()
            .map_err(|source| StreamError::TransportUnavailable {
                path: config.path.clone(),
                source,
            })?;

        log::info!("Opened serial port: {} at {} baud", config.path, config.baud_rate);

        Ok(Self { port })
    }

    /// Discard anything already sitting in the input buffer
    pub fn clear_input(&mut self) -> Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| StreamError::Io(e.into()))
    }
}

impl ByteSource for SerialLink {
    fn read_chunk(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        match self.port.read(buffer) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Some(0)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Some(0)),
            Err(e) => Err(e.into()),
        }
    }
}

impl Write for SerialLink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.port.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

/// Replays a reader as a byte stream; EOF ends the stream
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_chunk(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        if buffer.is_empty() {
            return Ok(Some(0));
        }
        loop {
            match self.inner.read(buffer) {
                Ok(0) => return Ok(None),
                Ok(n) => return Ok(Some(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
