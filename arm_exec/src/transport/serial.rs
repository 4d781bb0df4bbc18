//! Serial port transport

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

use super::{LineBuffer, Transport, TransportError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of bytes pulled from the port per poll.
const READ_CHUNK_LEN: usize = 256;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Serial port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialParams {
    /// Path or name of the port, for example `/dev/ttyACM0`
    pub port: String,

    /// Line speed
    ///
    /// Units: bits/second
    pub baud_rate: u32,

    /// Read and write timeout
    ///
    /// Units: milliseconds
    pub timeout_ms: u64,
}

/// Transport over a serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,

    inbound: LineBuffer,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SerialTransport {
    /// Open the port described by the parameters.
    pub fn open(params: &SerialParams) -> Result<Self, TransportError> {
        let port = serialport::new(&params.port, params.baud_rate)
            .timeout(Duration::from_millis(params.timeout_ms))
            .open()?;

        info!(
            "Opened serial port {} at {} baud",
            params.port, params.baud_rate
        );

        Ok(Self {
            port,
            inbound: LineBuffer::default(),
        })
    }

    /// Move whatever the port has buffered into the line buffer.
    fn poll_port(&mut self) -> Result<(), TransportError> {
        let waiting = self.port.bytes_to_read()? as usize;

        if waiting == 0 {
            return Ok(());
        }

        let mut chunk = [0u8; READ_CHUNK_LEN];
        let len = waiting.min(READ_CHUNK_LEN);
        let num_read = self.port.read(&mut chunk[..len])?;

        self.inbound.push_bytes(&chunk[..num_read]);

        Ok(())
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> bool {
        if let Err(e) = self.poll_port() {
            warn!("Could not read from the serial port: {}", e);
        }

        self.inbound.has_line()
    }

    fn read_line_into(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.inbound.pop_line_into(buf)
    }

    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        debug!("Serial tx: {}", line);
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(b"\n")?;
        self.port.flush()?;
        Ok(())
    }
}
