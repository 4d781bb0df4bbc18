//! # Line transports
//!
//! A [`Transport`] is the channel command lines arrive on and result and telemetry lines leave
//! by. All transports are non-blocking: the driver polls [`Transport::bytes_available`] every
//! tick and only reads when a complete line is waiting.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod mem;
mod script;
mod serial;
mod stdio;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::MAX_LINE_LEN;
use std::collections::VecDeque;

pub use mem::MemTransport;
pub use script::ScriptTransport;
pub use serial::{SerialParams, SerialTransport};
pub use stdio::StdioTransport;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A line oriented, non-blocking text channel.
pub trait Transport {
    /// True if a complete inbound line is waiting to be read.
    fn bytes_available(&mut self) -> bool;

    /// Read the next inbound line into `buf`, without its terminator.
    ///
    /// At most `buf.len()` bytes are copied. The rest of an overlong line is discarded up to and
    /// including its newline. Returns the number of bytes copied.
    fn read_line_into(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Send a line, the terminator is added by the transport.
    fn write_line(&mut self, line: &str) -> Result<(), TransportError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("No complete line is available")]
    NoLine,

    #[error("I/O error on the transport: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Inbound byte queue shared by the transports, splitting the byte stream into lines.
///
/// At most `MAX_LINE_LEN - 1` bytes of each line are stored, the rest of the line up to its
/// newline is discarded as it arrives.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    bytes: VecDeque<u8>,

    num_lines: usize,

    /// Bytes stored for the line currently being received
    partial_len: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LineBuffer {
    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if b == b'\n' {
                self.bytes.push_back(b);
                self.num_lines += 1;
                self.partial_len = 0;
            } else if self.partial_len < MAX_LINE_LEN - 1 {
                self.bytes.push_back(b);
                self.partial_len += 1;
            }
        }
    }

    /// Push a whole line, appending the terminator.
    pub(crate) fn push_line(&mut self, line: &str) {
        self.push_bytes(line.as_bytes());
        self.push_bytes(b"\n");
    }

    pub(crate) fn has_line(&self) -> bool {
        self.num_lines > 0
    }

    pub(crate) fn pop_line_into(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if !self.has_line() {
            return Err(TransportError::NoLine);
        }

        let mut len = 0;

        while let Some(b) = self.bytes.pop_front() {
            if b == b'\n' {
                break;
            }
            if len < buf.len() {
                buf[len] = b;
                len += 1;
            }
        }

        self.num_lines -= 1;

        Ok(len)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> bool {
        (**self).bytes_available()
    }

    fn read_line_into(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read_line_into(buf)
    }

    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        (**self).write_line(line)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
