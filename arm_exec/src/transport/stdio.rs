//! Standard input/output transport

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use super::{LineBuffer, Transport, TransportError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Transport reading commands from stdin and writing results to stdout.
///
/// Stdin is read on a background thread so polling never blocks the tick loop.
pub struct StdioTransport {
    rx: Receiver<String>,

    inbound: LineBuffer,

    closed: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StdioTransport {
    pub fn new() -> Result<Self, TransportError> {
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(l) => {
                            if tx.send(l).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Could not read from stdin: {}", e);
                            break;
                        }
                    }
                }
            })?;

        Ok(Self {
            rx,
            inbound: LineBuffer::default(),
            closed: false,
        })
    }

    /// True once stdin has closed and every line has been read.
    pub fn is_closed(&self) -> bool {
        self.closed && !self.inbound.has_line()
    }
}

impl Transport for StdioTransport {
    fn bytes_available(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(line) => self.inbound.push_line(&line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        info!("Stdin closed");
                    }
                    self.closed = true;
                    break;
                }
            }
        }

        self.inbound.has_line()
    }

    fn read_line_into(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.inbound.pop_line_into(buf)
    }

    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", line)?;
        handle.flush()?;
        Ok(())
    }
}
