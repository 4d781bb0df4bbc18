//! Scripted transport, replays a timed command script

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::CmdResult;
use log::{debug, info};
use util::{
    script::{PendingLines, ScriptInterpreter},
    time,
};

use super::{LineBuffer, Transport, TransportError};
use crate::clock::Clock;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Transport which feeds the lines of a [`ScriptInterpreter`] as they fall due.
///
/// Script times are measured from the clock's epoch. Outbound lines are logged, and only the
/// command results among them are kept, so the store is bounded by the length of the script.
pub struct ScriptTransport<C: Clock> {
    interpreter: ScriptInterpreter,

    clock: C,

    inbound: LineBuffer,

    results: Vec<CmdResult>,

    num_written: usize,

    end_of_script: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<C: Clock> ScriptTransport<C> {
    pub fn new(interpreter: ScriptInterpreter, clock: C) -> Self {
        Self {
            interpreter,
            clock,
            inbound: LineBuffer::default(),
            results: Vec::new(),
            num_written: 0,
            end_of_script: false,
        }
    }

    /// True once every scripted line has been read.
    pub fn is_finished(&self) -> bool {
        self.end_of_script && !self.inbound.has_line()
    }

    /// Command results written so far.
    pub fn results(&self) -> &[CmdResult] {
        &self.results
    }

    /// Number of lines written so far, results and snapshots alike.
    pub fn num_written(&self) -> usize {
        self.num_written
    }

    fn poll_script(&mut self) {
        if self.end_of_script {
            return;
        }

        let elapsed_s = time::millis_to_seconds(self.clock.now_ms());

        match self.interpreter.pending_lines(elapsed_s) {
            PendingLines::None => (),
            PendingLines::Some(lines) => {
                for line in lines {
                    debug!("Script line due at {:.3} s: {}", elapsed_s, line);
                    self.inbound.push_line(&line);
                }
            }
            PendingLines::EndOfScript => {
                info!("End of script reached");
                self.end_of_script = true;
            }
        }
    }
}

impl<C: Clock> Transport for ScriptTransport<C> {
    fn bytes_available(&mut self) -> bool {
        self.poll_script();
        self.inbound.has_line()
    }

    fn read_line_into(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.inbound.pop_line_into(buf)
    }

    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        info!("{}", line);
        self.num_written += 1;
        if let Some(result) = CmdResult::from_line(line) {
            self.results.push(result);
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
