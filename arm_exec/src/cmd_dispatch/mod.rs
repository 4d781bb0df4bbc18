//! # Command dispatcher
//!
//! Runs one command at a time against the motion controller. Each command has two phases:
//! [`CmdHandler::begin`] validates the arguments and either finishes straight away or starts
//! something that takes time, in which case [`CmdHandler::poll`] is called on every following
//! tick until it produces a result. While a command is pending the dispatcher is busy and leaves
//! new input lines unconsumed.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod cmds;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::CmdResult;
use log::{debug, trace, warn};

use crate::{
    actuator::Actuator,
    line_input::{LineTokenizer, TokenizedLine},
    motion_ctrl::MotionCtrl,
};

pub use cmds::*;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A named command.
pub trait CmdHandler<A: Actuator> {
    /// The name the command is invoked by, matched exactly.
    fn name(&self) -> &'static str;

    /// Validate the arguments and start the command.
    ///
    /// `args` includes the command name as token 0.
    fn begin(&mut self, args: &TokenizedLine, ctrl: &mut MotionCtrl<A>, now_ms: u64) -> Begin;

    /// Check on a pending command, returning `None` while it is still in progress.
    fn poll(
        &mut self,
        args: &TokenizedLine,
        ctrl: &mut MotionCtrl<A>,
        now_ms: u64,
    ) -> Option<CmdResult>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Outcome of starting a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Begin {
    /// The command finished with this result.
    Done(CmdResult),

    /// The command is in progress, poll it on later ticks.
    Pending,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Looks up and runs commands from the input line.
pub struct CmdDispatcher<A: Actuator> {
    cmds: Vec<Box<dyn CmdHandler<A>>>,

    /// Dispatcher owned copy of the line being executed
    line: TokenizedLine,

    /// Index of the pending command in `cmds`
    busy: Option<usize>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<A: Actuator + 'static> CmdDispatcher<A> {
    /// Create a dispatcher with the built-in command set.
    pub fn with_builtin_cmds() -> Self {
        Self::new(builtin_cmds())
    }
}

impl<A: Actuator> CmdDispatcher<A> {
    /// Create a dispatcher from an explicit command table.
    ///
    /// Lookup scans the table in order and the first command with a matching name wins.
    pub fn new(cmds: Vec<Box<dyn CmdHandler<A>>>) -> Self {
        Self {
            cmds,
            line: TokenizedLine::new(),
            busy: None,
        }
    }

    /// Run one tick of the dispatcher.
    ///
    /// Returns the result to emit, if any was produced this tick.
    pub fn proc(
        &mut self,
        input: &mut LineTokenizer,
        ctrl: &mut MotionCtrl<A>,
        now_ms: u64,
    ) -> Option<CmdResult> {
        // A pending command blocks everything else until it finishes
        if let Some(idx) = self.busy {
            let result = self.cmds[idx].poll(&self.line, ctrl, now_ms);

            if let Some(ref r) = result {
                debug!("{} finished: {}", self.cmds[idx].name(), r);
                self.busy = None;
            }

            return result;
        }

        if !input.available() {
            return None;
        }

        // Take our own copy and release the input for the next line
        input.copy_into(&mut self.line);
        input.consume();

        if self.line.argument_count() == 0 {
            trace!("Ignoring blank line");
            return None;
        }

        let name = self.line.argument(0);
        let idx = match name.and_then(|n| self.cmds.iter().position(|c| c.name() == n)) {
            Some(i) => i,
            None => {
                warn!(
                    "Invalid command: {:?}",
                    String::from_utf8_lossy(self.line.as_bytes())
                );
                return Some(CmdResult::InvalidCommand);
            }
        };

        debug!(
            "Dispatching {:?}",
            String::from_utf8_lossy(self.line.as_bytes())
        );

        match self.cmds[idx].begin(&self.line, ctrl, now_ms) {
            Begin::Done(r) => {
                debug!("{} finished: {}", self.cmds[idx].name(), r);
                Some(r)
            }
            Begin::Pending => {
                debug!("{} pending", self.cmds[idx].name());
                self.busy = Some(idx);
                None
            }
        }
    }

    /// True while a command is pending.
    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    /// Name of the pending command, if any.
    pub fn busy_cmd(&self) -> Option<&'static str> {
        self.busy.map(|i| self.cmds[i].name())
    }

    /// Names of the registered commands, in lookup order.
    pub fn cmd_names(&self) -> Vec<&'static str> {
        self.cmds.iter().map(|c| c.name()).collect()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
