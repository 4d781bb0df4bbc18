//! # Telecommand module
//!
//! Telecommands are sent to the arm as newline terminated text lines of whitespace separated
//! tokens, the first token naming the command. Every command produces exactly one result line,
//! made of [`RESULT_PREFIX`] followed by the payload of a [`CmdResult`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Size of the arm's line input buffer. One byte is reserved, so a command line may contain at
/// most `MAX_LINE_LEN - 1` bytes before it is truncated.
pub const MAX_LINE_LEN: usize = 64;

/// Maximum number of tokens in a command line, including the command name. Further tokens are
/// dropped.
pub const MAX_ARGS: usize = 8;

/// Token which starts every command result line.
pub const RESULT_PREFIX: &str = "RET";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The terminal result of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmdResult {
    /// The command completed successfully
    Ok,

    /// The command's arguments could not be parsed or were out of range
    Error,

    /// No command with the given name exists
    InvalidCommand,

    /// A command specific payload
    Custom(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdResult {
    /// The payload string sent on the wire for this result.
    pub fn payload(&self) -> &str {
        match self {
            CmdResult::Ok => "ok",
            CmdResult::Error => "error",
            CmdResult::InvalidCommand => "invalid-command",
            CmdResult::Custom(s) => s.as_str(),
        }
    }

    /// Build the full result line (without the line terminator).
    pub fn to_line(&self) -> String {
        format!("{} {}", RESULT_PREFIX, self.payload())
    }

    /// Parse a result line as emitted by the arm.
    ///
    /// Returns `None` if the line is not a result line.
    pub fn from_line(line: &str) -> Option<Self> {
        let payload = line.trim_end().strip_prefix(RESULT_PREFIX)?.strip_prefix(' ')?;

        Some(match payload {
            "ok" => CmdResult::Ok,
            "error" => CmdResult::Error,
            "invalid-command" => CmdResult::InvalidCommand,
            p => CmdResult::Custom(p.to_string()),
        })
    }
}

impl fmt::Display for CmdResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
