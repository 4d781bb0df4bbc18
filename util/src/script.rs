//! # Command script interpreter
//!
//! Scripts are plain text files containing timed command lines, which allow the arm to be driven
//! without a host attached. Each entry has the form:
//!
//! ```text
//! <seconds>: <command line>;
//! ```
//!
//! for example `1.5: moveto 90 45 90 90 90 73;`. Entries must be in ascending time order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command line which is scripted to occur at a specific time.
#[derive(Debug, Clone, PartialEq)]
struct ScriptedLine {
    /// The time the line is supposed to be sent at
    exec_time_s: f64,

    /// The command line to send
    line: String,
}

/// A script interpreter.
///
/// After initialising with the script to run use `.pending_lines` to acquire the command lines
/// that are due.
#[derive(Debug)]
pub struct ScriptInterpreter {
    lines: VecDeque<ScriptedLine>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Could not build the script pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Script entry at {0} s comes before the previous entry at {1} s")]
    OutOfOrder(f64, f64),
}

/// The result of querying the interpreter for due lines.
#[derive(Debug, PartialEq)]
pub enum PendingLines {
    None,
    Some(Vec<String>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let script = fs::read_to_string(script_path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_str(&script)
    }

    /// Create a new interpreter from the contents of a script.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        let mut lines: VecDeque<ScriptedLine> = VecDeque::new();

        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()?;

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map_or("", |m| m.as_str());
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}: {}", time_str, e)))?;

            if let Some(prev) = lines.back() {
                if exec_time_s < prev.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s, prev.exec_time_s));
                }
            }

            let line = cap.get(3).map_or("", |m| m.as_str()).trim().to_string();

            lines.push_back(ScriptedLine { exec_time_s, line });
        }

        if lines.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter { lines })
    }

    /// Return the lines which are due at the given elapsed time.
    ///
    /// Once every line has been returned `PendingLines::EndOfScript` is reported.
    pub fn pending_lines(&mut self, elapsed_s: f64) -> PendingLines {
        if self.lines.is_empty() {
            return PendingLines::EndOfScript;
        }

        let mut due = Vec::new();

        while let Some(front) = self.lines.front() {
            if front.exec_time_s > elapsed_s {
                break;
            }
            if let Some(l) = self.lines.pop_front() {
                due.push(l.line);
            }
        }

        if due.is_empty() {
            PendingLines::None
        } else {
            PendingLines::Some(due)
        }
    }

    /// Get the number of lines remaining in the script
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Get the time of the last line in the script, in seconds
    pub fn duration_s(&self) -> f64 {
        self.lines.back().map_or(0.0, |l| l.exec_time_s)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
