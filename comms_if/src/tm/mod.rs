//! # Telemetry module
//!
//! The arm periodically emits a snapshot line describing where its joints are, where they are
//! going and how fast:
//!
//! ```text
//! OUT <timestamp_ms>:<current x6>:<target x6>:<speed x6>
//! ```
//!
//! Each group is a comma separated list in joint order. Current and target angles are integer
//! degrees, speeds are degrees per second with two decimal places.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;

// Internal
use crate::eqpt::arm::{JointPosition, NUM_JOINTS};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Token which starts every telemetry snapshot line.
pub const SNAPSHOT_PREFIX: &str = "OUT";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A telemetry snapshot of the arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Time at which the snapshot was taken.
    ///
    /// Units: milliseconds since the arm started
    pub timestamp_ms: u64,

    /// Angles read back from the actuators.
    ///
    /// Units: degrees
    pub current_deg: [i32; NUM_JOINTS],

    /// Target position of the current trajectory.
    pub target: JointPosition,

    /// Speed of each joint along the current trajectory, zero once the joint has arrived.
    ///
    /// Units: degrees/second
    pub speed_dps: [f64; NUM_JOINTS],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible parsing errors.
#[derive(Debug, Error, PartialEq)]
pub enum TmParseError {
    #[error("Line does not start with \"OUT \"")]
    NotASnapshot,

    #[error("Expected 4 colon separated fields, found {0}")]
    WrongFieldCount(usize),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Expected 6 values in the {0} group, found {1}")]
    WrongValueCount(&'static str, usize),

    #[error("Invalid value in the {0} group: {1}")]
    InvalidValue(&'static str, String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Snapshot {
    /// Build the full snapshot line (without the line terminator).
    pub fn to_line(&self) -> String {
        let mut line = format!("{} {}:", SNAPSHOT_PREFIX, self.timestamp_ms);

        // Writing into a String cannot fail
        for (i, c) in self.current_deg.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            write!(line, "{}{}", sep, c).ok();
        }
        write!(line, ":{}:", self.target).ok();
        for (i, s) in self.speed_dps.iter().enumerate() {
            let sep = if i == 0 { "" } else { "," };
            write!(line, "{}{:.2}", sep, s).ok();
        }

        line
    }

    /// Parse a snapshot line as emitted by the arm.
    pub fn from_line(line: &str) -> Result<Self, TmParseError> {
        let body = line
            .trim_end()
            .strip_prefix(SNAPSHOT_PREFIX)
            .and_then(|l| l.strip_prefix(' '))
            .ok_or(TmParseError::NotASnapshot)?;

        let fields: Vec<&str> = body.split(':').collect();
        if fields.len() != 4 {
            return Err(TmParseError::WrongFieldCount(fields.len()));
        }

        let timestamp_ms = fields[0]
            .parse()
            .map_err(|_| TmParseError::InvalidTimestamp(fields[0].to_string()))?;

        let current_deg = parse_group::<i32>("current", fields[1])?;
        let target = JointPosition::from_array(parse_group::<i32>("target", fields[2])?);
        let speed_dps = parse_group::<f64>("speed", fields[3])?;

        Ok(Self {
            timestamp_ms,
            current_deg,
            target,
            speed_dps,
        })
    }

    /// Returns true if any joint has a non-zero speed.
    pub fn is_moving(&self) -> bool {
        self.speed_dps.iter().any(|s| *s > 0.0)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse a comma separated group of exactly `NUM_JOINTS` values.
fn parse_group<T>(name: &'static str, group: &str) -> Result<[T; NUM_JOINTS], TmParseError>
where
    T: std::str::FromStr + Default + Copy,
{
    let values: Vec<&str> = group.split(',').collect();
    if values.len() != NUM_JOINTS {
        return Err(TmParseError::WrongValueCount(name, values.len()));
    }

    let mut out = [T::default(); NUM_JOINTS];
    for (o, v) in out.iter_mut().zip(values) {
        *o = v
            .trim()
            .parse()
            .map_err(|_| TmParseError::InvalidValue(name, v.to_string()))?;
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
