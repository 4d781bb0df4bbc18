//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::{JointPosition, NUM_JOINTS};
use serde::{Deserialize, Serialize};

use crate::transport::SerialParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmExecParams {
    /// Joint angles the arm is held at during power up, clamped into range on use.
    ///
    /// Units: degrees
    pub initial_position_deg: [i32; NUM_JOINTS],

    /// Length of the soft start.
    ///
    /// Units: milliseconds
    pub soft_start_ms: u64,

    /// Time the main loop sleeps between ticks.
    ///
    /// Units: milliseconds
    pub loop_sleep_ms: u64,

    /// If true snapshots are also written to the session archive
    pub archive_snapshots: bool,

    /// Serial port the arm is controlled over
    pub serial: SerialParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmExecParams {
    pub fn initial_position(&self) -> JointPosition {
        JointPosition::from_array(self.initial_position_deg)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
