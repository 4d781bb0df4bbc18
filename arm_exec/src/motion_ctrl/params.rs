//! Parameters structure for MotionCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::NUM_JOINTS;
use serde::{Deserialize, Serialize};

use super::MotionCtrlError;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for motion control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- TIMING ----
    /// Time between trajectory steps.
    ///
    /// Units: milliseconds
    pub step_period_ms: u64,

    /// Time between telemetry snapshots.
    ///
    /// Units: milliseconds
    pub snapshot_period_ms: u64,

    // ---- CAPABILITIES ----
    /// Maximum speed of each joint. The base, shoulder and elbow carry the rest of the arm so are
    /// slower than the wrist joints and gripper.
    ///
    /// Units: degrees/second
    pub max_speed_dps: [f64; NUM_JOINTS],
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Params {
    /// Check the parameters describe a controller that can run.
    pub fn validate(&self) -> Result<(), MotionCtrlError> {
        if self.step_period_ms == 0 {
            return Err(MotionCtrlError::InvalidStepPeriod);
        }
        if self.snapshot_period_ms == 0 {
            return Err(MotionCtrlError::InvalidSnapshotPeriod);
        }
        for (i, &s) in self.max_speed_dps.iter().enumerate() {
            if !s.is_finite() || s <= 0.0 {
                return Err(MotionCtrlError::InvalidMaxSpeed(i, s));
            }
        }

        Ok(())
    }

    /// The step period in seconds.
    pub fn step_period_s(&self) -> f64 {
        util::time::millis_to_seconds(self.step_period_ms)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            step_period_ms: 10,
            snapshot_period_ms: 100,
            max_speed_dps: [140.0, 140.0, 140.0, 200.0, 200.0, 200.0],
        }
    }
}
