//! # Motion control module
//!
//! Moves the six joints from their current angles to a target along constant speed segments.
//! Speeds are chosen so that every joint starts and finishes together, with the slowest joint
//! setting the pace.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Distance within which a joint is considered to have arrived at its target.
///
/// Units: degrees
pub const ARRIVAL_TOLERANCE_DEG: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during MotionCtrl initialisation and processing.
#[derive(Debug, thiserror::Error)]
pub enum MotionCtrlError {
    #[error("The step period must be greater than zero")]
    InvalidStepPeriod,

    #[error("The snapshot period must be greater than zero")]
    InvalidSnapshotPeriod,

    #[error("The maximum speed of joint {0} must be a positive finite number, found {1}")]
    InvalidMaxSpeed(usize, f64),

    #[error("MotionCtrl was processed before being initialised")]
    NotInitialised,
}
