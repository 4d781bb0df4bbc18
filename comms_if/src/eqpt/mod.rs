//! # Equipment Interface
//!
//! This module defines the interface structures which describe the equipment driven by the arm
//! executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Joint identifiers, limits and positions of the arm
pub mod arm;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use arm::{JointId, JointPosition, NUM_JOINTS};
