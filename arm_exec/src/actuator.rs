//! # Actuator interface
//!
//! The motion controller pushes joint angles to an [`Actuator`] on every step and reads them back
//! for telemetry. The servo hardware itself sits behind this trait.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::{JointId, NUM_JOINTS};
use log::{debug, info};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A bank of six positional servos, one per joint.
pub trait Actuator {
    /// Command a joint to the given angle.
    fn write(&mut self, joint: JointId, angle_deg: i32);

    /// Read back the angle a joint is at.
    fn read(&self, joint: JointId) -> i32;

    /// Power the servos, called once the soft start has completed.
    fn enable(&mut self);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated servo bank.
///
/// Reads return the last written angle.
#[derive(Debug, Default, Clone)]
pub struct SimActuator {
    angles_deg: [i32; NUM_JOINTS],

    enabled: bool,

    num_writes: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once [`Actuator::enable`] has been called.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Total number of joint writes made so far.
    pub fn num_writes(&self) -> u64 {
        self.num_writes
    }

    /// All six angles in joint order.
    pub fn angles_deg(&self) -> [i32; NUM_JOINTS] {
        self.angles_deg
    }
}

impl Actuator for SimActuator {
    fn write(&mut self, joint: JointId, angle_deg: i32) {
        self.angles_deg[joint.index()] = angle_deg;
        self.num_writes += 1;
    }

    fn read(&self, joint: JointId) -> i32 {
        self.angles_deg[joint.index()]
    }

    fn enable(&mut self) {
        if !self.enabled {
            info!("Simulated servos enabled");
        } else {
            debug!("Simulated servos already enabled");
        }
        self.enabled = true;
    }
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn write(&mut self, joint: JointId, angle_deg: i32) {
        (**self).write(joint, angle_deg)
    }

    fn read(&self, joint: JointId) -> i32 {
        (**self).read(joint)
    }

    fn enable(&mut self) {
        (**self).enable()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
