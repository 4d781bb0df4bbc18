//! # Arm Equipment Definitions
//!
//! Joint identifiers, the fixed per-joint angle limits and the [`JointPosition`] value type used
//! by both the arm executable and its hosts.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of joints on the arm.
pub const NUM_JOINTS: usize = 6;

/// Minimum angle of each joint, in joint order.
///
/// Units: degrees
pub const MIN_ANGLES_DEG: [i32; NUM_JOINTS] = [0, 15, 0, 0, 0, 10];

/// Maximum angle of each joint, in joint order. The gripper's range encodes its open (10) and
/// closed (73) limits.
///
/// Units: degrees
pub const MAX_ANGLES_DEG: [i32; NUM_JOINTS] = [180, 165, 180, 180, 180, 73];

/// Value returned by [`JointPosition::get_index`] for an index which does not name a joint.
pub const INVALID_ANGLE: i32 = -1;

static ALL_JOINTS: [JointId; NUM_JOINTS] = [
    JointId::Base,
    JointId::Shoulder,
    JointId::Elbow,
    JointId::Wrist,
    JointId::WristRotation,
    JointId::Gripper,
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all joints on the arm, in their fixed wire order.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointId {
    Base,
    Shoulder,
    Elbow,
    Wrist,
    WristRotation,
    Gripper,
}

/// Errors raised when parsing a [`JointPosition`] from a string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionParseError {
    #[error("Expected 6 angles, found {0}")]
    WrongCount(usize),

    #[error("Angle \"{0}\" is not an integer")]
    NotAnInteger(String),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A position of the arm, one integer angle per joint.
///
/// Every angle is always inside its joint's limits, setters clamp out of range values to the
/// nearest limit rather than failing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointPosition {
    angles_deg: [i32; NUM_JOINTS],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointId {
    /// Get all joint IDs in wire order.
    pub fn all() -> &'static [JointId; NUM_JOINTS] {
        &ALL_JOINTS
    }

    /// Get the joint at the given wire index, or `None` if the index is out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        ALL_JOINTS.get(index).copied()
    }

    /// Wire index of this joint.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Minimum angle of this joint in degrees.
    pub fn min_deg(self) -> i32 {
        MIN_ANGLES_DEG[self.index()]
    }

    /// Maximum angle of this joint in degrees.
    pub fn max_deg(self) -> i32 {
        MAX_ANGLES_DEG[self.index()]
    }

    /// Returns true if the angle is inside this joint's limits.
    pub fn in_range(self, angle_deg: i64) -> bool {
        angle_deg >= self.min_deg() as i64 && angle_deg <= self.max_deg() as i64
    }

    /// Lower case name of the joint, used in archive headers.
    pub fn name(self) -> &'static str {
        match self {
            JointId::Base => "base",
            JointId::Shoulder => "shoulder",
            JointId::Elbow => "elbow",
            JointId::Wrist => "wrist",
            JointId::WristRotation => "wrist_rotation",
            JointId::Gripper => "gripper",
        }
    }
}

impl JointPosition {
    /// The position the arm is placed in at power up.
    pub const INITIAL: JointPosition = JointPosition {
        angles_deg: [90, 90, 90, 90, 90, 73],
    };

    /// Create a new position, clamping each angle into its joint's limits.
    pub fn new(
        base: i32,
        shoulder: i32,
        elbow: i32,
        wrist: i32,
        wrist_rotation: i32,
        gripper: i32,
    ) -> Self {
        Self::from_array([base, shoulder, elbow, wrist, wrist_rotation, gripper])
    }

    /// Create a new position from an array of angles in wire order, clamping each angle.
    pub fn from_array(angles_deg: [i32; NUM_JOINTS]) -> Self {
        let mut pos = Self::INITIAL;
        for joint in JointId::all() {
            pos.set(*joint, angles_deg[joint.index()]);
        }
        pos
    }

    /// Set the angle of a joint, clamping it into the joint's limits.
    pub fn set(&mut self, joint: JointId, angle_deg: i32) -> &mut Self {
        self.angles_deg[joint.index()] = angle_deg.clamp(joint.min_deg(), joint.max_deg());
        self
    }

    /// Get the angle of a joint.
    pub fn get(&self, joint: JointId) -> i32 {
        self.angles_deg[joint.index()]
    }

    /// Set the angle of the joint at the given wire index.
    ///
    /// An index which doesn't name a joint leaves the position unchanged.
    pub fn set_index(&mut self, index: usize, angle_deg: i32) -> &mut Self {
        if let Some(joint) = JointId::from_index(index) {
            self.set(joint, angle_deg);
        }
        self
    }

    /// Get the angle of the joint at the given wire index, or [`INVALID_ANGLE`] if the index
    /// doesn't name a joint.
    pub fn get_index(&self, index: usize) -> i32 {
        match JointId::from_index(index) {
            Some(joint) => self.get(joint),
            None => INVALID_ANGLE,
        }
    }

    /// The largest absolute difference between the angles of any joint in the two positions.
    pub fn max_diff(&self, other: &JointPosition) -> i32 {
        self.angles_deg
            .iter()
            .zip(other.angles_deg.iter())
            .map(|(a, b)| (a - b).abs())
            .max()
            .unwrap_or(0)
    }

    /// All angles in wire order.
    pub fn as_array(&self) -> [i32; NUM_JOINTS] {
        self.angles_deg
    }
}

impl Default for JointPosition {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for JointPosition {
    /// Formats the angles as a comma separated list, as used in telemetry lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.angles_deg.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", a)?;
        }
        Ok(())
    }
}

impl FromStr for JointPosition {
    type Err = PositionParseError;

    /// Parse six whitespace separated integer angles, clamping each into its joint's limits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.len() != NUM_JOINTS {
            return Err(PositionParseError::WrongCount(tokens.len()));
        }

        let mut angles_deg = [0; NUM_JOINTS];
        for (angle, token) in angles_deg.iter_mut().zip(tokens) {
            *angle = token
                .parse()
                .map_err(|_| PositionParseError::NotAnInteger(token.to_string()))?;
        }

        Ok(Self::from_array(angles_deg))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
