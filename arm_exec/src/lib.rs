//! # Arm library.
//!
//! This library contains the control core of the arm executable, allowing other crates in the
//! workspace (and the integration tests) to drive the arm without the executable's wiring.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator interface - writes and reads back joint angles
pub mod actuator;

/// Clock interface - provides monotonic time in milliseconds
pub mod clock;

/// Command dispatcher - runs named commands against the motion controller
pub mod cmd_dispatch;

/// Tick driver - wires the transport, dispatcher and motion controller together
pub mod driver;

/// Line input - splits inbound command lines into tokens
pub mod line_input;

/// Motion control module - moves the joints along synchronised constant speed trajectories
pub mod motion_ctrl;

/// Executable parameters
pub mod params;

/// Power-up sequencing
pub mod soft_start;

/// Line transports - the channels command lines arrive on and results leave by
pub mod transport;
