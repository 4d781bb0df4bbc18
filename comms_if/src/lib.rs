//! # Communications interface crate.
//!
//! Provides all common communications interfaces between the arm and its hosts: the joint data
//! model, the command result lines and the telemetry snapshot lines.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command line limits and command results
pub mod tc;

/// Telemetry snapshot lines
pub mod tm;

/// Equipment definitions (the arm's joints)
pub mod eqpt;
