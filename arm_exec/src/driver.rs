//! # Tick driver
//!
//! [`ArmExec`] owns every part of the arm and runs them in a fixed order on each call to
//! [`ArmExec::tick`]:
//!
//! 1. Soft start gate, nothing else runs until the warm-up is over
//! 2. Line input from the transport
//! 3. Command dispatch, emitting any result line
//! 4. Motion step
//! 5. Telemetry snapshot, taken after the motion step so it reflects this tick's angles

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{eqpt::arm::NUM_JOINTS, tm::Snapshot};
use log::{debug, error, warn};
use util::archive::{ArchiveError, Archiver};
use util::module::State;
use util::session::Session;

use crate::{
    actuator::Actuator,
    cmd_dispatch::CmdDispatcher,
    line_input::LineTokenizer,
    motion_ctrl::{self, MotionCtrl},
    soft_start::{SoftStart, SoftStartStatus},
    transport::Transport,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the snapshot archive inside the session's archive directory.
pub const SNAPSHOT_ARCHIVE: &str = "snapshots.csv";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The arm executive.
pub struct ArmExec<T: Transport, A: Actuator> {
    transport: T,

    input: LineTokenizer,

    dispatcher: CmdDispatcher<A>,

    motion: MotionCtrl<A>,

    soft_start: SoftStart,

    archiver: Option<Archiver>,

    num_ticks: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: Transport, A: Actuator> ArmExec<T, A> {
    pub fn new(
        transport: T,
        motion: MotionCtrl<A>,
        dispatcher: CmdDispatcher<A>,
        soft_start: SoftStart,
    ) -> Self {
        Self {
            transport,
            input: LineTokenizer::new(),
            dispatcher,
            motion,
            soft_start,
            archiver: None,
            num_ticks: 0,
        }
    }

    /// Also write every snapshot into `archiver`.
    pub fn with_archiver(mut self, archiver: Archiver) -> Self {
        self.archiver = Some(archiver);
        self
    }

    /// Run one control tick.
    pub fn tick(&mut self, now_ms: u64) {
        match self.soft_start.poll(now_ms) {
            SoftStartStatus::WarmingUp => return,
            SoftStartStatus::JustCompleted => {
                self.motion.actuator_mut().enable();
                if let Err(e) = self.motion.init(now_ms) {
                    error!("Could not start MotionCtrl: {}", e);
                }
            }
            SoftStartStatus::Complete => (),
        }

        self.num_ticks += 1;

        if let Err(e) = self.input.feed(&mut self.transport) {
            warn!("Could not read a line from the transport: {}", e);
        }

        if let Some(result) = self.dispatcher.proc(&mut self.input, &mut self.motion, now_ms) {
            self.emit(&result.to_line());
        }

        let (snapshot, report) = match self.motion.proc(&motion_ctrl::InputData { now_ms }) {
            Ok(o) => o,
            Err(e) => {
                error!("Error during MotionCtrl processing: {}", e);
                return;
            }
        };

        if report.arrived.iter().any(|&a| a) && !self.motion.is_moving() {
            debug!("Arm at rest at ({})", self.motion.target());
        }

        if let Some(snapshot) = snapshot {
            self.emit(&snapshot.to_line());
            self.archive(&snapshot);
        }
    }

    /// True when no command is running or waiting and the arm is not moving.
    pub fn is_idle(&self) -> bool {
        self.soft_start.is_complete()
            && !self.dispatcher.is_busy()
            && !self.input.available()
            && !self.motion.is_moving()
    }

    /// Number of ticks run since the soft start completed.
    pub fn num_ticks(&self) -> u64 {
        self.num_ticks
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn motion(&self) -> &MotionCtrl<A> {
        &self.motion
    }

    pub fn dispatcher(&self) -> &CmdDispatcher<A> {
        &self.dispatcher
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = self.transport.write_line(line) {
            warn!("Could not write {:?} to the transport: {}", line, e);
        }
    }

    fn archive(&mut self, snapshot: &Snapshot) {
        let result = match self.archiver {
            Some(ref mut arch) => arch.write_record(snapshot_record(snapshot)),
            None => return,
        };

        if let Err(e) = result {
            error!("Snapshot archiving failed, disabling it: {}", e);
            self.archiver = None;
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Column names of the snapshot archive.
pub fn snapshot_header() -> Vec<String> {
    let mut header = vec![String::from("timestamp_ms")];
    for group in ["current_deg", "target_deg", "speed_dps"].iter() {
        for i in 0..NUM_JOINTS {
            header.push(format!("{}_{}", group, i));
        }
    }
    header
}

/// Create the snapshot archive in the session's archive directory.
pub fn snapshot_archiver(session: &Session) -> Result<Archiver, ArchiveError> {
    let header = snapshot_header();
    let header: Vec<&str> = header.iter().map(String::as_str).collect();

    Archiver::from_path(session, SNAPSHOT_ARCHIVE, &header)
}

/// One archive row for a snapshot.
pub fn snapshot_record(snapshot: &Snapshot) -> Vec<String> {
    let mut record = Vec::with_capacity(1 + 3 * NUM_JOINTS);

    record.push(snapshot.timestamp_ms.to_string());
    record.extend(snapshot.current_deg.iter().map(|c| c.to_string()));
    record.extend(snapshot.target.as_array().iter().map(|t| t.to_string()));
    record.extend(snapshot.speed_dps.iter().map(|s| format!("{:.2}", s)));

    record
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::arm::JointPosition;

    #[test]
    fn test_snapshot_record() {
        let snapshot = Snapshot {
            timestamp_ms: 120,
            current_deg: [1, 2, 3, 4, 5, 10],
            target: JointPosition::INITIAL,
            speed_dps: [140.0, 0.0, 0.0, 0.0, 0.0, 12.346],
        };

        let record = snapshot_record(&snapshot);
        let header = snapshot_header();

        assert_eq!(record.len(), header.len());
        assert_eq!(header[0], "timestamp_ms");
        assert_eq!(header[1], "current_deg_0");
        assert_eq!(header[18], "speed_dps_5");
        assert_eq!(record[0], "120");
        assert_eq!(record[7], "90");
        assert_eq!(record[13], "140.00");
        assert_eq!(record[18], "12.35");
    }
}
