//! Implementations for the MotionCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::{Deserialize, Serialize};

// Internal
use super::{MotionCtrlError, Params, ARRIVAL_TOLERANCE_DEG};
use crate::actuator::Actuator;
use comms_if::{
    eqpt::arm::{JointId, JointPosition, NUM_JOINTS},
    tm::Snapshot,
};
use util::module::State;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Motion control module state
pub struct MotionCtrl<A: Actuator> {
    params: Params,

    actuator: A,

    /// Current joint angles, fractional so that small steps accumulate.
    ///
    /// Units: degrees
    current_deg: [f64; NUM_JOINTS],

    target: JointPosition,

    /// Speed of each joint along the current trajectory, zero once the joint has arrived.
    ///
    /// Units: degrees/second
    speed_dps: [f64; NUM_JOINTS],

    frozen: bool,

    initialised: bool,

    report: StatusReport,

    next_tick_ms: u64,

    next_snapshot_ms: u64,
}

/// Input data to MotionCtrl.
#[derive(Clone, Copy, Default, Debug)]
pub struct InputData {
    /// Time of this cycle.
    ///
    /// Units: milliseconds
    pub now_ms: u64,
}

/// Status report for MotionCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusReport {
    /// True if a step was due and taken on this cycle, including while frozen.
    pub stepped: bool,

    /// Joints which reached their target on this cycle.
    pub arrived: [bool; NUM_JOINTS],
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl<A: Actuator> State for MotionCtrl<A> {
    type InitData = u64;
    type InitError = MotionCtrlError;

    type InputData = InputData;
    type OutputData = Option<Snapshot>;
    type StatusReport = StatusReport;
    type ProcError = MotionCtrlError;

    /// Start the step and snapshot schedules.
    ///
    /// Expected init data is the start time in milliseconds.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.params.validate()?;

        self.next_tick_ms = init_data;
        self.next_snapshot_ms = init_data;
        self.initialised = true;

        debug!("MotionCtrl started at {} ms", init_data);

        Ok(())
    }

    /// Take the step due on this cycle and produce the snapshot if one is due.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.initialised {
            return Err(MotionCtrlError::NotInitialised);
        }

        // Clear the status report
        self.report = StatusReport::default();

        self.tick(input_data.now_ms);

        Ok((self.snapshot(input_data.now_ms), self.report))
    }
}

impl<A: Actuator> MotionCtrl<A> {
    /// Create a new controller resting at `initial`, which is written to the actuator.
    pub fn new(params: Params, mut actuator: A, initial: JointPosition) -> Result<Self, MotionCtrlError> {
        params.validate()?;

        let mut current_deg = [0.0; NUM_JOINTS];
        for &joint in JointId::all() {
            current_deg[joint.index()] = initial.get(joint) as f64;
            actuator.write(joint, initial.get(joint));
        }

        Ok(Self {
            params,
            actuator,
            current_deg,
            target: initial,
            speed_dps: [0.0; NUM_JOINTS],
            frozen: false,
            initialised: false,
            report: StatusReport::default(),
            next_tick_ms: 0,
            next_snapshot_ms: 0,
        })
    }

    /// Compute how long a move to `target` takes.
    ///
    /// Each joint's time is the fastest its speed limit allows, unless `min_duration_s` is
    /// positive and achievable by that joint, in which case `min_duration_s` is used. The move
    /// lasts as long as the slowest joint.
    pub fn move_duration(&self, target: &JointPosition, min_duration_s: f64) -> f64 {
        let mut duration_s: f64 = 0.0;

        for &joint in JointId::all() {
            let i = joint.index();
            let displacement = (target.get(joint) as f64 - self.current_deg[i]).abs();
            let max_speed = self.params.max_speed_dps[i];

            if displacement <= ARRIVAL_TOLERANCE_DEG {
                continue;
            }

            let joint_s = if min_duration_s > 0.0 && displacement / min_duration_s <= max_speed {
                min_duration_s
            } else {
                displacement / max_speed
            };

            duration_s = duration_s.max(joint_s);
        }

        duration_s
    }

    /// Start a new trajectory towards `target`, replacing any trajectory in progress.
    ///
    /// Returns the duration of the trajectory in seconds.
    pub fn move_to(&mut self, target: JointPosition, min_duration_s: f64) -> f64 {
        let duration_s = self.move_duration(&target, min_duration_s);

        for &joint in JointId::all() {
            let i = joint.index();
            let target_deg = target.get(joint) as f64;
            let displacement = (target_deg - self.current_deg[i]).abs();

            // Residual float error from a superseded trajectory counts as already there
            if displacement <= ARRIVAL_TOLERANCE_DEG {
                self.current_deg[i] = target_deg;
            }

            self.speed_dps[i] = if displacement <= ARRIVAL_TOLERANCE_DEG || duration_s <= 0.0 {
                0.0
            } else {
                displacement / duration_s
            };
        }

        self.target = target;

        debug!(
            "New trajectory to ({}) lasting {:.3} s, speeds {:.2?} deg/s",
            target, duration_s, self.speed_dps
        );

        duration_s
    }

    /// Advance the trajectory by one step if a step is due.
    ///
    /// At most one step is taken per call, after which the next step is scheduled one step
    /// period later. Returns `true` if the joints were moved.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_tick_ms {
            return false;
        }

        self.next_tick_ms += self.params.step_period_ms;
        self.report.stepped = true;

        if self.frozen {
            return false;
        }

        let step_period_s = self.params.step_period_s();

        for &joint in JointId::all() {
            let i = joint.index();

            if self.speed_dps[i] <= 0.0 {
                continue;
            }

            let target_deg = self.target.get(joint) as f64;
            let remaining = target_deg - self.current_deg[i];
            let step = self.speed_dps[i] * step_period_s;

            if remaining.abs() <= step + ARRIVAL_TOLERANCE_DEG {
                self.current_deg[i] = target_deg;
                self.speed_dps[i] = 0.0;
                self.report.arrived[i] = true;
                trace!("{} arrived at {} deg", joint.name(), target_deg);
            } else {
                self.current_deg[i] += step.copysign(remaining);
            }
        }

        for &joint in JointId::all() {
            self.actuator
                .write(joint, self.current_deg[joint.index()].trunc() as i32);
        }

        true
    }

    /// Freeze or unfreeze motion. The trajectory is kept while frozen.
    pub fn set_frozen(&mut self, frozen: bool) {
        if frozen != self.frozen {
            debug!("Motion {}", if frozen { "frozen" } else { "resumed" });
        }
        self.frozen = frozen;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// True while any joint has an unfinished trajectory, frozen or not.
    pub fn is_moving(&self) -> bool {
        self.speed_dps.iter().any(|&s| s > 0.0)
    }

    /// Stop in place, the target becomes the current (truncated) position.
    pub fn halt(&mut self) {
        let mut stopped = JointPosition::default();

        for &joint in JointId::all() {
            let i = joint.index();
            stopped.set(joint, self.current_deg[i].trunc() as i32);
            self.current_deg[i] = stopped.get(joint) as f64;
            self.speed_dps[i] = 0.0;
        }

        self.target = stopped;

        debug!("Halted at ({})", stopped);
    }

    /// Produce a telemetry snapshot if one is due.
    ///
    /// Current angles are read back from the actuator.
    pub fn snapshot(&mut self, now_ms: u64) -> Option<Snapshot> {
        if now_ms < self.next_snapshot_ms {
            return None;
        }

        self.next_snapshot_ms += self.params.snapshot_period_ms;

        let mut current_deg = [0; NUM_JOINTS];
        for &joint in JointId::all() {
            current_deg[joint.index()] = self.actuator.read(joint);
        }

        Some(Snapshot {
            timestamp_ms: now_ms,
            current_deg,
            target: self.target,
            speed_dps: self.speed_dps,
        })
    }

    pub fn current_deg(&self) -> [f64; NUM_JOINTS] {
        self.current_deg
    }

    pub fn target(&self) -> JointPosition {
        self.target
    }

    pub fn speed_dps(&self) -> [f64; NUM_JOINTS] {
        self.speed_dps
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::actuator::SimActuator;

    fn ctrl() -> MotionCtrl<SimActuator> {
        let mut c =
            MotionCtrl::new(Params::default(), SimActuator::new(), JointPosition::INITIAL).unwrap();
        c.init(0).unwrap();
        c
    }

    /// Tick every step period until nothing is moving, returning the number of steps taken.
    fn run_to_rest(c: &mut MotionCtrl<SimActuator>, start_ms: u64) -> u64 {
        let mut now = start_ms;
        let mut steps = 0;
        while c.is_moving() {
            if c.tick(now) {
                steps += 1;
            }
            now += 10;
            assert!(steps < 10_000);
        }
        steps
    }

    #[test]
    fn test_initial_written() {
        let c = ctrl();
        assert_eq!(c.actuator().angles_deg(), JointPosition::INITIAL.as_array());
        assert!(!c.is_moving());
    }

    #[test]
    fn test_invalid_params() {
        let mut p = Params::default();
        p.max_speed_dps[4] = 0.0;
        assert!(matches!(
            MotionCtrl::new(p, SimActuator::new(), JointPosition::INITIAL),
            Err(MotionCtrlError::InvalidMaxSpeed(4, _))
        ));

        let p = Params {
            step_period_ms: 0,
            ..Params::default()
        };
        assert!(matches!(
            MotionCtrl::new(p, SimActuator::new(), JointPosition::INITIAL),
            Err(MotionCtrlError::InvalidStepPeriod)
        ));
    }

    #[test]
    fn test_synchronised_arrival() {
        let mut c = ctrl();

        // Base moves 70 deg at up to 140 deg/s (0.5 s), wrist 90 deg at up to 200 deg/s (0.45 s)
        let target = JointPosition::new(20, 90, 90, 0, 90, 73);
        let duration = c.move_to(target, 0.0);
        assert!((duration - 0.5).abs() < 1e-9);

        let speeds = c.speed_dps();
        assert!((speeds[0] - 140.0).abs() < 1e-9);
        assert!((speeds[3] - 180.0).abs() < 1e-9);
        assert_eq!(speeds[1], 0.0);

        let mut now = 0;
        let mut base_done = None;
        let mut wrist_done = None;
        for step in 1..=100 {
            assert!(c.tick(now));
            now += 10;
            if base_done.is_none() && c.speed_dps()[0] == 0.0 {
                base_done = Some(step);
            }
            if wrist_done.is_none() && c.speed_dps()[3] == 0.0 {
                wrist_done = Some(step);
            }
            if !c.is_moving() {
                break;
            }
        }

        assert_eq!(base_done, Some(50));
        assert_eq!(wrist_done, Some(50));
        assert_eq!(c.current_deg()[0], 20.0);
        assert_eq!(c.current_deg()[3], 0.0);
        assert_eq!(c.actuator().angles_deg(), target.as_array());
    }

    #[test]
    fn test_reaches_target_exactly() {
        let mut c = ctrl();
        let target = JointPosition::new(0, 165, 3, 180, 47, 10);

        c.move_to(target, 0.0);
        run_to_rest(&mut c, 0);

        for &joint in JointId::all() {
            assert_eq!(c.current_deg()[joint.index()], target.get(joint) as f64);
        }
        assert!(!c.is_moving());
        assert_eq!(c.actuator().angles_deg(), target.as_array());
    }

    #[test]
    fn test_no_overshoot() {
        let mut c = ctrl();
        c.move_to(JointPosition::new(100, 90, 90, 90, 90, 73), 0.0);

        let mut now = 0;
        while c.is_moving() {
            c.tick(now);
            assert!(c.current_deg()[0] <= 100.0);
            now += 10;
        }
        assert_eq!(c.current_deg()[0], 100.0);
    }

    #[test]
    fn test_zero_displacement() {
        let mut c = ctrl();

        let duration = c.move_to(JointPosition::INITIAL, 0.0);

        assert_eq!(duration, 0.0);
        assert_eq!(c.speed_dps(), [0.0; NUM_JOINTS]);
        assert!(!c.is_moving());

        // A requested duration with nothing to move still gives zero speeds
        c.move_to(JointPosition::INITIAL, 2.0);
        assert_eq!(c.speed_dps(), [0.0; NUM_JOINTS]);
    }

    #[test]
    fn test_min_duration() {
        let c = ctrl();
        let target = JointPosition::new(20, 90, 90, 90, 90, 73);

        // 70 deg in 1 s is within the base's limit, so the request is honoured
        assert!((c.move_duration(&target, 1.0) - 1.0).abs() < 1e-9);

        // 70 deg in 0.1 s is too fast, the limit wins
        assert!((c.move_duration(&target, 0.1) - 0.5).abs() < 1e-9);

        // Zero means as fast as possible
        assert!((c.move_duration(&target, 0.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_timed_move_takes_requested_time() {
        let mut c = ctrl();
        c.move_to(JointPosition::new(80, 90, 90, 90, 90, 73), 1.0);

        assert_eq!(run_to_rest(&mut c, 0), 100);
    }

    #[test]
    fn test_rate_limited() {
        let mut c = ctrl();
        c.move_to(JointPosition::new(20, 90, 90, 90, 90, 73), 0.0);

        assert!(c.tick(0));
        assert!(!c.tick(5));
        assert!(!c.tick(9));
        assert!(c.tick(10));

        // A late call still only takes one step
        let before = c.current_deg()[0];
        assert!(c.tick(100));
        assert!((before - c.current_deg()[0] - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_freeze_preserves_trajectory() {
        let mut c = ctrl();
        let target = JointPosition::new(20, 90, 90, 0, 90, 73);
        c.move_to(target, 0.0);

        let mut now = 0;
        for _ in 0..10 {
            c.tick(now);
            now += 10;
        }

        let current = c.current_deg();
        let speeds = c.speed_dps();
        let written = c.actuator().angles_deg();

        c.set_frozen(true);
        for _ in 0..50 {
            assert!(!c.tick(now));
            now += 10;
        }

        assert_eq!(c.current_deg(), current);
        assert_eq!(c.speed_dps(), speeds);
        assert_eq!(c.target(), target);
        assert_eq!(c.actuator().angles_deg(), written);
        assert!(c.is_moving());

        // Resuming needs the same number of steps as the uninterrupted move had left
        c.set_frozen(false);
        assert_eq!(run_to_rest(&mut c, now), 40);
        assert_eq!(c.actuator().angles_deg(), target.as_array());
    }

    #[test]
    fn test_new_move_replaces_old() {
        let mut c = ctrl();
        c.move_to(JointPosition::new(0, 90, 90, 90, 90, 73), 0.0);
        c.tick(0);
        c.tick(10);

        let target = JointPosition::new(120, 90, 90, 90, 90, 73);
        c.move_to(target, 0.0);
        run_to_rest(&mut c, 20);

        assert_eq!(c.target(), target);
        assert_eq!(c.current_deg()[0], 120.0);
    }

    #[test]
    fn test_halt() {
        let mut c = ctrl();
        c.move_to(JointPosition::new(20, 90, 90, 90, 90, 73), 0.0);
        c.tick(0);
        c.tick(10);

        c.halt();

        assert!(!c.is_moving());
        assert_eq!(c.current_deg()[0], 87.0);
        assert_eq!(c.target().get(JointId::Base), 87);
        assert!(!c.tick(15));
        assert!(c.tick(20));
        assert_eq!(c.current_deg()[0], 87.0);
    }

    #[test]
    fn test_snapshot_cadence() {
        let mut c = ctrl();
        c.move_to(JointPosition::new(20, 90, 90, 90, 90, 73), 0.0);

        let s = c.snapshot(0).unwrap();
        assert_eq!(s.timestamp_ms, 0);
        assert_eq!(s.current_deg, JointPosition::INITIAL.as_array());
        assert_eq!(s.target.get(JointId::Base), 20);
        assert!(s.is_moving());

        assert!(c.snapshot(50).is_none());
        assert!(c.snapshot(99).is_none());

        c.tick(0);
        let s = c.snapshot(100).unwrap();
        assert_eq!(s.timestamp_ms, 100);
        assert_eq!(s.current_deg[0], 88);
    }

    #[test]
    fn test_residual_error_does_not_desync() {
        let mut c = ctrl();

        // Elbow left a hair short of 90 deg by an earlier trajectory
        c.current_deg[2] = 89.99999999999998;

        let target = JointPosition::new(20, 90, 90, 0, 90, 73);
        c.move_to(target, 0.0);

        assert_eq!(c.speed_dps()[2], 0.0);
        assert_eq!(c.current_deg()[2], 90.0);

        assert_eq!(run_to_rest(&mut c, 0), 50);
        assert_eq!(c.actuator().angles_deg(), target.as_array());
    }

    #[test]
    fn test_proc_before_init() {
        let mut c =
            MotionCtrl::new(Params::default(), SimActuator::new(), JointPosition::INITIAL).unwrap();

        assert!(matches!(
            c.proc(&InputData { now_ms: 0 }),
            Err(MotionCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_proc_report() {
        let mut c = ctrl();
        c.move_to(JointPosition::new(89, 90, 90, 88, 90, 73), 0.0);

        // The wrist's 2 deg at 200 deg/s sets a one step move, so both joints arrive together
        let (snapshot, report) = c.proc(&InputData { now_ms: 0 }).unwrap();
        assert!(report.stepped);
        assert_eq!(report.arrived, [true, false, false, true, false, false]);
        assert_eq!(snapshot.map(|s| s.timestamp_ms), Some(0));
        assert!(!c.is_moving());

        // Not due yet
        let (snapshot, report) = c.proc(&InputData { now_ms: 5 }).unwrap();
        assert_eq!(report, StatusReport::default());
        assert!(snapshot.is_none());

        // Frozen steps are reported but nothing arrives
        c.set_frozen(true);
        let (_, report) = c.proc(&InputData { now_ms: 10 }).unwrap();
        assert!(report.stepped);
        assert_eq!(report.arrived, [false; NUM_JOINTS]);
    }
}
