//! Built-in commands
//!
//! | Command                       | Result                                          |
//! |-------------------------------|-------------------------------------------------|
//! | `moveto a0 a1 a2 a3 a4 a5`    | `ok` once the move has started                  |
//! | `movetimed a0 .. a5 <ms>`     | `ok` once the move has started                  |
//! | `freeze <ms>`                 | `ok` after holding still for `<ms>`             |
//! | `stop`                        | `ok` once the arm has been halted in place      |
//! | `wait`                        | `ok` once the current move has finished         |
//!
//! Malformed or out of range arguments give `error`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::arm::{JointId, JointPosition, NUM_JOINTS},
    tc::CmdResult,
};
use log::{debug, info};

use super::{Begin, CmdHandler};
use crate::{actuator::Actuator, line_input::TokenizedLine, motion_ctrl::MotionCtrl};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// `moveto`, move as fast as the joints allow.
#[derive(Debug, Default)]
pub struct MoveTo;

/// `movetimed`, move taking at least the given number of milliseconds.
#[derive(Debug, Default)]
pub struct MoveTimed;

/// `freeze`, hold the arm still for a number of milliseconds.
#[derive(Debug, Default)]
pub struct Freeze {
    unfreeze_at_ms: u64,
}

/// `stop`, abandon the current move.
#[derive(Debug, Default)]
pub struct Stop;

/// `wait`, finish once the arm is no longer moving.
#[derive(Debug, Default)]
pub struct Wait;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The command table used by the arm executable.
pub fn builtin_cmds<A: Actuator + 'static>() -> Vec<Box<dyn CmdHandler<A>>> {
    vec![
        Box::new(MoveTo),
        Box::new(MoveTimed),
        Box::new(Freeze::default()),
        Box::new(Stop),
        Box::new(Wait),
    ]
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse six joint angles starting at token `first`.
///
/// Out of range angles are rejected rather than clamped.
fn parse_position(args: &TokenizedLine, first: usize) -> Option<JointPosition> {
    let mut pos = JointPosition::default();

    for &joint in JointId::all() {
        let angle: i64 = args.argument(first + joint.index())?.parse().ok()?;

        if !joint.in_range(angle) {
            debug!(
                "{} angle {} outside [{}, {}]",
                joint.name(),
                angle,
                joint.min_deg(),
                joint.max_deg()
            );
            return None;
        }

        pos.set(joint, angle as i32);
    }

    Some(pos)
}

/// Parse a non-negative millisecond count.
fn parse_millis(token: Option<&str>) -> Option<u64> {
    token?.parse().ok()
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<A: Actuator> CmdHandler<A> for MoveTo {
    fn name(&self) -> &'static str {
        "moveto"
    }

    fn begin(&mut self, args: &TokenizedLine, ctrl: &mut MotionCtrl<A>, _now_ms: u64) -> Begin {
        if args.argument_count() != NUM_JOINTS + 1 {
            return Begin::Done(CmdResult::Error);
        }

        match parse_position(args, 1) {
            Some(target) => {
                ctrl.move_to(target, 0.0);
                Begin::Done(CmdResult::Ok)
            }
            None => Begin::Done(CmdResult::Error),
        }
    }

    fn poll(&mut self, _: &TokenizedLine, _: &mut MotionCtrl<A>, _: u64) -> Option<CmdResult> {
        Some(CmdResult::Ok)
    }
}

impl<A: Actuator> CmdHandler<A> for MoveTimed {
    fn name(&self) -> &'static str {
        "movetimed"
    }

    fn begin(&mut self, args: &TokenizedLine, ctrl: &mut MotionCtrl<A>, _now_ms: u64) -> Begin {
        if args.argument_count() != NUM_JOINTS + 2 {
            return Begin::Done(CmdResult::Error);
        }

        let target = match parse_position(args, 1) {
            Some(t) => t,
            None => return Begin::Done(CmdResult::Error),
        };
        let duration_ms = match parse_millis(args.argument(NUM_JOINTS + 1)) {
            Some(d) => d,
            None => return Begin::Done(CmdResult::Error),
        };

        ctrl.move_to(target, util::time::millis_to_seconds(duration_ms));

        Begin::Done(CmdResult::Ok)
    }

    fn poll(&mut self, _: &TokenizedLine, _: &mut MotionCtrl<A>, _: u64) -> Option<CmdResult> {
        Some(CmdResult::Ok)
    }
}

impl<A: Actuator> CmdHandler<A> for Freeze {
    fn name(&self) -> &'static str {
        "freeze"
    }

    fn begin(&mut self, args: &TokenizedLine, ctrl: &mut MotionCtrl<A>, now_ms: u64) -> Begin {
        if args.argument_count() != 2 {
            return Begin::Done(CmdResult::Error);
        }

        let duration_ms = match parse_millis(args.argument(1)) {
            Some(d) => d,
            None => return Begin::Done(CmdResult::Error),
        };

        self.unfreeze_at_ms = now_ms.saturating_add(duration_ms);
        ctrl.set_frozen(true);

        info!("Frozen for {} ms", duration_ms);

        Begin::Pending
    }

    fn poll(&mut self, _: &TokenizedLine, ctrl: &mut MotionCtrl<A>, now_ms: u64) -> Option<CmdResult> {
        if now_ms >= self.unfreeze_at_ms {
            ctrl.set_frozen(false);
            info!("Unfrozen");
            Some(CmdResult::Ok)
        } else {
            None
        }
    }
}

impl<A: Actuator> CmdHandler<A> for Stop {
    fn name(&self) -> &'static str {
        "stop"
    }

    fn begin(&mut self, args: &TokenizedLine, ctrl: &mut MotionCtrl<A>, _now_ms: u64) -> Begin {
        if args.argument_count() != 1 {
            return Begin::Done(CmdResult::Error);
        }

        ctrl.halt();

        Begin::Done(CmdResult::Ok)
    }

    fn poll(&mut self, _: &TokenizedLine, _: &mut MotionCtrl<A>, _: u64) -> Option<CmdResult> {
        Some(CmdResult::Ok)
    }
}

impl<A: Actuator> CmdHandler<A> for Wait {
    fn name(&self) -> &'static str {
        "wait"
    }

    fn begin(&mut self, args: &TokenizedLine, ctrl: &mut MotionCtrl<A>, _now_ms: u64) -> Begin {
        if args.argument_count() != 1 {
            return Begin::Done(CmdResult::Error);
        }

        if ctrl.is_moving() {
            Begin::Pending
        } else {
            Begin::Done(CmdResult::Ok)
        }
    }

    fn poll(&mut self, _: &TokenizedLine, ctrl: &mut MotionCtrl<A>, _: u64) -> Option<CmdResult> {
        if ctrl.is_moving() {
            None
        } else {
            Some(CmdResult::Ok)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
