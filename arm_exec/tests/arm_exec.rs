//! End to end tests of the arm executive over an in-memory transport.

use arm_lib::{
    actuator::SimActuator,
    clock::ManualClock,
    cmd_dispatch::CmdDispatcher,
    driver::ArmExec,
    line_input::TokenizedLine,
    motion_ctrl::{MotionCtrl, Params},
    soft_start::SoftStart,
    transport::{MemTransport, ScriptTransport, Transport},
};
use comms_if::{
    eqpt::arm::{JointId, JointPosition},
    tc::CmdResult,
    tm::Snapshot,
};
use util::script::ScriptInterpreter;

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

const STEP_MS: u64 = 10;

fn exec_with<T: Transport>(transport: T, soft_start_ms: u64) -> ArmExec<T, SimActuator> {
    let ctrl =
        MotionCtrl::new(Params::default(), SimActuator::new(), JointPosition::INITIAL).unwrap();

    ArmExec::new(
        transport,
        ctrl,
        CmdDispatcher::with_builtin_cmds(),
        SoftStart::new(soft_start_ms),
    )
}

fn exec() -> ArmExec<MemTransport, SimActuator> {
    exec_with(MemTransport::new(), 0)
}

/// Tick from `from_ms` up to but not including `to_ms`, returning every line written.
fn run(exec: &mut ArmExec<MemTransport, SimActuator>, from_ms: u64, to_ms: u64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut now = from_ms;
    while now < to_ms {
        exec.tick(now);
        lines.extend(exec.transport_mut().take_output());
        now += STEP_MS;
    }
    lines
}

fn results(lines: &[String]) -> Vec<CmdResult> {
    lines
        .iter()
        .filter_map(|l| CmdResult::from_line(l))
        .collect()
}

fn snapshots(lines: &[String]) -> Vec<Snapshot> {
    lines
        .iter()
        .filter_map(|l| Snapshot::from_line(l).ok())
        .collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn moveto_reaches_target_and_stops() {
    let mut e = exec();
    let target = JointPosition::new(10, 20, 30, 40, 50, 60);

    e.transport_mut().push_line("moveto 10 20 30 40 50 60");

    let mut now = 0;
    let mut lines = Vec::new();
    e.tick(now);
    lines.extend(e.transport_mut().take_output());
    assert_eq!(results(&lines), vec![CmdResult::Ok]);
    assert!(e.motion().is_moving());

    // Keep ticking until the arm reports it has stopped
    while e.motion().is_moving() {
        now += STEP_MS;
        e.tick(now);
        assert!(now < 10_000);
    }

    assert_eq!(e.motion().target(), target);
    assert_eq!(e.motion().actuator().angles_deg(), target.as_array());
    for &joint in JointId::all() {
        assert_eq!(e.motion().current_deg()[joint.index()], target.get(joint) as f64);
    }
    assert!(e.is_idle());
}

#[test]
fn joints_finish_on_the_same_tick() {
    let mut e = exec();

    // Base needs 0.5 s at 140 deg/s, the wrist only 0.45 s at 200 deg/s
    e.transport_mut().push_line("moveto 20 90 90 0 90 73");

    let mut now = 0;
    let mut finished = [None; 2];
    let mut steps = 0;
    loop {
        e.tick(now);
        steps += 1;
        let speeds = e.motion().speed_dps();
        for (slot, &i) in finished.iter_mut().zip([0usize, 3].iter()) {
            if slot.is_none() && speeds[i] == 0.0 {
                *slot = Some(steps);
            }
        }
        if !e.motion().is_moving() {
            break;
        }
        now += STEP_MS;
    }

    assert_eq!(finished, [Some(50), Some(50)]);
}

#[test]
fn freeze_holds_and_resumes() {
    let mut e = exec();

    e.transport_mut().push_line("moveto 20 90 90 0 90 73");
    run(&mut e, 0, 100);

    e.transport_mut().push_line("freeze 300");
    e.tick(100);

    // The freeze tick itself does not advance the arm
    let current = e.motion().current_deg();
    let speeds = e.motion().speed_dps();
    let target = e.motion().target();
    let base_remaining = current[0] - 20.0;

    let lines = run(&mut e, 110, 400);
    assert!(results(&lines).is_empty());
    assert_eq!(e.motion().current_deg(), current);
    assert_eq!(e.motion().speed_dps(), speeds);
    assert_eq!(e.motion().target(), target);
    assert!(e.motion().is_moving());

    // Snapshots keep coming while frozen and report the held angles
    let snaps = snapshots(&lines);
    assert_eq!(snaps.len(), 3);
    assert!(snaps.iter().all(|s| s.current_deg[0] == current[0].trunc() as i32));

    let lines = run(&mut e, 400, 410);
    assert_eq!(results(&lines), vec![CmdResult::Ok]);

    // Same speed and distance remaining, so the same number of steps to arrive
    let steps_left = (base_remaining / (speeds[0] * 0.01)).round() as u64;
    let mut steps = 1;
    let mut now = 410;
    while e.motion().is_moving() {
        e.tick(now);
        steps += 1;
        now += STEP_MS;
    }
    assert_eq!(steps, steps_left);
    assert_eq!(e.motion().current_deg()[0], 20.0);
}

#[test]
fn freeze_poll_boundary() {
    let mut e = exec();
    run(&mut e, 0, 1000);

    e.transport_mut().push_line("freeze 500");

    let mut now = 1000;
    while now < 1500 {
        e.tick(now);
        let lines = e.transport_mut().take_output();
        assert!(results(&lines).is_empty(), "early result at {} ms", now);
        now += 1;
    }

    e.tick(1500);
    let lines = e.transport_mut().take_output();
    assert_eq!(results(&lines), vec![CmdResult::Ok]);
}

#[test]
fn out_of_range_moveto_is_an_error() {
    let mut e = exec();

    e.transport_mut().push_line("moveto 999 90 90 90 90 90");
    let lines = run(&mut e, 0, 200);

    assert_eq!(lines.iter().filter(|l| l.as_str() == "RET error").count(), 1);
    assert_eq!(e.motion().target(), JointPosition::INITIAL);
    assert_eq!(
        e.motion().actuator().angles_deg(),
        JointPosition::INITIAL.as_array()
    );
    assert!(!e.motion().is_moving());
}

#[test]
fn unknown_command_is_invalid() {
    let mut e = exec();

    e.transport_mut().push_line("frobnicate");
    e.transport_mut().push_line("MOVETO 10 20 30 40 50 60");
    let lines = run(&mut e, 0, 50);

    assert_eq!(
        results(&lines),
        vec![CmdResult::InvalidCommand, CmdResult::InvalidCommand]
    );
    assert!(lines.contains(&String::from("RET invalid-command")));
}

#[test]
fn tokenizer_round_trip() {
    let line = TokenizedLine::from_text("moveto 10 20 30 40 50 60");

    assert_eq!(line.argument_count(), 7);
    assert_eq!(line.argument(0), Some("moveto"));
    assert_eq!(line.argument(6), Some("60"));
}

#[test]
fn no_interleaving_while_busy() {
    let mut e = exec();

    e.transport_mut().push_line("freeze 200");
    e.transport_mut().push_line("moveto 10 20 30 40 50 60");

    let lines = run(&mut e, 0, 200);
    assert!(results(&lines).is_empty());
    assert_eq!(e.motion().target(), JointPosition::INITIAL);
    assert_eq!(e.dispatcher().busy_cmd(), Some("freeze"));

    // Freeze finishes first, then the queued move is dispatched on the next tick
    let lines = run(&mut e, 200, 220);
    assert_eq!(results(&lines), vec![CmdResult::Ok, CmdResult::Ok]);
    assert_eq!(
        e.motion().target(),
        JointPosition::new(10, 20, 30, 40, 50, 60)
    );
}

#[test]
fn snapshot_follows_motion() {
    let mut e = exec();

    e.transport_mut().push_line("moveto 20 90 90 90 90 73");
    let lines = run(&mut e, 0, 10);

    // Result line first, then the snapshot taken after the first step
    assert_eq!(lines[0], "RET ok");
    let snap = Snapshot::from_line(&lines[1]).unwrap();
    assert_eq!(snap.timestamp_ms, 0);
    assert_eq!(snap.current_deg[0], 88);
    assert_eq!(snap.target.get(JointId::Base), 20);
    assert_eq!(lines[1], "OUT 0:88,90,90,90,90,73:20,90,90,90,90,73:140.00,0.00,0.00,0.00,0.00,0.00");
}

#[test]
fn snapshot_period() {
    let mut e = exec();
    let lines = run(&mut e, 0, 1000);

    let snaps = snapshots(&lines);
    assert_eq!(snaps.len(), 10);
    for (i, s) in snaps.iter().enumerate() {
        assert_eq!(s.timestamp_ms, i as u64 * 100);
        assert!(!s.is_moving());
    }
}

#[test]
fn soft_start_gates_ticks() {
    let mut e = exec_with(MemTransport::new(), 1000);

    e.transport_mut().push_line("moveto 10 20 30 40 50 60");
    let lines = run(&mut e, 0, 1000);

    assert!(lines.is_empty());
    assert!(!e.motion().actuator().is_enabled());
    assert!(!e.is_idle());
    assert_eq!(e.num_ticks(), 0);

    let lines = run(&mut e, 1000, 1010);
    assert!(e.motion().actuator().is_enabled());
    assert_eq!(results(&lines), vec![CmdResult::Ok]);
    assert_eq!(snapshots(&lines)[0].timestamp_ms, 1000);
}

#[test]
fn blank_and_overlong_lines() {
    let mut e = exec();

    e.transport_mut().push_line("");
    e.transport_mut().push_line("  \t ");
    e.transport_mut()
        .push_line(&format!("stop {}", "x".repeat(100)));
    e.transport_mut().push_line("stop");

    let lines = run(&mut e, 0, 50);

    // The truncated stop still carries an extra token so is rejected, and its tail is dropped
    assert_eq!(results(&lines), vec![CmdResult::Error, CmdResult::Ok]);
}

#[test]
fn partial_lines_wait_for_newline() {
    let mut e = exec();

    e.transport_mut().push_input("moveto 10 20 30");
    assert!(results(&run(&mut e, 0, 50)).is_empty());

    e.transport_mut().push_input(" 40 50 60\r\n");
    assert_eq!(results(&run(&mut e, 50, 60)), vec![CmdResult::Ok]);
    assert_eq!(
        e.motion().target(),
        JointPosition::new(10, 20, 30, 40, 50, 60)
    );
}

#[test]
fn stop_and_wait() {
    let mut e = exec();

    e.transport_mut().push_line("moveto 20 90 90 90 90 73");
    e.transport_mut().push_line("wait");
    let lines = run(&mut e, 0, 100);
    assert_eq!(results(&lines), vec![CmdResult::Ok]);
    assert_eq!(e.dispatcher().busy_cmd(), Some("wait"));

    let lines = run(&mut e, 100, 600);
    assert_eq!(results(&lines), vec![CmdResult::Ok]);
    assert_eq!(e.motion().current_deg()[0], 20.0);

    e.transport_mut().push_line("moveto 160 90 90 90 90 73");
    run(&mut e, 600, 700);
    e.transport_mut().push_line("stop");
    let lines = run(&mut e, 700, 710);
    assert_eq!(results(&lines), vec![CmdResult::Ok]);
    assert!(!e.motion().is_moving());

    let held = e.motion().target();
    run(&mut e, 710, 1000);
    assert_eq!(e.motion().target(), held);
    assert!(e.is_idle());
}

#[test]
fn scripted_run() {
    let clock = ManualClock::new(0);
    let si = ScriptInterpreter::from_str(
        "0.0: moveto 80 90 90 90 90 73;\n\
         0.0: wait;\n\
         0.5: movetimed 90 90 90 90 90 73 1000;\n\
         0.5: wait;\n",
    )
    .unwrap();
    let mut e = exec_with(ScriptTransport::new(si, clock.clone()), 0);

    let mut now = 0;
    loop {
        clock.set(now);
        e.tick(now);
        if e.transport().is_finished() && e.is_idle() {
            break;
        }
        now += STEP_MS;
        assert!(now < 10_000);
    }

    assert_eq!(e.transport().results(), vec![CmdResult::Ok; 4].as_slice());
    assert!(e.transport().num_written() > 4);
    assert_eq!(e.motion().target(), JointPosition::INITIAL);

    // The timed move lasts a second from when it was dispatched at 0.5 s
    assert!(now >= 1500 && now <= 1530, "finished at {} ms", now);
}
