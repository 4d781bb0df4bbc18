//! # Motion Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arm_lib::{
    actuator::SimActuator,
    cmd_dispatch::CmdDispatcher,
    driver::ArmExec,
    motion_ctrl::{InputData, MotionCtrl, Params},
    soft_start::SoftStart,
    transport::MemTransport,
};
use comms_if::eqpt::arm::JointPosition;
use util::module::State;

fn motion_ctrl_benchmark(c: &mut Criterion) {
    let target = JointPosition::new(0, 165, 0, 180, 0, 10);

    // Full trajectory from the initial pose, one step per iteration of the inner loop
    c.bench_function("MotionCtrl::proc::full_move", |b| {
        b.iter(|| {
            let mut ctrl =
                MotionCtrl::new(Params::default(), SimActuator::new(), JointPosition::INITIAL)
                    .unwrap();
            ctrl.init(0).unwrap();
            ctrl.move_to(target, 0.0);

            let mut now = 0;
            while ctrl.is_moving() {
                ctrl.proc(&InputData { now_ms: black_box(now) }).unwrap();
                now += 10;
            }
        })
    });

    // Whole executive tick including dispatch and snapshot formatting
    c.bench_function("ArmExec::tick", |b| {
        let ctrl = MotionCtrl::new(Params::default(), SimActuator::new(), JointPosition::INITIAL)
            .unwrap();
        let mut exec = ArmExec::new(
            MemTransport::new(),
            ctrl,
            CmdDispatcher::with_builtin_cmds(),
            SoftStart::new(0),
        );
        let mut now = 0;
        let mut toggle = false;

        b.iter(|| {
            if now % 1000 == 0 {
                let line = if toggle {
                    "moveto 0 165 0 180 0 10"
                } else {
                    "moveto 180 15 180 0 180 73"
                };
                exec.transport_mut().push_line(line);
                toggle = !toggle;
            }

            exec.tick(black_box(now));
            exec.transport_mut().take_output();
            now += 10;
        })
    });
}

criterion_group!(benches, motion_ctrl_benchmark);
criterion_main!(benches);
