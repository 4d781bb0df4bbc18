//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The executable is a single threaded loop around [`ArmExec::tick`]:
//!
//!     - Initialise the session, logging and parameters
//!     - Select the command source:
//!         - A timed command script (`--script`)
//!         - Standard input and output (`--stdio`)
//!         - The serial port from the parameters (default)
//!     - Main loop:
//!         - Tick the executive with the current time
//!         - Sleep for the loop period
//!
//! Scripted and stdio runs end once their input is exhausted and the arm has come to rest.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use structopt::StructOpt;

// Internal
use arm_lib::{
    actuator::SimActuator,
    clock::{Clock, MonotonicClock},
    cmd_dispatch::CmdDispatcher,
    driver::{self, ArmExec},
    motion_ctrl::{self, MotionCtrl},
    params::ArmExecParams,
    soft_start::SoftStart,
    transport::{ScriptTransport, SerialTransport, StdioTransport, Transport},
};
use util::{
    logger::{logger_init, LevelFilter},
    script::ScriptInterpreter,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "Robotic arm control executable")]
struct Opt {
    /// Run the timed command script at this path instead of listening for commands
    #[structopt(short, long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Read commands from stdin and write results to stdout
    #[structopt(long, conflicts_with = "script")]
    stdio: bool,

    /// Serial port to listen on, overriding the parameter file
    #[structopt(short, long)]
    port: Option<String>,

    /// Minimum log level, one of info, debug or trace
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let mut params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load arm_exec params")?;
    let motion_params: motion_ctrl::Params =
        util::params::load("motion_ctrl.toml").wrap_err("Could not load motion_ctrl params")?;

    if let Some(port) = opt.port.clone() {
        params.serial.port = port;
    }

    info!("Parameters loaded");

    // ---- INITIALISE MODULES ----

    let clock = MonotonicClock::new();

    let motion = MotionCtrl::new(motion_params, SimActuator::new(), params.initial_position())
        .wrap_err("Failed to initialise MotionCtrl")?;
    info!("MotionCtrl initialised with simulated servos");

    let dispatcher = CmdDispatcher::with_builtin_cmds();
    info!("Commands: {}", dispatcher.cmd_names().join(", "));

    let soft_start = SoftStart::new(params.soft_start_ms);

    let archiver = if params.archive_snapshots {
        Some(driver::snapshot_archiver(&session).wrap_err("Failed to create the snapshot archive")?)
    } else {
        None
    };

    // ---- MAIN LOOP ----

    let sleep = Duration::from_millis(params.loop_sleep_ms);

    if let Some(ref path) = opt.script {
        info!("Loading script from {:?}", path);

        let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;
        info!(
            "Loaded script lasts {:.02} s and contains {} lines\n",
            si.duration_s(),
            si.num_lines()
        );

        let exec = build(ScriptTransport::new(si, clock), motion, dispatcher, soft_start, archiver);
        run(exec, &clock, sleep, |e| e.transport().is_finished() && e.is_idle());
    } else if opt.stdio {
        info!("Reading commands from stdin\n");

        let transport = StdioTransport::new().wrap_err("Failed to start the stdin reader")?;
        let exec = build(transport, motion, dispatcher, soft_start, archiver);
        run(exec, &clock, sleep, |e| e.transport().is_closed() && e.is_idle());
    } else {
        let transport =
            SerialTransport::open(&params.serial).wrap_err("Failed to open the serial port")?;
        let exec = build(transport, motion, dispatcher, soft_start, archiver);
        run(exec, &clock, sleep, |_| false);
    }

    info!("End of execution");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn build<T: Transport>(
    transport: T,
    motion: MotionCtrl<SimActuator>,
    dispatcher: CmdDispatcher<SimActuator>,
    soft_start: SoftStart,
    archiver: Option<util::archive::Archiver>,
) -> ArmExec<T, SimActuator> {
    let exec = ArmExec::new(transport, motion, dispatcher, soft_start);

    match archiver {
        Some(a) => exec.with_archiver(a),
        None => exec,
    }
}

/// Tick the executive until `is_done` returns true.
fn run<T, F>(mut exec: ArmExec<T, SimActuator>, clock: &MonotonicClock, sleep: Duration, is_done: F)
where
    T: Transport,
    F: Fn(&ArmExec<T, SimActuator>) -> bool,
{
    info!("Begining main loop\n");

    loop {
        exec.tick(clock.now_ms());

        if is_done(&exec) {
            info!("Input exhausted and arm at rest after {} ticks", exec.num_ticks());
            break;
        }

        thread::sleep(sleep);
    }
}
