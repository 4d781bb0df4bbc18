//! # Arm console
//!
//! Interactive host console for the arm. Lines typed at the prompt are sent to the arm over a
//! serial port, and the result and telemetry lines coming back are printed as they arrive.

use color_eyre::{eyre::WrapErr, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{BufRead, BufReader, Write};
use std::thread;
use std::time::Duration;
use structopt::StructOpt;

use comms_if::{tc::CmdResult, tm::Snapshot};

const PROMPT: &str = "Arm $ ";
const HISTORY_PATH: &str = "data/history.txt";

const HELP: &str = "\
Commands are sent to the arm as typed:
    moveto <base> <shoulder> <elbow> <wrist> <wrist_rot> <gripper>
    movetimed <base> <shoulder> <elbow> <wrist> <wrist_rot> <gripper> <ms>
    freeze <ms>
    stop
    wait
Console commands:
    help    show this message
    quit    exit the console";

#[derive(Debug, StructOpt)]
#[structopt(name = "arm_console", about = "Sends commands to the arm over a serial port")]
struct Opt {
    /// Serial port the arm is connected to
    #[structopt(short, long, default_value = "/dev/ttyACM0")]
    port: String,

    /// Line speed in bits/second
    #[structopt(short, long, default_value = "115200")]
    baud: u32,

    /// Print telemetry snapshots as they arrive
    #[structopt(short, long)]
    telemetry: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    let mut port = serialport::new(&opt.port, opt.baud)
        .timeout(Duration::from_millis(100))
        .open()
        .wrap_err_with(|| format!("Could not open {}", opt.port))?;

    let reader = port.try_clone().wrap_err("Could not clone the serial port")?;
    let telemetry = opt.telemetry;
    thread::Builder::new()
        .name("arm-reader".into())
        .spawn(move || read_loop(reader, telemetry))
        .wrap_err("Could not start the reader thread")?;

    println!("Connected to {} at {} baud, type `help` for commands", opt.port, opt.baud);

    let mut rl = DefaultEditor::new().wrap_err("Could not start the line editor")?;
    if rl.load_history(HISTORY_PATH).is_err() {
        println!("No history detected");
    }

    loop {
        let readline = rl.readline(PROMPT);
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line).ok();

                match line {
                    "quit" | "exit" => break,
                    "help" => println!("{}", HELP),
                    _ => {
                        port.write_all(line.as_bytes())
                            .and_then(|_| port.write_all(b"\n"))
                            .and_then(|_| port.flush())
                            .wrap_err("Could not send the command")?;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Unhandled Error: {:?}", err);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(HISTORY_PATH) {
        println!("Could not save history: {}", e);
    }
    println!("Exiting...");

    Ok(())
}

/// Print every line the arm sends until the port closes.
fn read_loop(port: Box<dyn serialport::SerialPort>, telemetry: bool) {
    let mut reader = BufReader::new(port);
    let mut line = String::new();

    loop {
        // A timeout may leave part of a line in the buffer, so only clear once it is complete
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                print_line(&line, telemetry);
                line.clear();
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => {
                println!("Lost connection to the arm: {}", e);
                break;
            }
        }
    }
}

fn print_line(line: &str, telemetry: bool) {
    if let Some(result) = CmdResult::from_line(line) {
        println!("<- {}", result);
        return;
    }

    match Snapshot::from_line(line) {
        Ok(s) => {
            if telemetry {
                println!(
                    "[{:>8} ms] {} current: {:?} target: {} speed: {:.1?}",
                    s.timestamp_ms,
                    if s.is_moving() { "moving" } else { "idle  " },
                    s.current_deg,
                    s.target,
                    s.speed_dps
                );
            }
        }
        Err(_) => println!("?? {}", line.trim_end()),
    }
}
