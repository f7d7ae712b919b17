//! odrive - ODrive Motor Controller CLI
//!
//! Sends one command over the ASCII interface and prints the reply. Use
//! `--simulate` to run against an in-memory device instead of a serial port.

#![deny(clippy::unwrap_used)]

mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use odrive_client::sim::SimulatedODrive;
use odrive_client::{AxisState, ClientConfig, Clock, ODrive, Stream};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{CliError, CliResult};
use crate::output::{print_error, print_report, Report};

#[derive(Parser, Debug)]
#[command(name = "odrive")]
#[command(about = "Control an ODrive motor controller over its ASCII serial interface")]
#[command(version)]
struct Cli {
    /// Serial port the controller is attached to
    #[arg(short, long, global = true, env = "ODRIVE_PORT")]
    port: Option<String>,

    /// Serial baud rate
    #[arg(short, long, global = true, default_value_t = 115_200)]
    baud: u32,

    /// YAML file with client timing (read_timeout_ms, poll_interval_ms)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Talk to a simulated controller instead of a serial port
    #[arg(long, global = true)]
    simulate: bool,

    /// Output in JSON format for machine parsing
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Commands {
    /// Send a position setpoint
    #[command(allow_negative_numbers = true)]
    Position {
        axis: u32,
        /// Target position [turns]
        position: f32,
        /// Velocity feedforward [turns/s]
        #[arg(default_value_t = 0.0)]
        velocity_ff: f32,
        /// Torque feedforward [Nm]
        #[arg(default_value_t = 0.0)]
        torque_ff: f32,
    },

    /// Send a velocity setpoint
    #[command(allow_negative_numbers = true)]
    Velocity {
        axis: u32,
        /// Target velocity [turns/s]
        velocity: f32,
        /// Torque feedforward [Nm]
        #[arg(default_value_t = 0.0)]
        torque_ff: f32,
    },

    /// Send a torque setpoint
    #[command(allow_negative_numbers = true)]
    Torque {
        axis: u32,
        /// Target torque [Nm]
        torque: f32,
    },

    /// Move to a position through the trajectory planner
    #[command(allow_negative_numbers = true)]
    Trajectory {
        axis: u32,
        /// Target position [turns]
        position: f32,
    },

    /// Read an axis property, e.g. `encoder.pos_estimate`
    Read { axis: u32, property: String },

    /// Write an axis property
    #[command(allow_negative_numbers = true)]
    Write {
        axis: u32,
        property: String,
        value: String,
    },

    /// Print position and velocity estimates
    Feedback { axis: u32 },

    /// Print the axis state, or request a new one
    State {
        axis: u32,
        /// State to request (1 idle, 3 full calibration, 8 closed loop)
        requested: Option<i32>,
        /// Wait until the axis returns to idle
        #[arg(short, long, requires = "requested")]
        wait: bool,
        /// Seconds to wait for idle
        #[arg(short, long, default_value_t = 10.0)]
        timeout: f32,
    },

    /// Print and decode the axis error registers
    Errors { axis: u32 },

    /// Save the configuration to flash
    Save,

    /// Clear all errors
    Clear,

    /// Arm, disarm or feed the axis watchdog
    Watchdog {
        axis: u32,
        #[arg(value_enum)]
        action: WatchdogAction,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum WatchdogAction {
    Enable,
    Disable,
    Feed,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(&cli).and_then(|report| print_report(&report, cli.json));
    if let Err(e) = result {
        print_error(&e, cli.json);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("odrive_cli={0},odrive_client={0}", log_level).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: &Cli) -> CliResult<Report> {
    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    let mut stream = open_device(cli)?;
    let mut odrive = ODrive::new(stream.as_mut()).with_config(config);
    execute(&cli.command, &mut odrive)
}

fn open_device(cli: &Cli) -> CliResult<Box<dyn Stream>> {
    if cli.simulate {
        info!("odrive: using simulated controller");
        return Ok(Box::new(SimulatedODrive::new()));
    }
    let port = cli.port.as_deref().ok_or(CliError::NoDevice)?;
    open_port(port, cli.baud)
}

#[cfg(feature = "serial")]
fn open_port(path: &str, baud: u32) -> CliResult<Box<dyn Stream>> {
    Ok(Box::new(odrive_client::SerialStream::open(path, baud)?))
}

#[cfg(not(feature = "serial"))]
fn open_port(_path: &str, _baud: u32) -> CliResult<Box<dyn Stream>> {
    Err(CliError::SerialUnavailable)
}

fn execute<S, C>(command: &Commands, odrive: &mut ODrive<'_, S, C>) -> CliResult<Report>
where
    S: Stream + ?Sized,
    C: Clock,
{
    match command {
        Commands::Position { axis, position, velocity_ff, torque_ff } => {
            odrive.set_position(*axis, *position, *velocity_ff, *torque_ff)?;
            Ok(Report::done())
        }
        Commands::Velocity { axis, velocity, torque_ff } => {
            odrive.set_velocity(*axis, *velocity, *torque_ff)?;
            Ok(Report::done())
        }
        Commands::Torque { axis, torque } => {
            odrive.set_torque(*axis, *torque)?;
            Ok(Report::done())
        }
        Commands::Trajectory { axis, position } => {
            odrive.set_simple_position(*axis, *position)?;
            Ok(Report::done())
        }

        Commands::Read { axis, property } => {
            let value = odrive.read_property(*axis, property)?;
            Ok(Report::new(value.clone(), json!({ "property": property, "value": value })))
        }
        Commands::Write { axis, property, value } => {
            odrive.write_property(*axis, property, value.as_str())?;
            Ok(Report::done())
        }
        Commands::Feedback { axis } => {
            let feedback = odrive.get_feedback(*axis)?;
            Ok(Report::new(
                format!(
                    "position: {} turns\nvelocity: {} turns/s",
                    feedback.position, feedback.velocity
                ),
                json!({ "position": feedback.position, "velocity": feedback.velocity }),
            ))
        }

        Commands::State { axis, requested: None, .. } => {
            let state = odrive.get_state(*axis)?;
            Ok(Report::new(
                state.to_string(),
                json!({ "state": i32::from(state), "name": state.to_string() }),
            ))
        }
        Commands::State { axis, requested: Some(requested), wait, timeout } => {
            let reached = odrive.run_state(*axis, *requested, *wait, *timeout)?;
            if !reached {
                return Err(CliError::StateTimeout { axis: *axis, timeout_seconds: *timeout });
            }
            let state = AxisState::from(*requested);
            Ok(Report::new(
                format!("requested {}", state),
                json!({ "requested": requested, "waited": wait }),
            ))
        }

        Commands::Errors { axis } => {
            let mask = odrive.get_errors(*axis)?;
            let description = odrive_client::protocol::decode_errors(mask);
            let text = if mask == 0 {
                "no errors".to_string()
            } else {
                format!("0x{:08x}: {}", mask, description.trim_end())
            };
            Ok(Report::new(text, json!({ "mask": mask, "description": description })))
        }

        Commands::Save => {
            odrive.save_config()?;
            Ok(Report::done())
        }
        Commands::Clear => {
            odrive.clear_errors()?;
            Ok(Report::done())
        }
        Commands::Watchdog { axis, action } => {
            match action {
                WatchdogAction::Enable => odrive.enable_watchdog(*axis, true)?,
                WatchdogAction::Disable => odrive.enable_watchdog(*axis, false)?,
                WatchdogAction::Feed => odrive.update_watchdog(*axis)?,
            }
            Ok(Report::done())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odrive_client::mock::ManualClock;
    use odrive_client::protocol::ERROR_DRV_FAULT;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn run_sim(device: &mut SimulatedODrive, command: Commands) -> CliResult<Report> {
        let clock = ManualClock::new();
        let mut odrive = ODrive::with_clock(device, &clock);
        execute(&command, &mut odrive)
    }

    // --- Argument parsing ---

    #[test]
    fn parse_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["odrive", "--simulate", "feedback", "0"])?;
        assert!(cli.simulate);
        assert_eq!(cli.baud, 115_200);
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        assert_eq!(cli.command, Commands::Feedback { axis: 0 });
        Ok(())
    }

    #[test]
    fn parse_negative_setpoint() -> TestResult {
        let cli = Cli::try_parse_from(["odrive", "position", "1", "-2.5", "0.5"])?;
        assert_eq!(
            cli.command,
            Commands::Position { axis: 1, position: -2.5, velocity_ff: 0.5, torque_ff: 0.0 }
        );
        Ok(())
    }

    #[test]
    fn parse_state_request() -> TestResult {
        let cli = Cli::try_parse_from(["odrive", "-vv", "state", "0", "3", "--wait", "-t", "20"])?;
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.command,
            Commands::State { axis: 0, requested: Some(3), wait: true, timeout: 20.0 }
        );
        Ok(())
    }

    #[test]
    fn parse_wait_requires_state() {
        assert!(Cli::try_parse_from(["odrive", "state", "0", "--wait"]).is_err());
    }

    #[test]
    fn parse_watchdog_action() -> TestResult {
        let cli = Cli::try_parse_from(["odrive", "watchdog", "1", "feed"])?;
        assert_eq!(cli.command, Commands::Watchdog { axis: 1, action: WatchdogAction::Feed });
        Ok(())
    }

    // --- Execution against the simulated controller ---

    #[test]
    fn execute_position_then_feedback() -> TestResult {
        let mut device = SimulatedODrive::new();
        let set = Commands::Position { axis: 0, position: 1.5, velocity_ff: 0.25, torque_ff: 0.0 };
        assert_eq!(run_sim(&mut device, set)?, Report::done());

        let report = run_sim(&mut device, Commands::Feedback { axis: 0 })?;
        assert_eq!(report.data, json!({ "position": 1.5, "velocity": 0.25 }));
        Ok(())
    }

    #[test]
    fn execute_read_write() -> TestResult {
        let mut device = SimulatedODrive::new();
        let write = Commands::Write {
            axis: 1,
            property: "config.enable_watchdog".to_string(),
            value: "1".to_string(),
        };
        run_sim(&mut device, write)?;

        let read = Commands::Read { axis: 1, property: "config.enable_watchdog".to_string() };
        assert_eq!(run_sim(&mut device, read)?.text, "1");
        Ok(())
    }

    #[test]
    fn execute_state_timeout() {
        let mut device = SimulatedODrive::new().with_settle_polls(100);
        let command = Commands::State { axis: 0, requested: Some(3), wait: true, timeout: 1.0 };
        let result = run_sim(&mut device, command);
        assert!(matches!(result, Err(CliError::StateTimeout { axis: 0, .. })));
    }

    #[test]
    fn execute_state_query() -> TestResult {
        let mut device = SimulatedODrive::new().with_settle_polls(1);
        let command = Commands::State { axis: 0, requested: Some(3), wait: true, timeout: 1.0 };
        run_sim(&mut device, command)?;

        let report = run_sim(&mut device, Commands::State {
            axis: 0,
            requested: None,
            wait: false,
            timeout: 10.0,
        })?;
        assert_eq!(report.data["state"], json!(1));
        Ok(())
    }

    #[test]
    fn execute_errors_and_clear() -> TestResult {
        let mut device = SimulatedODrive::new();
        device.inject_error(0, ERROR_DRV_FAULT);

        let report = run_sim(&mut device, Commands::Errors { axis: 0 })?;
        assert_eq!(report.text, "0x00000020: DRV fault;");

        run_sim(&mut device, Commands::Clear)?;
        let report = run_sim(&mut device, Commands::Errors { axis: 0 })?;
        assert_eq!(report.text, "no errors");
        Ok(())
    }

    #[test]
    fn missing_device_is_an_error() -> TestResult {
        let cli = Cli::try_parse_from(["odrive", "save"])?;
        if cli.port.is_none() {
            assert!(matches!(run(&cli), Err(CliError::NoDevice)));
        }
        Ok(())
    }
}
