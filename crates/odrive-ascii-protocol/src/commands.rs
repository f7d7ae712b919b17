//! Commands that can be sent to the device.
//!
//! The ASCII interface supports several categories of commands:
//! - Motion setpoints (`p`, `v`, `c`, `t`)
//! - Property reads and writes (`r`, `w`) and the `f` feedback query
//! - System commands (`ss`, `sc`)
//! - Watchdog feeding (`u`)

use crate::codec::LineCodec;
use crate::error::{ProtocolError, ProtocolResult};

/// Position estimate of the axis encoder, in turns.
pub const PROP_POS_ESTIMATE: &str = "encoder.pos_estimate";
/// Velocity estimate of the axis encoder, in turns per second.
pub const PROP_VEL_ESTIMATE: &str = "encoder.vel_estimate";
/// State the axis is currently in.
pub const PROP_CURRENT_STATE: &str = "current_state";
/// State the host wants the axis to enter.
pub const PROP_REQUESTED_STATE: &str = "requested_state";
/// Whether the axis watchdog is armed.
pub const PROP_ENABLE_WATCHDOG: &str = "config.enable_watchdog";
/// Currently active error bits.
pub const PROP_ACTIVE_ERRORS: &str = "active_errors";
/// Error bits that caused the last disarm.
pub const PROP_DISARM_REASON: &str = "disarm_reason";

/// Render a float with exactly four fractional digits.
///
/// Negative zero renders as `0.0000` and NaN as `nan`.
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == 0.0 {
        "0.0000".to_string()
    } else {
        format!("{:.4}", value)
    }
}

/// A value that can be written to a device property.
pub trait ParamValue {
    /// Render the value the way the device parser expects it.
    fn to_param_string(&self) -> String;
}

impl ParamValue for f32 {
    fn to_param_string(&self) -> String {
        format_float(*self)
    }
}

impl ParamValue for f64 {
    fn to_param_string(&self) -> String {
        format_float(*self as f32)
    }
}

impl ParamValue for bool {
    fn to_param_string(&self) -> String {
        (if *self { "1" } else { "0" }).to_string()
    }
}

macro_rules! impl_integer_param {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn to_param_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer_param!(i8, i16, i32, i64, u8, u16, u32, u64);

impl ParamValue for str {
    fn to_param_string(&self) -> String {
        self.to_string()
    }
}

impl ParamValue for String {
    fn to_param_string(&self) -> String {
        self.clone()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param_string(&self) -> String {
        (**self).to_param_string()
    }
}

/// Commands understood by the device's ASCII interface.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // ========== Motion Commands ==========
    /// Position setpoint with velocity and torque feedforward.
    SetPosition {
        /// Axis index.
        axis: u32,
        /// Target position in turns.
        position: f32,
        /// Velocity feedforward in turns per second.
        velocity_ff: f32,
        /// Torque feedforward in Nm.
        torque_ff: f32,
    },

    /// Velocity setpoint with torque feedforward.
    SetVelocity {
        /// Axis index.
        axis: u32,
        /// Target velocity in turns per second.
        velocity: f32,
        /// Torque feedforward in Nm.
        torque_ff: f32,
    },

    /// Torque setpoint.
    SetTorque {
        /// Axis index.
        axis: u32,
        /// Target torque in Nm.
        torque: f32,
    },

    /// Trajectory-planned position target.
    SetSimplePosition {
        /// Axis index.
        axis: u32,
        /// Target position in turns.
        position: f32,
    },

    // ========== Property Commands ==========
    /// Read `axis<N>.<property>`; the reply is one line of text.
    ReadProperty {
        /// Axis index.
        axis: u32,
        /// Dotted property path below the axis.
        property: String,
    },

    /// Write `axis<N>.<property>`; no reply is sent.
    WriteProperty {
        /// Axis index.
        axis: u32,
        /// Dotted property path below the axis.
        property: String,
        /// Value, already rendered for the wire.
        value: String,
    },

    /// Query position and velocity estimates; the reply is `"<pos> <vel>"`.
    ReadFeedback {
        /// Axis index.
        axis: u32,
    },

    // ========== System Commands ==========
    /// Persist the current configuration.
    SaveConfig,

    /// Clear all axis errors.
    ClearErrors,

    /// Reset the axis watchdog timer.
    FeedWatchdog {
        /// Axis index.
        axis: u32,
    },
}

impl Command {
    /// Build a property write from any [`ParamValue`].
    pub fn write_property<V: ParamValue + ?Sized>(axis: u32, property: &str, value: &V) -> Self {
        Command::WriteProperty {
            axis,
            property: property.to_string(),
            value: value.to_param_string(),
        }
    }

    /// Build a property read.
    pub fn read_property(axis: u32, property: &str) -> Self {
        Command::ReadProperty {
            axis,
            property: property.to_string(),
        }
    }

    /// Whether the device answers this command with a reply line.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Command::ReadProperty { .. } | Command::ReadFeedback { .. })
    }

    /// Encode the command as a line to send to the device.
    /// Returns the bytes to send (including the `\n` terminator).
    pub fn encode(&self) -> Vec<u8> {
        LineCodec::encode_command(&self.to_command_string())
    }

    /// Get the command string without the terminator.
    pub fn to_command_string(&self) -> String {
        match self {
            Command::SetPosition { axis, position, velocity_ff, torque_ff } => format!(
                "p {} {} {} {}",
                axis,
                format_float(*position),
                format_float(*velocity_ff),
                format_float(*torque_ff)
            ),
            Command::SetVelocity { axis, velocity, torque_ff } => format!(
                "v {} {} {}",
                axis,
                format_float(*velocity),
                format_float(*torque_ff)
            ),
            Command::SetTorque { axis, torque } => {
                format!("c {} {}", axis, format_float(*torque))
            }
            Command::SetSimplePosition { axis, position } => {
                format!("t {} {}", axis, format_float(*position))
            }

            Command::ReadProperty { axis, property } => format!("r axis{}.{}", axis, property),
            Command::WriteProperty { axis, property, value } => {
                format!("w axis{}.{} {}", axis, property, value)
            }
            Command::ReadFeedback { axis } => format!("f {}", axis),

            Command::SaveConfig => "ss".to_string(),
            Command::ClearErrors => "sc".to_string(),
            Command::FeedWatchdog { axis } => format!("u{}", axis),
        }
    }

    /// Parse a command line as the device would.
    ///
    /// The terminator must already be stripped. Feedforward terms of `p` and
    /// `v` are optional and default to zero.
    pub fn parse(line: &str) -> ProtocolResult<Command> {
        let mut tokens = line.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| ProtocolError::UnknownCommand(String::new()))?;

        match verb {
            "p" => {
                let axis = parse_axis("p", tokens.next())?;
                let position = required_float("p", "position", tokens.next())?;
                let velocity_ff = optional_float("p", "velocity_ff", tokens.next())?;
                let torque_ff = optional_float("p", "torque_ff", tokens.next())?;
                Ok(Command::SetPosition { axis, position, velocity_ff, torque_ff })
            }
            "v" => {
                let axis = parse_axis("v", tokens.next())?;
                let velocity = required_float("v", "velocity", tokens.next())?;
                let torque_ff = optional_float("v", "torque_ff", tokens.next())?;
                Ok(Command::SetVelocity { axis, velocity, torque_ff })
            }
            "c" => {
                let axis = parse_axis("c", tokens.next())?;
                let torque = required_float("c", "torque", tokens.next())?;
                Ok(Command::SetTorque { axis, torque })
            }
            "t" => {
                let axis = parse_axis("t", tokens.next())?;
                let position = required_float("t", "position", tokens.next())?;
                Ok(Command::SetSimplePosition { axis, position })
            }
            "r" => {
                let (axis, property) = parse_path("r", tokens.next())?;
                Ok(Command::ReadProperty { axis, property })
            }
            "w" => {
                let (axis, property) = parse_path("w", tokens.next())?;
                let value = tokens
                    .next()
                    .ok_or(ProtocolError::MissingArgument { command: "w", argument: "value" })?
                    .to_string();
                Ok(Command::WriteProperty { axis, property, value })
            }
            "f" => {
                let axis = parse_axis("f", tokens.next())?;
                Ok(Command::ReadFeedback { axis })
            }
            "ss" => Ok(Command::SaveConfig),
            "sc" => Ok(Command::ClearErrors),
            "u" => {
                let axis = parse_axis("u", tokens.next())?;
                Ok(Command::FeedWatchdog { axis })
            }
            _ => match verb.strip_prefix('u') {
                Some(axis) if !axis.is_empty() && axis.bytes().all(|b| b.is_ascii_digit()) => {
                    Ok(Command::FeedWatchdog { axis: parse_axis("u", Some(axis))? })
                }
                _ => Err(ProtocolError::UnknownCommand(verb.to_string())),
            },
        }
    }
}

fn parse_axis(command: &'static str, token: Option<&str>) -> ProtocolResult<u32> {
    let token = token.ok_or(ProtocolError::MissingArgument { command, argument: "axis" })?;
    token.parse().map_err(|_| ProtocolError::InvalidArgument {
        command,
        argument: "axis",
        value: token.to_string(),
    })
}

fn required_float(
    command: &'static str,
    argument: &'static str,
    token: Option<&str>,
) -> ProtocolResult<f32> {
    let token = token.ok_or(ProtocolError::MissingArgument { command, argument })?;
    token.parse().map_err(|_| ProtocolError::InvalidArgument {
        command,
        argument,
        value: token.to_string(),
    })
}

fn optional_float(
    command: &'static str,
    argument: &'static str,
    token: Option<&str>,
) -> ProtocolResult<f32> {
    match token {
        Some(_) => required_float(command, argument, token),
        None => Ok(0.0),
    }
}

/// Split `axis<N>.<property>` into its axis index and property path.
fn parse_path(command: &'static str, token: Option<&str>) -> ProtocolResult<(u32, String)> {
    let token = token.ok_or(ProtocolError::MissingArgument { command, argument: "property" })?;
    let invalid = || ProtocolError::InvalidArgument {
        command,
        argument: "property",
        value: token.to_string(),
    };

    let rest = token.strip_prefix("axis").ok_or_else(invalid)?;
    let (axis, property) = rest.split_once('.').ok_or_else(invalid)?;
    if property.is_empty() {
        return Err(invalid());
    }
    let axis = axis.parse().map_err(|_| invalid())?;
    Ok((axis, property.to_string()))
}
