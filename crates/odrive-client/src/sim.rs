//! Simulated ODrive that answers the ASCII protocol in memory.
//!
//! [`SimulatedODrive`] implements [`Stream`], so the command channel can be
//! driven against it exactly as against a serial port. Setpoints are tracked
//! instantly: a position setpoint becomes the position estimate, a velocity
//! setpoint becomes the velocity estimate.
//!
//! A requested state other than idle or closed-loop control is reported for
//! a configurable number of `current_state` reads and then settles into idle,
//! which is how calibration sequences look from the host.

use std::collections::VecDeque;
use std::io;

use odrive_ascii_protocol::{
    format_float, parse_int, AxisState, Command, LineCodec, PROP_ACTIVE_ERRORS,
    PROP_CURRENT_STATE, PROP_DISARM_REASON, PROP_ENABLE_WATCHDOG, PROP_POS_ESTIMATE,
    PROP_REQUESTED_STATE, PROP_VEL_ESTIMATE, TERMINATOR,
};
use tracing::{debug, trace, warn};

use crate::stream::Stream;

/// Reply sent for reads of properties the simulation does not model.
pub const INVALID_PROPERTY_REPLY: &str = "invalid property";

/// Default number of `current_state` reads before a sequence settles.
pub const DEFAULT_SETTLE_POLLS: u32 = 3;

/// State of one simulated axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SimAxis {
    /// Position estimate, in turns.
    pub pos_estimate: f32,
    /// Velocity estimate, in turns per second.
    pub vel_estimate: f32,
    /// Last torque setpoint, in Nm.
    pub torque_setpoint: f32,
    /// State the axis reports.
    pub current_state: AxisState,
    /// Last state written to `requested_state`.
    pub requested_state: i32,
    /// Active error register.
    pub active_errors: u32,
    /// Reason for the last disarm.
    pub disarm_reason: u32,
    /// Whether the watchdog is armed.
    pub watchdog_enabled: bool,
    /// Number of watchdog feeds received.
    pub watchdog_feeds: u32,
    settle_remaining: u32,
}

impl Default for SimAxis {
    fn default() -> Self {
        SimAxis {
            pos_estimate: 0.0,
            vel_estimate: 0.0,
            torque_setpoint: 0.0,
            current_state: AxisState::Idle,
            requested_state: AxisState::Idle.into(),
            active_errors: 0,
            disarm_reason: 0,
            watchdog_enabled: false,
            watchdog_feeds: 0,
            settle_remaining: 0,
        }
    }
}

impl SimAxis {
    fn request_state(&mut self, requested: i32, settle_polls: u32) {
        self.requested_state = requested;
        self.current_state = AxisState::from(requested);
        self.settle_remaining = match self.current_state {
            AxisState::Idle | AxisState::ClosedLoopControl => 0,
            _ => settle_polls,
        };
        if self.settle_remaining == 0 && self.current_state != AxisState::ClosedLoopControl {
            self.current_state = AxisState::Idle;
        }
    }

    /// Report the current state, advancing any running sequence by one poll.
    fn poll_state(&mut self) -> AxisState {
        let reported = self.current_state;
        if self.settle_remaining > 0 {
            self.settle_remaining -= 1;
            if self.settle_remaining == 0 {
                self.current_state = AxisState::Idle;
            }
        }
        reported
    }

    fn read(&mut self, property: &str) -> Option<String> {
        let reply = match property {
            PROP_POS_ESTIMATE => format_float(self.pos_estimate),
            PROP_VEL_ESTIMATE => format_float(self.vel_estimate),
            PROP_CURRENT_STATE => i32::from(self.poll_state()).to_string(),
            PROP_REQUESTED_STATE => self.requested_state.to_string(),
            PROP_ENABLE_WATCHDOG => u8::from(self.watchdog_enabled).to_string(),
            PROP_ACTIVE_ERRORS => self.active_errors.to_string(),
            PROP_DISARM_REASON => self.disarm_reason.to_string(),
            _ => return None,
        };
        Some(reply)
    }

    fn write(&mut self, property: &str, value: &str, settle_polls: u32) -> bool {
        match property {
            PROP_REQUESTED_STATE => self.request_state(parse_int(value), settle_polls),
            PROP_ENABLE_WATCHDOG => self.watchdog_enabled = parse_int(value) != 0,
            _ => return false,
        }
        true
    }
}

/// In-memory device speaking the ASCII protocol.
#[derive(Debug)]
pub struct SimulatedODrive {
    axes: Vec<SimAxis>,
    codec: LineCodec,
    outbound: VecDeque<u8>,
    settle_polls: u32,
    config_saves: u32,
    lines_handled: u64,
}

impl SimulatedODrive {
    /// Create a two-axis device.
    pub fn new() -> Self {
        Self::with_axes(2)
    }

    /// Create a device with `count` axes, all idle and error-free.
    pub fn with_axes(count: usize) -> Self {
        SimulatedODrive {
            axes: vec![SimAxis::default(); count],
            codec: LineCodec::new(),
            outbound: VecDeque::new(),
            settle_polls: DEFAULT_SETTLE_POLLS,
            config_saves: 0,
            lines_handled: 0,
        }
    }

    /// Set how many `current_state` reads a requested sequence lasts.
    pub fn with_settle_polls(mut self, settle_polls: u32) -> Self {
        self.settle_polls = settle_polls;
        self
    }

    /// Get an axis.
    pub fn axis(&self, axis: u32) -> Option<&SimAxis> {
        self.axes.get(axis as usize)
    }

    /// Get an axis mutably, for setting up a scenario.
    pub fn axis_mut(&mut self, axis: u32) -> Option<&mut SimAxis> {
        self.axes.get_mut(axis as usize)
    }

    /// Raise errors on an axis, disarming it.
    pub fn inject_error(&mut self, axis: u32, mask: u32) {
        if let Some(state) = self.axes.get_mut(axis as usize) {
            debug!("SimulatedODrive: axis{} error 0x{:08x}", axis, mask);
            state.active_errors |= mask;
            state.disarm_reason |= mask;
            state.current_state = AxisState::Idle;
            state.settle_remaining = 0;
        }
    }

    /// Number of `ss` commands received.
    pub fn config_saves(&self) -> u32 {
        self.config_saves
    }

    /// Number of complete command lines processed, valid or not.
    pub fn lines_handled(&self) -> u64 {
        self.lines_handled
    }

    fn reply(&mut self, text: &str) {
        trace!("SimulatedODrive: reply '{}'", text);
        self.outbound.extend(text.as_bytes());
        self.outbound.push_back(TERMINATOR);
    }

    fn handle_line(&mut self, line: &str) {
        self.lines_handled += 1;
        let cmd = match Command::parse(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("SimulatedODrive: ignoring '{}': {}", line, e);
                return;
            }
        };
        trace!("SimulatedODrive: handling {:?}", cmd);
        let settle_polls = self.settle_polls;

        match cmd {
            Command::SetPosition { axis, position, velocity_ff, torque_ff } => {
                if let Some(state) = self.axis_for(axis) {
                    state.pos_estimate = position;
                    state.vel_estimate = velocity_ff;
                    state.torque_setpoint = torque_ff;
                }
            }
            Command::SetVelocity { axis, velocity, torque_ff } => {
                if let Some(state) = self.axis_for(axis) {
                    state.vel_estimate = velocity;
                    state.torque_setpoint = torque_ff;
                }
            }
            Command::SetTorque { axis, torque } => {
                if let Some(state) = self.axis_for(axis) {
                    state.torque_setpoint = torque;
                }
            }
            Command::SetSimplePosition { axis, position } => {
                if let Some(state) = self.axis_for(axis) {
                    state.pos_estimate = position;
                    state.vel_estimate = 0.0;
                }
            }

            Command::ReadProperty { axis, property } => {
                let reply = self.axis_for(axis).and_then(|state| state.read(&property));
                self.reply(reply.as_deref().unwrap_or(INVALID_PROPERTY_REPLY));
            }
            Command::WriteProperty { axis, property, value } => {
                let written = self
                    .axis_for(axis)
                    .map(|state| state.write(&property, &value, settle_polls))
                    .unwrap_or(false);
                if !written {
                    warn!("SimulatedODrive: cannot write axis{}.{}", axis, property);
                }
            }
            Command::ReadFeedback { axis } => {
                let reply = self.axis_for(axis).map(|state| {
                    format!(
                        "{} {}",
                        format_float(state.pos_estimate),
                        format_float(state.vel_estimate)
                    )
                });
                self.reply(reply.as_deref().unwrap_or(INVALID_PROPERTY_REPLY));
            }

            Command::SaveConfig => self.config_saves += 1,
            Command::ClearErrors => {
                for state in &mut self.axes {
                    state.active_errors = 0;
                    state.disarm_reason = 0;
                }
            }
            Command::FeedWatchdog { axis } => {
                if let Some(state) = self.axis_for(axis) {
                    state.watchdog_feeds += 1;
                }
            }
        }
    }

    fn axis_for(&mut self, axis: u32) -> Option<&mut SimAxis> {
        let state = self.axes.get_mut(axis as usize);
        if state.is_none() {
            warn!("SimulatedODrive: no axis{}", axis);
        }
        state
    }
}

impl Default for SimulatedODrive {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream for SimulatedODrive {
    fn available(&mut self) -> io::Result<usize> {
        Ok(self.outbound.len())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.outbound.pop_front())
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.codec.push(data);
        while let Some(line) = self.codec.decode_line() {
            if line.trim().is_empty() {
                continue;
            }
            self.handle_line(&line);
        }
        Ok(())
    }
}
