//! The command channel.
//!
//! [`ODrive`] borrows a caller-owned [`Stream`] and turns method calls into
//! protocol lines. Setpoint and property writes are fire-and-forget; queries
//! write one line and read one line back. Every call is attempted exactly
//! once, except for the bounded state poll in [`ODrive::run_state`].
//!
//! The channel assumes it is the only reader and writer on the stream.
//! Callers sharing a port between threads must serialise access themselves.

use odrive_ascii_protocol::{
    decode_errors, parse_float, parse_int, parse_mask, AxisState, Command, Feedback, ParamValue,
    AXIS_STATE_IDLE, PROP_ACTIVE_ERRORS, PROP_CURRENT_STATE, PROP_DISARM_REASON,
    PROP_ENABLE_WATCHDOG, PROP_POS_ESTIMATE, PROP_REQUESTED_STATE, PROP_VEL_ESTIMATE, TERMINATOR,
};
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::stream::{Clock, Stream, SystemClock};

/// Command channel for one ODrive on a borrowed byte stream.
///
/// The stream must outlive the channel; the channel never opens, closes or
/// reconfigures it.
pub struct ODrive<'a, S: Stream + ?Sized, C: Clock = SystemClock> {
    stream: &'a mut S,
    clock: C,
    config: ClientConfig,
}

impl<'a, S: Stream + ?Sized> ODrive<'a, S> {
    /// Create a channel with the wall clock and default timing.
    pub fn new(stream: &'a mut S) -> Self {
        ODrive::with_clock(stream, SystemClock::new())
    }
}

impl<'a, S: Stream + ?Sized, C: Clock> ODrive<'a, S, C> {
    /// Create a channel with a custom clock and default timing.
    pub fn with_clock(stream: &'a mut S, clock: C) -> Self {
        ODrive {
            stream,
            clock,
            config: ClientConfig::default(),
        }
    }

    /// Replace the timing configuration.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the timing configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Get the underlying stream.
    pub fn stream(&self) -> &S {
        &*self.stream
    }

    // ========================================================================
    // Line Protocol
    // ========================================================================

    /// Write a command line to the stream.
    pub fn send(&mut self, cmd: &Command) -> ClientResult<()> {
        let line = cmd.encode();
        trace!("ODrive: sending '{}'", cmd.to_command_string());
        self.stream.write_bytes(&line)?;
        Ok(())
    }

    /// Write a command and read back one reply line.
    fn query(&mut self, cmd: &Command) -> ClientResult<String> {
        self.send(cmd)?;
        self.read_line()
    }

    /// Read one reply line, without its terminator.
    ///
    /// The deadline is measured from entry. If the stream runs dry before a
    /// `\n` arrives and the deadline has passed, whatever was accumulated is
    /// returned, possibly empty. A timeout is not an error. Bytes after the
    /// terminator are left on the stream.
    pub fn read_line(&mut self) -> ClientResult<String> {
        let start = self.clock.millis();
        let mut line = Vec::new();

        loop {
            if self.stream.available()? > 0 {
                if let Some(byte) = self.stream.read_byte()? {
                    if byte == TERMINATOR {
                        let text = String::from_utf8_lossy(&line).into_owned();
                        trace!("ODrive: received '{}'", text);
                        return Ok(text);
                    }
                    line.push(byte);
                    continue;
                }
            }

            if self.clock.millis().saturating_sub(start) >= self.config.read_timeout_ms {
                let text = String::from_utf8_lossy(&line).into_owned();
                warn!(
                    "ODrive: reply timed out after {} ms, keeping '{}'",
                    self.config.read_timeout_ms, text
                );
                return Ok(text);
            }
            std::hint::spin_loop();
        }
    }

    /// Read one reply line as a float; unparseable text reads as zero.
    pub fn read_float(&mut self) -> ClientResult<f32> {
        Ok(parse_float(&self.read_line()?))
    }

    /// Read one reply line as an integer; unparseable text reads as zero.
    pub fn read_int(&mut self) -> ClientResult<i32> {
        Ok(parse_int(&self.read_line()?))
    }

    // ========================================================================
    // Motion Commands
    // ========================================================================

    /// Send a position setpoint with velocity and torque feedforward.
    pub fn set_position(
        &mut self,
        axis: u32,
        position: f32,
        velocity_ff: f32,
        torque_ff: f32,
    ) -> ClientResult<()> {
        self.send(&Command::SetPosition { axis, position, velocity_ff, torque_ff })
    }

    /// Send a velocity setpoint with torque feedforward.
    pub fn set_velocity(&mut self, axis: u32, velocity: f32, torque_ff: f32) -> ClientResult<()> {
        self.send(&Command::SetVelocity { axis, velocity, torque_ff })
    }

    /// Send a torque setpoint.
    pub fn set_torque(&mut self, axis: u32, torque: f32) -> ClientResult<()> {
        self.send(&Command::SetTorque { axis, torque })
    }

    /// Send a trajectory-planned position target.
    pub fn set_simple_position(&mut self, axis: u32, position: f32) -> ClientResult<()> {
        self.send(&Command::SetSimplePosition { axis, position })
    }

    // ========================================================================
    // Properties and Telemetry
    // ========================================================================

    /// Read `axis<N>.<property>` as raw text.
    pub fn read_property(&mut self, axis: u32, property: &str) -> ClientResult<String> {
        self.query(&Command::read_property(axis, property))
    }

    /// Read `axis<N>.<property>` as a float.
    pub fn read_property_float(&mut self, axis: u32, property: &str) -> ClientResult<f32> {
        Ok(parse_float(&self.read_property(axis, property)?))
    }

    /// Read `axis<N>.<property>` as an integer.
    pub fn read_property_int(&mut self, axis: u32, property: &str) -> ClientResult<i32> {
        Ok(parse_int(&self.read_property(axis, property)?))
    }

    /// Write `axis<N>.<property>`. Floats use four decimals, booleans `0`/`1`.
    pub fn write_property<V: ParamValue + ?Sized>(
        &mut self,
        axis: u32,
        property: &str,
        value: &V,
    ) -> ClientResult<()> {
        self.send(&Command::write_property(axis, property, value))
    }

    /// Encoder position estimate, in turns.
    pub fn get_position(&mut self, axis: u32) -> ClientResult<f32> {
        self.read_property_float(axis, PROP_POS_ESTIMATE)
    }

    /// Encoder velocity estimate, in turns per second.
    pub fn get_velocity(&mut self, axis: u32) -> ClientResult<f32> {
        self.read_property_float(axis, PROP_VEL_ESTIMATE)
    }

    /// Position from the `f` feedback query.
    pub fn get_position_filtered(&mut self, axis: u32) -> ClientResult<f32> {
        Ok(self.get_feedback(axis)?.position)
    }

    /// Position and velocity from a single `f` feedback query.
    pub fn get_feedback(&mut self, axis: u32) -> ClientResult<Feedback> {
        let reply = self.query(&Command::ReadFeedback { axis })?;
        Ok(Feedback::parse(&reply))
    }

    /// State the axis reports it is in.
    pub fn get_state(&mut self, axis: u32) -> ClientResult<AxisState> {
        Ok(AxisState::from(self.read_property_int(axis, PROP_CURRENT_STATE)?))
    }

    /// Combined error mask: `active_errors | disarm_reason`.
    pub fn get_errors(&mut self, axis: u32) -> ClientResult<u32> {
        let active = parse_mask(&self.read_property(axis, PROP_ACTIVE_ERRORS)?);
        let disarm = parse_mask(&self.read_property(axis, PROP_DISARM_REASON)?);
        Ok(active | disarm)
    }

    /// Combined error mask rendered by [`decode_errors`].
    pub fn describe_errors(&mut self, axis: u32) -> ClientResult<String> {
        Ok(decode_errors(self.get_errors(axis)?))
    }

    // ========================================================================
    // State Machine
    // ========================================================================

    /// Request an axis state, optionally waiting for the axis to return to idle.
    ///
    /// Without `wait_for_idle` this writes `requested_state` and returns
    /// `true`. Otherwise it polls `current_state` once per poll interval,
    /// always at least once, until the axis reports idle or the budget of
    /// `timeout_seconds` worth of polls is spent. Returns whether budget was
    /// left when polling stopped; a non-positive timeout therefore always
    /// yields `false` after a single poll.
    pub fn run_state(
        &mut self,
        axis: u32,
        requested_state: impl Into<i32>,
        wait_for_idle: bool,
        timeout_seconds: f32,
    ) -> ClientResult<bool> {
        let requested_state = requested_state.into();
        let mut budget = self.config.tick_budget(timeout_seconds);

        self.write_property(axis, PROP_REQUESTED_STATE, &requested_state)?;
        if !wait_for_idle {
            return Ok(true);
        }

        let poll_interval = self.config.poll_interval();
        loop {
            self.clock.delay(poll_interval);
            let state = self.read_property_int(axis, PROP_CURRENT_STATE)?;
            debug!(
                "ODrive: axis{} reports state {} ({} polls left)",
                axis, state, budget
            );
            if state == AXIS_STATE_IDLE {
                break;
            }
            budget = budget.saturating_sub(1);
            if budget <= 0 {
                break;
            }
        }

        let reached_idle = budget > 0;
        if !reached_idle {
            warn!(
                "ODrive: axis{} did not return to idle within {} s after requesting state {}",
                axis, timeout_seconds, requested_state
            );
        }
        Ok(reached_idle)
    }

    // ========================================================================
    // System Commands
    // ========================================================================

    /// Persist the current configuration.
    pub fn save_config(&mut self) -> ClientResult<()> {
        self.send(&Command::SaveConfig)
    }

    /// Clear all errors.
    pub fn clear_errors(&mut self) -> ClientResult<()> {
        self.send(&Command::ClearErrors)
    }

    /// Arm or disarm the axis watchdog.
    pub fn enable_watchdog(&mut self, axis: u32, enable: bool) -> ClientResult<()> {
        self.write_property(axis, PROP_ENABLE_WATCHDOG, &enable)
    }

    /// Feed the axis watchdog.
    pub fn update_watchdog(&mut self, axis: u32) -> ClientResult<()> {
        self.send(&Command::FeedWatchdog { axis })
    }
}
