//! Protocol constants
//!
//! Axis states and error bits as enumerated by the ODrive firmware. The
//! numeric values travel verbatim over the wire.

// ============================================================================
// Axis States
// ============================================================================

/// Raw value of the idle state, the terminal condition of state polling.
pub const AXIS_STATE_IDLE: i32 = 1;

/// State of a single axis, as requested by the host or reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisState {
    /// Will fall through to idle.
    Undefined,
    /// Disable motor PWM and do nothing.
    Idle,
    /// Run the startup procedure.
    StartupSequence,
    /// Run motor calibration and then encoder offset calibration.
    FullCalibrationSequence,
    /// Measure phase resistance and phase inductance.
    MotorCalibration,
    /// Turn the motor until the encoder index is found.
    EncoderIndexSearch,
    /// Turn the motor to calibrate the encoder offset.
    EncoderOffsetCalibration,
    /// Run closed loop control.
    ClosedLoopControl,
    /// Run the lock-in spin.
    LockinSpin,
    /// Run the encoder direction search.
    EncoderDirFind,
    /// Run axis homing.
    Homing,
    /// Rotate to find the hall sensor polarity.
    EncoderHallPolarityCalibration,
    /// Rotate to find the hall sensor phase offsets.
    EncoderHallPhaseCalibration,
    /// Run anticogging calibration.
    AnticoggingCalibration,
    /// Any value this crate does not know about.
    Other(i32),
}

impl AxisState {
    /// Check if this is the idle state.
    pub fn is_idle(&self) -> bool {
        matches!(self, AxisState::Idle)
    }
}

impl From<i32> for AxisState {
    fn from(code: i32) -> Self {
        match code {
            0 => AxisState::Undefined,
            AXIS_STATE_IDLE => AxisState::Idle,
            2 => AxisState::StartupSequence,
            3 => AxisState::FullCalibrationSequence,
            4 => AxisState::MotorCalibration,
            6 => AxisState::EncoderIndexSearch,
            7 => AxisState::EncoderOffsetCalibration,
            8 => AxisState::ClosedLoopControl,
            9 => AxisState::LockinSpin,
            10 => AxisState::EncoderDirFind,
            11 => AxisState::Homing,
            12 => AxisState::EncoderHallPolarityCalibration,
            13 => AxisState::EncoderHallPhaseCalibration,
            14 => AxisState::AnticoggingCalibration,
            other => AxisState::Other(other),
        }
    }
}

impl From<AxisState> for i32 {
    fn from(state: AxisState) -> Self {
        match state {
            AxisState::Undefined => 0,
            AxisState::Idle => AXIS_STATE_IDLE,
            AxisState::StartupSequence => 2,
            AxisState::FullCalibrationSequence => 3,
            AxisState::MotorCalibration => 4,
            AxisState::EncoderIndexSearch => 6,
            AxisState::EncoderOffsetCalibration => 7,
            AxisState::ClosedLoopControl => 8,
            AxisState::LockinSpin => 9,
            AxisState::EncoderDirFind => 10,
            AxisState::Homing => 11,
            AxisState::EncoderHallPolarityCalibration => 12,
            AxisState::EncoderHallPhaseCalibration => 13,
            AxisState::AnticoggingCalibration => 14,
            AxisState::Other(code) => code,
        }
    }
}

impl std::fmt::Display for AxisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisState::Undefined => write!(f, "undefined"),
            AxisState::Idle => write!(f, "idle"),
            AxisState::StartupSequence => write!(f, "startup sequence"),
            AxisState::FullCalibrationSequence => write!(f, "full calibration sequence"),
            AxisState::MotorCalibration => write!(f, "motor calibration"),
            AxisState::EncoderIndexSearch => write!(f, "encoder index search"),
            AxisState::EncoderOffsetCalibration => write!(f, "encoder offset calibration"),
            AxisState::ClosedLoopControl => write!(f, "closed loop control"),
            AxisState::LockinSpin => write!(f, "lock-in spin"),
            AxisState::EncoderDirFind => write!(f, "encoder direction find"),
            AxisState::Homing => write!(f, "homing"),
            AxisState::EncoderHallPolarityCalibration => {
                write!(f, "encoder hall polarity calibration")
            }
            AxisState::EncoderHallPhaseCalibration => write!(f, "encoder hall phase calibration"),
            AxisState::AnticoggingCalibration => write!(f, "anticogging calibration"),
            AxisState::Other(code) => write!(f, "unknown state ({})", code),
        }
    }
}

// ============================================================================
// Error Bits
// ============================================================================

/// The axis is still initializing.
pub const ERROR_INITIALIZING: u32 = 0x0000_0001;
/// Unexpected system-level fault.
pub const ERROR_SYSTEM_LEVEL: u32 = 0x0000_0002;
/// An internal control loop missed its deadline.
pub const ERROR_TIMING_ERROR: u32 = 0x0000_0004;
/// A required position or velocity estimate is unavailable.
pub const ERROR_MISSING_ESTIMATE: u32 = 0x0000_0008;
/// The axis configuration is invalid.
pub const ERROR_BAD_CONFIG: u32 = 0x0000_0010;
/// The gate driver reported a fault.
pub const ERROR_DRV_FAULT: u32 = 0x0000_0020;
/// No setpoint source delivered an input in time.
pub const ERROR_MISSING_INPUT: u32 = 0x0000_0040;
/// DC bus voltage exceeded the configured maximum.
pub const ERROR_DC_BUS_OVER_VOLTAGE: u32 = 0x0000_0100;
/// DC bus voltage fell below the configured minimum.
pub const ERROR_DC_BUS_UNDER_VOLTAGE: u32 = 0x0000_0200;
/// DC bus current exceeded the configured maximum.
pub const ERROR_DC_BUS_OVER_CURRENT: u32 = 0x0000_0400;
/// Too much current was fed back into the supply.
pub const ERROR_DC_BUS_OVER_REGEN_CURRENT: u32 = 0x0000_0800;
/// Motor current exceeded the hard limit.
pub const ERROR_CURRENT_LIMIT_VIOLATION: u32 = 0x0000_1000;
/// Motor thermistor exceeded its upper limit.
pub const ERROR_MOTOR_OVER_TEMP: u32 = 0x0000_2000;
/// Inverter thermistor exceeded its upper limit.
pub const ERROR_INVERTER_OVER_TEMP: u32 = 0x0000_4000;
/// Velocity exceeded the configured limit.
pub const ERROR_VELOCITY_LIMIT_VIOLATION: u32 = 0x0000_8000;
/// Position left the configured soft limits.
pub const ERROR_POSITION_LIMIT_VIOLATION: u32 = 0x0001_0000;
/// The axis watchdog was not fed in time.
pub const ERROR_WATCHDOG_TIMER_EXPIRED: u32 = 0x0100_0000;
/// An emergency stop was requested.
pub const ERROR_ESTOP_REQUESTED: u32 = 0x0200_0000;
/// Mechanical and electrical power disagree in sign.
pub const ERROR_SPINOUT_DETECTED: u32 = 0x0400_0000;
/// The brake resistor was disarmed.
pub const ERROR_BRAKE_RESISTOR_DISARMED: u32 = 0x0800_0000;
/// A thermistor is enabled but not connected.
pub const ERROR_THERMISTOR_DISCONNECTED: u32 = 0x1000_0000;
/// A calibration procedure failed.
pub const ERROR_CALIBRATION_ERROR: u32 = 0x4000_0000;
