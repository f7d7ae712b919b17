//! Human-readable decoding of device error masks.
//!
//! The combined mask is the bitwise OR of an axis's `active_errors` and
//! `disarm_reason` registers. Both registers share the same bit layout.

use crate::constants::*;

/// Flags and labels in the order they are reported.
pub const ERROR_DESCRIPTIONS: [(u32, &str); 22] = [
    (ERROR_INITIALIZING, "Initializing"),
    (ERROR_SYSTEM_LEVEL, "System level error"),
    (ERROR_TIMING_ERROR, "Timing error"),
    (ERROR_MISSING_ESTIMATE, "Missing estimate"),
    (ERROR_BAD_CONFIG, "Bad config"),
    (ERROR_DRV_FAULT, "DRV fault"),
    (ERROR_MISSING_INPUT, "Missing input"),
    (ERROR_DC_BUS_OVER_VOLTAGE, "DC bus over voltage"),
    (ERROR_DC_BUS_UNDER_VOLTAGE, "DC bus under voltage"),
    (ERROR_DC_BUS_OVER_CURRENT, "DC bus over current"),
    (ERROR_DC_BUS_OVER_REGEN_CURRENT, "DC bus over regen current"),
    (ERROR_CURRENT_LIMIT_VIOLATION, "Current limit violation"),
    (ERROR_MOTOR_OVER_TEMP, "Motor over temperature"),
    (ERROR_INVERTER_OVER_TEMP, "Inverter over temperature"),
    (ERROR_VELOCITY_LIMIT_VIOLATION, "Velocity limit violation"),
    (ERROR_POSITION_LIMIT_VIOLATION, "Position limit violation"),
    (ERROR_WATCHDOG_TIMER_EXPIRED, "Watchdog expired"),
    (ERROR_ESTOP_REQUESTED, "ESTOP requested"),
    (ERROR_SPINOUT_DETECTED, "Spinout detected"),
    (ERROR_BRAKE_RESISTOR_DISARMED, "Brake resistor disarmed"),
    (ERROR_THERMISTOR_DISCONNECTED, "Thermistor disconnected"),
    (ERROR_CALIBRATION_ERROR, "Calibration error"),
];

/// Iterate over the known flags set in `mask`, in reporting order.
pub fn active_flags(mask: u32) -> impl Iterator<Item = (u32, &'static str)> {
    ERROR_DESCRIPTIONS
        .iter()
        .copied()
        .filter(move |&(flag, _)| mask & flag != 0)
}

/// Describe an error mask as `"<label>; "` per set flag.
///
/// Unknown bits are ignored and an empty mask yields an empty string.
pub fn decode_errors(mask: u32) -> String {
    let mut out = String::new();
    for (_, label) in active_flags(mask) {
        out.push_str(label);
        out.push_str("; ");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_errors() {
        assert_eq!(decode_errors(0), "");
    }

    #[test]
    fn test_watchdog_and_estop() {
        assert_eq!(
            decode_errors(ERROR_WATCHDOG_TIMER_EXPIRED | ERROR_ESTOP_REQUESTED),
            "Watchdog expired; ESTOP requested; "
        );
    }

    #[test]
    fn test_order_is_fixed() {
        // Argument order must not matter, only the table order.
        let mask = ERROR_CALIBRATION_ERROR | ERROR_INITIALIZING | ERROR_BAD_CONFIG;
        assert_eq!(
            decode_errors(mask),
            "Initializing; Bad config; Calibration error; "
        );
    }

    #[test]
    fn test_unknown_bits_ignored() {
        // 0x80 and 0x8000_0000 are not assigned.
        assert_eq!(decode_errors(0x0000_0080 | 0x8000_0000), "");
        assert_eq!(
            decode_errors(0x0000_0080 | ERROR_DRV_FAULT),
            "DRV fault; "
        );
    }

    #[test]
    fn test_active_flags() {
        let flags: Vec<_> = active_flags(ERROR_MOTOR_OVER_TEMP | ERROR_SYSTEM_LEVEL).collect();
        assert_eq!(
            flags,
            vec![
                (ERROR_SYSTEM_LEVEL, "System level error"),
                (ERROR_MOTOR_OVER_TEMP, "Motor over temperature"),
            ]
        );
    }

    #[test]
    fn test_table_flags_are_distinct_single_bits() {
        let mut seen = 0u32;
        for (flag, _) in ERROR_DESCRIPTIONS {
            assert_eq!(flag.count_ones(), 1);
            assert_eq!(seen & flag, 0);
            seen |= flag;
        }
    }
}
