//! Integration tests driving the command channel against the simulated device.

use odrive_client::protocol::{ERROR_ESTOP_REQUESTED, ERROR_WATCHDOG_TIMER_EXPIRED};
use odrive_client::sim::SimulatedODrive;
use odrive_client::{AxisState, Feedback, ODrive};

#[test]
fn test_position_round_trip() {
    let mut device = SimulatedODrive::new();
    let mut odrive = ODrive::new(&mut device);

    odrive.set_position(1, -3.25, 1.5, 0.0).unwrap();
    assert_eq!(odrive.get_position(1).unwrap(), -3.25);
    assert_eq!(odrive.get_velocity(1).unwrap(), 1.5);
    assert_eq!(
        odrive.get_feedback(1).unwrap(),
        Feedback { position: -3.25, velocity: 1.5 }
    );
    assert_eq!(odrive.get_position_filtered(0).unwrap(), 0.0);
}

#[test]
fn test_trajectory_and_velocity() {
    let mut device = SimulatedODrive::new();
    {
        let mut odrive = ODrive::new(&mut device);
        odrive.set_simple_position(0, 12.0).unwrap();
        odrive.set_velocity(0, 4.0, 0.2).unwrap();
        odrive.set_torque(0, 0.7).unwrap();
    }
    let axis = device.axis(0).unwrap();
    assert_eq!(axis.pos_estimate, 12.0);
    assert_eq!(axis.vel_estimate, 4.0);
    assert_eq!(axis.torque_setpoint, 0.7);
}

#[test]
fn test_calibration_completes() {
    let mut device = SimulatedODrive::new().with_settle_polls(4);
    {
        let mut odrive = ODrive::new(&mut device);
        assert!(odrive
            .run_state(0, AxisState::FullCalibrationSequence, true, 1.0)
            .unwrap());
        assert_eq!(odrive.get_state(0).unwrap(), AxisState::Idle);
    }
    assert_eq!(device.axis(0).unwrap().requested_state, 3);
}

#[test]
fn test_calibration_too_slow() {
    let mut device = SimulatedODrive::new().with_settle_polls(20);
    let mut odrive = ODrive::new(&mut device);
    assert!(!odrive
        .run_state(0, AxisState::FullCalibrationSequence, true, 0.5)
        .unwrap());
}

#[test]
fn test_closed_loop_without_waiting() {
    let mut device = SimulatedODrive::new();
    let mut odrive = ODrive::new(&mut device);
    assert!(odrive
        .run_state(1, AxisState::ClosedLoopControl, false, 0.0)
        .unwrap());
    assert_eq!(odrive.get_state(1).unwrap(), AxisState::ClosedLoopControl);
}

#[test]
fn test_errors_and_clear() {
    let mut device = SimulatedODrive::new();
    device.inject_error(0, ERROR_WATCHDOG_TIMER_EXPIRED | ERROR_ESTOP_REQUESTED);
    let mut odrive = ODrive::new(&mut device);

    assert_eq!(
        odrive.get_errors(0).unwrap(),
        ERROR_WATCHDOG_TIMER_EXPIRED | ERROR_ESTOP_REQUESTED
    );
    assert_eq!(
        odrive.describe_errors(0).unwrap(),
        "Watchdog expired; ESTOP requested; "
    );
    assert_eq!(odrive.get_errors(1).unwrap(), 0);

    odrive.clear_errors().unwrap();
    assert_eq!(odrive.get_errors(0).unwrap(), 0);
    assert_eq!(odrive.describe_errors(0).unwrap(), "");
}

#[test]
fn test_watchdog_and_save() {
    let mut device = SimulatedODrive::new();
    {
        let mut odrive = ODrive::new(&mut device);
        odrive.enable_watchdog(0, true).unwrap();
        odrive.update_watchdog(0).unwrap();
        odrive.update_watchdog(0).unwrap();
        odrive.save_config().unwrap();
        assert_eq!(
            odrive.read_property_int(0, "config.enable_watchdog").unwrap(),
            1
        );
    }
    let axis = device.axis(0).unwrap();
    assert!(axis.watchdog_enabled);
    assert_eq!(axis.watchdog_feeds, 2);
    assert_eq!(device.config_saves(), 1);
}

#[test]
fn test_invalid_property_reads_as_zero() {
    let mut device = SimulatedODrive::new();
    let mut odrive = ODrive::new(&mut device);
    assert_eq!(
        odrive.read_property(0, "motor.config.pole_pairs").unwrap(),
        "invalid property"
    );
    assert_eq!(odrive.read_property_float(0, "motor.config.pole_pairs").unwrap(), 0.0);
}
