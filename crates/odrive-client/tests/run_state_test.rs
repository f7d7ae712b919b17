//! Integration tests for state transitions and reply timing.
//!
//! The polling tests script the device's `current_state` replies and count
//! the requests the channel sends, using a manual clock so no real time
//! passes.

use std::time::Instant;

use odrive_client::mock::{ManualClock, ScriptedStream};
use odrive_client::{AxisState, ClientConfig, ODrive};
use proptest::prelude::*;

const STATE_POLL: &str = "r axis0.current_state";

/// Script `busy` non-idle replies followed by one idle reply, then run a
/// full calibration request and report `(result, polls sent)`.
fn run_scripted(busy: usize, timeout_seconds: f32) -> (bool, usize) {
    let mut stream = ScriptedStream::new();
    for _ in 0..busy {
        stream.queue_reply("3");
    }
    stream.queue_reply("1");

    let clock = ManualClock::new();
    let ok = {
        let mut odrive = ODrive::with_clock(&mut stream, &clock);
        odrive
            .run_state(0, AxisState::FullCalibrationSequence, true, timeout_seconds)
            .expect("scripted stream never fails")
    };
    (ok, stream.count_lines(STATE_POLL))
}

// ============================================================================
// Polling
// ============================================================================

#[test]
fn test_idle_after_three_polls() {
    let (ok, polls) = run_scripted(2, 1.0);
    assert!(ok);
    assert_eq!(polls, 3);
}

#[test]
fn test_already_idle() {
    let (ok, polls) = run_scripted(0, 5.0);
    assert!(ok);
    assert_eq!(polls, 1);
}

#[test]
fn test_never_idle_exhausts_budget() {
    let (ok, polls) = run_scripted(50, 1.0);
    assert!(!ok);
    assert_eq!(polls, 10);
}

#[test]
fn test_idle_on_last_poll_is_timeout() {
    // The budget is spent by the tenth non-idle poll; an idle reply after
    // that is never requested.
    let (ok, polls) = run_scripted(10, 1.0);
    assert!(!ok);
    assert_eq!(polls, 10);

    let (ok, polls) = run_scripted(9, 1.0);
    assert!(ok);
    assert_eq!(polls, 10);
}

#[test]
fn test_request_is_written_first() {
    let mut stream = ScriptedStream::new();
    stream.queue_reply("1");
    let clock = ManualClock::new();
    {
        let mut odrive = ODrive::with_clock(&mut stream, &clock);
        odrive.run_state(1, AxisState::MotorCalibration, true, 2.0).unwrap();
    }
    assert_eq!(
        stream.written_lines(),
        ["w axis1.requested_state 4", "r axis1.current_state"]
    );
    assert_eq!(clock.total_delay_ms(), 100);
}

#[test]
fn test_custom_poll_interval() {
    let mut stream = ScriptedStream::new();
    for _ in 0..100 {
        stream.queue_reply("8");
    }
    let clock = ManualClock::new();
    let ok = {
        let config = ClientConfig::default().with_poll_interval_ms(250);
        let mut odrive = ODrive::with_clock(&mut stream, &clock).with_config(config);
        odrive.run_state(0, 8, true, 1.0).unwrap()
    };
    assert!(!ok);
    assert_eq!(stream.count_lines(STATE_POLL), 4);
    assert_eq!(clock.total_delay_ms(), 1000);
}

#[test]
fn test_unparseable_state_is_not_idle() {
    let mut stream = ScriptedStream::new();
    stream.queue_reply("busy");
    stream.queue_reply("1");
    let clock = ManualClock::new();
    let ok = {
        let mut odrive = ODrive::with_clock(&mut stream, &clock);
        odrive.run_state(0, AxisState::Idle, true, 1.0).unwrap()
    };
    assert!(ok);
    assert_eq!(stream.count_lines(STATE_POLL), 2);
}

proptest! {
    #[test]
    fn prop_poll_count(busy in 0usize..40, tenths in 1u32..30) {
        let timeout = tenths as f32 / 10.0;
        let budget = ClientConfig::default().tick_budget(timeout) as usize;
        let (ok, polls) = run_scripted(busy, timeout);

        if busy < budget {
            prop_assert!(ok);
            prop_assert_eq!(polls, busy + 1);
        } else {
            prop_assert!(!ok);
            prop_assert_eq!(polls, budget.max(1));
        }
    }
}

// ============================================================================
// Reply Timing
// ============================================================================

#[test]
fn test_silent_device_times_out_in_real_time() {
    let mut stream = ScriptedStream::new();
    let mut odrive = ODrive::new(&mut stream);

    let start = Instant::now();
    let value = odrive.get_position(0).unwrap();
    let elapsed = start.elapsed().as_millis();

    assert_eq!(value, 0.0);
    assert!(elapsed >= 200, "returned after {} ms", elapsed);
    assert!(elapsed < 1000, "returned after {} ms", elapsed);
}

#[test]
fn test_partial_reply_is_parsed() {
    let mut stream = ScriptedStream::with_input(b"12.5");
    let clock = ManualClock::new();
    let mut odrive = ODrive::with_clock(&mut stream, &clock);
    assert_eq!(odrive.get_velocity(0).unwrap(), 12.5);
}
